use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use billing_convert::convert::{Converter, RateTable, match_catalog_rate};
use billing_convert::core::*;
use billing_convert::source::SourceDocument;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn line(i: usize) -> Value {
    json!({
        "id": format!("il_{i}"),
        "amount": 10000 + i as i64,
        "quantity": 2,
        "description": format!("Service item {i}"),
        "period": {"start": 1717200000, "end": 1719792000},
        "price": {"id": "price_1", "billing_scheme": "per_unit", "unit_amount_decimal": "5000"},
        "discount_amounts": [{"amount": 500, "discount": {
            "id": "di_1", "source": {"coupon": {"id": "co_1", "name": "Launch"}}
        }}],
        "taxes": [{
            "amount": 1900,
            "taxable_amount": 10000,
            "tax_behavior": "exclusive",
            "tax_rate_details": {"tax_rate": {
                "id": "txr_19", "display_name": "VAT", "tax_type": "vat", "country": "DE"
            }}
        }]
    })
}

fn invoice_json(lines: usize) -> Value {
    json!({
        "object": "invoice",
        "id": format!("in_bench_{lines}"),
        "number": "BENCH-001",
        "currency": "usd",
        "created": 1718409600,
        "account_name": "Benchmark GmbH",
        "account_country": "DE",
        "account_tax_ids": [{"id": "txi_1", "type": "eu_vat", "value": "DE123456789"}],
        "customer_name": "Kunde AG",
        "customer_address": {"city": "München", "postal_code": "80331", "country": "DE"},
        "customer_tax_ids": [{"type": "eu_vat", "value": "DE987654321"}],
        "lines": {"data": (1..=lines).map(line).collect::<Vec<_>>()}
    })
}

fn converter() -> Converter {
    Converter::new(Regime::de()).namespace(Uuid::NAMESPACE_URL)
}

fn bench_parse(c: &mut Criterion) {
    let json = invoice_json(10).to_string();
    c.bench_function("parse_invoice_10_lines", |b| {
        b.iter(|| black_box(SourceDocument::from_json(black_box(&json))));
    });
}

fn bench_convert(c: &mut Criterion) {
    let converter = converter();
    let small = SourceDocument::from_value(invoice_json(10)).unwrap();
    let large = SourceDocument::from_value(invoice_json(1000)).unwrap();

    c.bench_function("convert_invoice_10_lines", |b| {
        b.iter(|| black_box(converter.convert(black_box(&small))));
    });
    c.bench_function("convert_invoice_1000_lines", |b| {
        b.iter(|| black_box(converter.convert(black_box(&large))));
    });
}

fn bench_catalog_match(c: &mut Criterion) {
    let regime = Regime::es();
    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    c.bench_function("match_catalog_rate", |b| {
        b.iter(|| {
            black_box(match_catalog_rate(
                black_box(dec!(21)),
                "ES",
                &TaxCategory::Vat,
                date,
                &regime,
            ))
        });
    });
}

fn bench_cross_rate(c: &mut Criterion) {
    let table = RateTable::fallback();
    let (usd, jpy) = (Currency::new("USD"), Currency::new("JPY"));
    c.bench_function("cross_rate", |b| {
        b.iter(|| black_box(table.cross_rate(black_box(&usd), black_box(&jpy))));
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_convert,
    bench_catalog_match,
    bench_cross_rate
);
criterion_main!(benches);
