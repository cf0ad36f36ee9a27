#![cfg(feature = "convert")]

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use billing_convert::convert::{Calculator, Converter, RateTable, document_uuid};
use billing_convert::core::*;
use billing_convert::source::SourceDocument;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn namespace() -> Uuid {
    Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
}

fn vat_rate(id: &str, percentage: &str) -> Value {
    json!({
        "id": id,
        "display_name": "VAT",
        "tax_type": "vat",
        "country": "DE",
        "percentage": percentage
    })
}

fn june_period() -> Value {
    json!({"start": 1717200000, "end": 1719792000})
}

/// A finalized German invoice with a per-unit and a tiered line.
fn invoice() -> Value {
    json!({
        "object": "invoice",
        "id": "in_1PQ",
        "number": "ACME-0042",
        "currency": "eur",
        "created": 1718409600,
        "effective_at": 1718413200,
        "description": "Thank you for your business.",
        "footer": "ACME GmbH, Amtsgericht Berlin HRB 12345",
        "collection_method": "send_invoice",
        "due_date": 1720051200,
        "account_country": "DE",
        "account_name": "ACME GmbH",
        "account_tax_ids": [{"id": "txi_1", "type": "eu_vat", "value": "DE123456789"}],
        "customer": {"id": "cus_1", "name": "Live Name AG", "email": "ap@kunde.example"},
        "customer_name": "Kunde AG",
        "customer_address": {
            "line1": "Marienplatz 1",
            "city": "München",
            "postal_code": "80331",
            "country": "DE"
        },
        "customer_tax_ids": [{"type": "eu_vat", "value": "DE987654321"}],
        "shipping_details": {
            "name": "Kunde AG Lager",
            "address": {"line1": "Hafenstr. 4", "city": "Hamburg", "postal_code": "20457", "country": "DE"}
        },
        "payment_settings": {"payment_method_types": ["sepa_debit"]},
        "total_taxes": [
            {
                "amount": 2194,
                "taxable_amount": 14200,
                "tax_behavior": "exclusive",
                "tax_rate_details": {"tax_rate": vat_rate("txr_19", "19")}
            }
        ],
        "lines": {"data": [
            {
                "id": "il_1",
                "amount": 10000,
                "quantity": 2,
                "description": "Pro seat",
                "period": june_period(),
                "price": {"id": "price_1", "billing_scheme": "per_unit", "unit_amount_decimal": "5000"},
                "taxes": [{
                    "amount": 1900,
                    "taxable_amount": 10000,
                    "tax_behavior": "exclusive",
                    "tax_rate_details": {"tax_rate": vat_rate("txr_19", "19")}
                }]
            },
            {
                "id": "il_2",
                "amount": 4200,
                "quantity": 3,
                "description": "API calls",
                "period": june_period(),
                "price": {"id": "price_2", "billing_scheme": "tiered"},
                "taxes": [{
                    "amount": 294,
                    "taxable_amount": 4200,
                    "tax_behavior": "exclusive",
                    "tax_rate_details": {"tax_rate": vat_rate("txr_7", "7")}
                }]
            }
        ]}
    })
}

fn converter() -> Converter {
    Converter::new(Regime::de())
}

fn convert(value: Value) -> Document {
    converter()
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap()
}

fn single_line(amount: i64, currency: &str) -> Value {
    json!({
        "object": "invoice",
        "id": "in_single",
        "currency": currency,
        "created": 1718409600,
        "lines": {"data": [{"id": "il_1", "amount": amount, "quantity": 0}]}
    })
}

// --- Invoices ---

#[test]
fn full_invoice_header() {
    let doc = convert(invoice());
    assert_eq!(doc.doc_type, DocumentType::Standard);
    assert_eq!(doc.code, "ACME-0042");
    assert_eq!(doc.issue_date, date(2024, 6, 15));
    assert_eq!(doc.currency.code(), "EUR");
    assert!(doc.exchange_rates.is_none());
    assert!(doc.uuid.is_none());
    assert!(doc.prices_include.is_none());
    assert!(doc.totals.is_none());
    assert!(validate_document(&doc).is_empty());
}

#[test]
fn full_invoice_parties() {
    let doc = convert(invoice());

    let supplier = doc.supplier.unwrap();
    assert_eq!(supplier.name.as_deref(), Some("ACME GmbH"));
    let tax_id = supplier.tax_id.unwrap();
    assert_eq!(tax_id.to_string(), "DE123456789");

    let customer = doc.customer.unwrap();
    assert_eq!(customer.name.as_deref(), Some("Kunde AG"));
    assert_eq!(customer.emails, vec!["ap@kunde.example".to_string()]);
    assert_eq!(customer.addresses[0].city.as_deref(), Some("München"));
    assert_eq!(customer.tax_id.unwrap().code, "987654321");

    let receiver = doc.delivery.unwrap().receiver;
    assert_eq!(receiver.name.as_deref(), Some("Kunde AG Lager"));
    assert_eq!(receiver.addresses[0].postal_code.as_deref(), Some("20457"));
}

#[test]
fn full_invoice_lines() {
    let doc = convert(invoice());
    assert_eq!(doc.lines.len(), 2);

    let seat = &doc.lines[0];
    assert_eq!(seat.index, 1);
    assert_eq!(seat.quantity, dec!(2));
    assert_eq!(seat.item.price.to_string(), "50.00");
    let taxes = seat.taxes.as_ref().unwrap();
    assert_eq!(taxes[0].category, TaxCategory::Vat);
    assert_eq!(taxes[0].country.as_deref(), Some("DE"));
    assert_eq!(taxes[0].key(), Some(RateKey::Standard));

    let api = &doc.lines[1];
    assert_eq!(api.index, 2);
    assert_eq!(api.quantity, Decimal::ONE);
    assert_eq!(api.item.price.to_string(), "42.00");
    assert_eq!(api.taxes.as_ref().unwrap()[0].key(), Some(RateKey::Reduced));

    let ordering = doc.ordering.unwrap();
    assert_eq!(ordering.period.start, date(2024, 6, 1));
    assert_eq!(ordering.period.end, date(2024, 7, 1));
}

#[test]
fn full_invoice_payment_and_notes() {
    let doc = convert(invoice());

    let payment = doc.payment.unwrap();
    let terms = payment.terms.unwrap();
    assert_eq!(terms.key, TermsKey::DueDate);
    assert_eq!(terms.due_dates[0].date, date(2024, 7, 4));
    assert_eq!(payment.instructions.unwrap().means, PaymentMeans::DirectDebit);
    assert!(payment.advances.is_empty());

    assert_eq!(doc.notes.len(), 2);
    assert_eq!(doc.notes[0].key, NoteKey::General);
    assert_eq!(doc.notes[1].key, NoteKey::Legal);
}

#[test]
fn lines_with_different_periods_have_no_ordering() {
    let mut value = invoice();
    value["lines"]["data"][1]["period"] = json!({"start": 1719792000, "end": 1722470400});
    let doc = convert(value);
    assert!(doc.ordering.is_none());
    assert!(doc.lines.iter().all(|l| l.period.is_some()));
}

#[test]
fn draft_invoice_uses_id_as_code() {
    let mut value = invoice();
    value["number"] = Value::Null;
    assert_eq!(convert(value).code, "in_1PQ");
}

#[test]
fn negative_sentinel_line() {
    let doc = convert(single_line(-11000, "eur"));
    assert_eq!(doc.lines[0].quantity, Decimal::ONE);
    assert_eq!(doc.lines[0].item.price.to_string(), "-110.00");
    assert!(doc.lines[0].taxes.is_none());
}

#[test]
fn zero_decimal_currency() {
    let doc = convert(single_line(11000, "jpy"));
    let price = doc.lines[0].item.price;
    assert_eq!(price, dec!(11000));
    assert_eq!(price.scale(), 0);

    let rates = doc.exchange_rates.unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].from.code(), "JPY");
    assert_eq!(rates[0].to.code(), "EUR");
    assert!(rates[0].amount > Decimal::ZERO);
}

#[test]
fn unknown_currency_rate_is_zero() {
    let doc = convert(single_line(100, "xpf"));
    assert_eq!(doc.exchange_rates.unwrap()[0].amount, Decimal::ZERO);
}

#[test]
fn custom_rate_table() {
    let rates = Arc::new(RateTable::new(
        Currency::new("EUR"),
        [("EUR", dec!(1.0000)), ("USD", dec!(1.2500))],
    ));
    let doc = converter()
        .rates(rates)
        .convert(&SourceDocument::from_value(single_line(100, "usd")).unwrap())
        .unwrap();
    assert_eq!(doc.exchange_rates.unwrap()[0].amount, dec!(0.8));
}

// --- Identifiers ---

#[test]
fn document_uuid_is_stable() {
    let mut value = single_line(100, "eur");
    value["id"] = json!("inv_123");
    value["account_name"] = json!("Test Account");
    let source = SourceDocument::from_value(value).unwrap();

    let converter = converter().namespace(namespace());
    let first = converter.convert(&source).unwrap().uuid.unwrap();
    let second = converter.convert(&source).unwrap().uuid.unwrap();
    assert_eq!(first, second);
    assert_eq!(Some(first), document_uuid(Some(namespace()), "Test Account", "inv_123"));

    let mut other = single_line(100, "eur");
    other["id"] = json!("inv_124");
    other["account_name"] = json!("Test Account");
    let third = converter
        .convert(&SourceDocument::from_value(other).unwrap())
        .unwrap()
        .uuid
        .unwrap();
    assert_ne!(first, third);
}

// --- Tax inclusivity and classification ---

#[test]
fn single_inclusive_total_tax_sets_flag() {
    let mut value = invoice();
    value["total_taxes"][0]["tax_behavior"] = json!("inclusive");
    assert_eq!(convert(value).prices_include, Some(TaxCategory::Vat));
}

#[test]
fn no_total_taxes_means_no_flag() {
    let mut value = invoice();
    value["total_taxes"] = json!([]);
    let doc = convert(value);
    assert!(doc.prices_include.is_none());

    let json = serde_json::to_value(&doc).unwrap();
    assert!(json.get("prices_include").is_none());
    assert!(json.get("exchange_rates").is_none());
}

#[test]
fn reverse_charge_takes_regime_country() {
    let mut value = single_line(10000, "eur");
    value["lines"]["data"][0]["taxes"] = json!([{
        "amount": 0,
        "taxable_amount": 10000,
        "taxability_reason": "reverse_charge",
        "tax_rate_details": {"tax_rate": {
            "id": "txr_fr", "display_name": "TVA", "tax_type": "vat", "country": "FR"
        }}
    }]);
    let doc = Converter::new(Regime::es())
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap();
    let combo = &doc.lines[0].taxes.as_ref().unwrap()[0];
    assert_eq!(combo.country.as_deref(), Some("ES"));
    assert_eq!(combo.key(), Some(RateKey::ReverseCharge));
    assert!(combo.percentage().is_none());
}

#[test]
fn ambiguous_external_catalog_keeps_percentage() {
    let ambiguous = Regime::new("DE", "EUR").with_category(CategoryDef {
        code: TaxCategory::Vat,
        rates: vec![
            RateDef {
                key: RateKey::Reduced,
                values: vec![RateValueDef::new(dec!(10))],
            },
            RateDef {
                key: RateKey::Intermediate,
                values: vec![RateValueDef::new(dec!(10))],
            },
        ],
    });
    let mut value = single_line(10000, "eur");
    value["lines"]["data"][0]["taxes"] = json!([{
        "amount": 1000,
        "taxable_amount": 10000,
        "tax_rate_details": {"tax_rate": vat_rate("txr_10", "10")}
    }]);

    let doc = converter()
        .catalog(Arc::new(vec![ambiguous]))
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap();
    let combo = &doc.lines[0].taxes.as_ref().unwrap()[0];
    assert_eq!(combo.percentage(), Some(dec!(10)));
    assert_eq!(combo.key(), None);
}

#[test]
fn unclassifiable_taxes_leave_no_combo() {
    let mut value = single_line(10000, "eur");
    value["lines"]["data"][0]["taxes"] = json!([{
        "amount": 1000,
        "taxable_amount": 10000,
        "tax_rate_details": {"tax_rate": "txr_unexpanded"}
    }]);
    assert!(convert(value).lines[0].taxes.is_none());
}

// --- Credit notes ---

fn credit_note(invoice: Value) -> Value {
    json!({
        "object": "credit_note",
        "id": "cn_1",
        "number": "ACME-0042-CN-01",
        "currency": "eur",
        "created": 1719792000,
        "memo": "Partial refund for unused seats",
        "reason": "order_change",
        "invoice": invoice,
        "lines": {"data": [
            {"id": "cnli_1", "amount": 5000, "quantity": 1, "type": "invoice_line_item",
             "unit_amount_decimal": "5000", "description": "Pro seat"},
            {"id": "cnli_2", "amount": 1500, "quantity": 1, "type": "custom_line_item",
             "description": "Goodwill"}
        ]}
    })
}

#[test]
fn credit_note_against_expanded_invoice() {
    let doc = convert(credit_note(invoice()));
    assert_eq!(doc.doc_type, DocumentType::CreditNote);
    assert_eq!(doc.doc_type.code(), 381);
    assert_eq!(doc.code, "ACME-0042-CN-01");
    assert_eq!(doc.issue_date, date(2024, 7, 1));

    assert_eq!(
        doc.preceding,
        vec![DocumentRef {
            code: "ACME-0042".into(),
            issue_date: Some(date(2024, 6, 15)),
        }]
    );
    assert_eq!(doc.supplier.unwrap().name.as_deref(), Some("ACME GmbH"));
    assert_eq!(doc.customer.unwrap().name.as_deref(), Some("Kunde AG"));
    assert!(doc.delivery.is_none());
    assert!(doc.payment.is_none());

    assert_eq!(doc.lines[0].item.price.to_string(), "50.00");
    assert_eq!(doc.lines[1].quantity, Decimal::ONE);
    assert_eq!(doc.lines[1].item.price.to_string(), "15.00");

    let reason = doc.notes.iter().find(|n| n.key == NoteKey::Reason).unwrap();
    assert_eq!(reason.text, "Order change");
}

#[test]
fn credit_note_against_invoice_id() {
    let mut value = credit_note(json!("in_1PQ"));
    value["customer"] = json!({"id": "cus_1", "name": "Live Name AG"});
    let doc = convert(value);
    assert_eq!(doc.preceding[0].code, "in_1PQ");
    assert!(doc.preceding[0].issue_date.is_none());
    assert!(doc.supplier.is_none());
    assert_eq!(doc.customer.unwrap().name.as_deref(), Some("Live Name AG"));
}

#[test]
fn credit_note_uuid_uses_invoice_account() {
    let doc = converter()
        .namespace(namespace())
        .convert(&SourceDocument::from_value(credit_note(invoice())).unwrap())
        .unwrap();
    assert_eq!(doc.uuid, document_uuid(Some(namespace()), "ACME GmbH", "cn_1"));
}

// --- Errors ---

#[test]
fn unsupported_kind_is_a_hard_error() {
    let err = converter()
        .convert_json(r#"{"object": "subscription", "id": "sub_1"}"#)
        .unwrap_err();
    assert!(err.is(ErrorKind::UnsupportedKind));
    assert_eq!(err.object_id(), Some("sub_1"));
    assert!(err.to_string().contains("subscription"));
}

#[test]
fn malformed_nested_structure() {
    let mut value = invoice();
    value["lines"]["data"][0]["amount"] = json!("a lot");
    let err = SourceDocument::from_value(value).unwrap_err();
    assert!(err.is(ErrorKind::Malformed));
    assert_eq!(err.object_id(), Some("in_1PQ"));
    assert!(err.source().is_some());
}

#[test]
fn out_of_range_timestamp() {
    let mut value = single_line(100, "eur");
    value["created"] = json!(i64::MAX);
    let err = converter()
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap_err();
    assert!(err.is(ErrorKind::Malformed));
    assert_eq!(err.offending_field(), Some("created"));
}

#[test]
fn line_errors_name_the_document_and_line() {
    let mut value = single_line(100, "eur");
    value["id"] = json!("in_ctx");
    value["lines"]["data"].as_array_mut().unwrap().push(json!({
        "id": "il_2",
        "amount": 100,
        "period": {"start": i64::MAX, "end": 1719792000}
    }));
    let err = converter()
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap_err();
    assert!(err.is(ErrorKind::Malformed));
    assert_eq!(err.object_id(), Some("in_ctx"));
    assert_eq!(err.offending_field(), Some("lines[1].period.start"));
}

#[test]
fn reversed_line_period_is_invalid() {
    let mut value = single_line(100, "eur");
    value["lines"]["data"][0]["period"] = json!({"start": 1719792000, "end": 1717200000});
    let err = converter()
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap_err();
    assert!(err.is(ErrorKind::Invalid));
    assert_eq!(err.object_id(), Some("in_single"));
    assert_eq!(err.offending_field(), Some("lines[0].period"));
    assert_eq!(err.field_errors()[0].code.as_deref(), Some("line-period"));
}

#[test]
fn large_invoices_convert_in_full() {
    let lines: Vec<Value> = (0..10_001)
        .map(|i| json!({"id": format!("il_{i}"), "amount": 100, "quantity": 1}))
        .collect();
    let value = json!({
        "object": "invoice",
        "id": "in_big",
        "currency": "eur",
        "created": 1718409600,
        "lines": {"data": lines}
    });
    let doc = convert(value);
    assert_eq!(doc.lines.len(), 10_001);
    assert_eq!(doc.lines[10_000].index, 10_001);
}

// --- Calculation hand-off ---

#[derive(Debug)]
struct Rejected(&'static str);

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected: {}", self.0)
    }
}

impl Error for Rejected {}

struct Summing;

impl Calculator for Summing {
    type Error = Rejected;

    fn calculate(&self, document: &mut Document) -> Result<(), Rejected> {
        let sum: Decimal = document
            .lines
            .iter()
            .map(|l| l.item.price * l.quantity)
            .sum();
        document.totals = Some(Totals {
            sum,
            tax: Decimal::ZERO,
            total: sum,
            payable: sum,
        });
        Ok(())
    }
}

struct Rejecting;

impl Calculator for Rejecting {
    type Error = Rejected;

    fn calculate(&self, _: &mut Document) -> Result<(), Rejected> {
        Err(Rejected("missing supplier tax id"))
    }
}

#[test]
fn calculator_fills_totals() {
    let source = SourceDocument::from_value(invoice()).unwrap();
    let doc = converter().convert_and_calculate(&source, &Summing).unwrap();
    assert_eq!(doc.totals.unwrap().sum, dec!(142.00));
}

#[test]
fn calculator_failure_passes_through() {
    let source = SourceDocument::from_value(invoice()).unwrap();
    let err = converter()
        .convert_and_calculate(&source, &Rejecting)
        .unwrap_err();
    assert!(err.is(ErrorKind::Downstream));
    assert_eq!(err.object_id(), Some("in_1PQ"));
    let original = err.source().unwrap().downcast_ref::<Rejected>().unwrap();
    assert_eq!(original.0, "missing supplier tax id");
}

// --- Configuration and concurrency ---

#[test]
fn one_converter_many_threads() {
    let converter = converter().namespace(namespace());
    let sources: Vec<SourceDocument> = (0..8)
        .map(|i| {
            let mut value = invoice();
            value["id"] = json!(format!("in_{i}"));
            SourceDocument::from_value(value).unwrap()
        })
        .collect();

    let converter = &converter;
    let ids: Vec<Uuid> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || converter.convert(source).unwrap().uuid.unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn custom_extension_prefix() {
    let mut value = single_line(100, "eur");
    value["lines"]["data"][0]["metadata"] = json!({"x-cost-center": "42", "ext:sku": "A"});
    let doc = converter()
        .ext_prefix("x-")
        .convert(&SourceDocument::from_value(value).unwrap())
        .unwrap();
    let ext = &doc.lines[0].item.ext;
    assert_eq!(ext.len(), 1);
    assert_eq!(ext["cost-center"], "42");
}
