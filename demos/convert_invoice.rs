use billing_convert::convert::Converter;
use billing_convert::core::*;
use billing_convert::source::SourceDocument;
use uuid::Uuid;

const INVOICE: &str = r#"{
    "object": "invoice",
    "id": "in_1PQx2Y",
    "number": "ACME-0042",
    "currency": "usd",
    "created": 1718409600,
    "collection_method": "charge_automatically",
    "amount_paid": 11900,
    "status_transitions": {"paid_at": 1718409700},
    "payment_settings": {"payment_method_types": ["card"]},
    "account_name": "ACME GmbH",
    "account_country": "DE",
    "account_tax_ids": [{"id": "txi_1", "type": "eu_vat", "value": "DE123456789"}],
    "customer_name": "Example Inc.",
    "customer_address": {"line1": "1 Market St", "city": "San Francisco", "postal_code": "94105", "state": "CA", "country": "US"},
    "total_taxes": [{
        "amount": 1900,
        "taxable_amount": 10000,
        "tax_behavior": "exclusive",
        "tax_rate_details": {"tax_rate": {"id": "txr_1", "display_name": "VAT", "tax_type": "vat"}}
    }],
    "lines": {"data": [{
        "id": "il_1",
        "amount": 10000,
        "quantity": 4,
        "description": "Team plan (4 seats)",
        "period": {"start": 1717200000, "end": 1719792000},
        "price": {"id": "price_1", "billing_scheme": "per_unit", "unit_amount_decimal": "2500"},
        "taxes": [{
            "amount": 1900,
            "taxable_amount": 10000,
            "tax_behavior": "exclusive",
            "tax_rate_details": {"tax_rate": {"id": "txr_1", "display_name": "VAT", "tax_type": "vat"}}
        }]
    }]}
}"#;

fn main() {
    let source = SourceDocument::from_json(INVOICE).expect("fixture should parse");
    let converter = Converter::new(Regime::de()).namespace(Uuid::NAMESPACE_URL);
    let doc = converter.convert(&source).expect("invoice should convert");

    println!("Document: {} ({})", doc.code, doc.doc_type.key());
    println!("UUID:     {}", doc.uuid.map(|u| u.to_string()).unwrap_or_default());
    println!("Date:     {}", doc.issue_date);
    println!("Currency: {}", doc.currency);
    for rate in doc.exchange_rates.iter().flatten() {
        println!("Rate:     1 {} = {} {}", rate.from, rate.amount, rate.to);
    }
    if let Some(supplier) = &doc.supplier {
        println!("Supplier: {}", supplier.name.as_deref().unwrap_or("-"));
    }
    if let Some(customer) = &doc.customer {
        println!("Customer: {}", customer.name.as_deref().unwrap_or("-"));
    }
    println!("---");
    for line in &doc.lines {
        let taxes: Vec<String> = line
            .taxes
            .iter()
            .flatten()
            .map(|t| match (t.key(), t.percentage()) {
                (Some(key), _) => format!("{} {}", t.category, key.key()),
                (None, Some(p)) => format!("{} {p}%", t.category),
                (None, None) => t.category.to_string(),
            })
            .collect();
        println!(
            "  {} x {} @ {} [{}]",
            line.quantity,
            line.item.name,
            line.item.price,
            taxes.join(", ")
        );
    }
    println!("---");
    println!(
        "{}",
        serde_json::to_string_pretty(&doc).expect("document should serialize")
    );
}
