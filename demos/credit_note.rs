use billing_convert::convert::Converter;
use billing_convert::core::*;
use billing_convert::source::SourceDocument;

const CREDIT_NOTE: &str = r#"{
    "object": "credit_note",
    "id": "cn_1PQz",
    "number": "ACME-0042-CN-01",
    "currency": "eur",
    "created": 1719792000,
    "memo": "One seat was never used.",
    "reason": "product_unsatisfactory",
    "invoice": {
        "id": "in_1PQx2Y",
        "number": "ACME-0042",
        "currency": "eur",
        "created": 1718409600,
        "account_name": "ACME GmbH",
        "account_tax_ids": [{"id": "txi_1", "type": "de_stn", "value": "143/260/50063"}],
        "customer_name": "Kunde AG",
        "customer_tax_ids": [{"type": "eu_vat", "value": "DE987654321"}]
    },
    "lines": {"data": [{
        "id": "cnli_1",
        "amount": 2500,
        "quantity": 1,
        "type": "invoice_line_item",
        "unit_amount_decimal": "2500",
        "description": "Team plan seat"
    }]}
}"#;

fn main() {
    let converter = Converter::new(Regime::de());

    match converter.convert_json(CREDIT_NOTE) {
        Ok(doc) => {
            println!("Credit note {} ({})", doc.code, doc.doc_type.code());
            for reference in &doc.preceding {
                println!("  corrects {} of {:?}", reference.code, reference.issue_date);
            }
            for note in &doc.notes {
                println!("  {:?}: {}", note.key, note.text);
            }
            if let Some(identity) = doc.supplier.as_ref().and_then(|s| s.identity.as_ref()) {
                println!("  supplier {}: {}", identity.key, identity.code);
            }
        }
        Err(e) => println!("Conversion failed: {e}"),
    }

    // Unsupported objects are rejected before any resolver runs.
    match SourceDocument::from_json(r#"{"object": "payout", "id": "po_1"}"#) {
        Ok(_) => println!("unexpected"),
        Err(e) if e.is(ErrorKind::UnsupportedKind) => println!("Rejected: {e}"),
        Err(e) => println!("Other error: {e}"),
    }
}
