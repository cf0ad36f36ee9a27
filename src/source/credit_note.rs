use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::*;
use super::invoice::Invoice;

/// Platform credit note. Parties are read from the credited invoice,
/// which must be expanded for them to appear on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditNote {
    pub id: String,
    pub number: Option<String>,
    pub currency: String,
    pub created: i64,
    pub effective_at: Option<i64>,
    pub memo: Option<String>,
    /// "duplicate", "fraudulent", "order_change" or "product_unsatisfactory".
    pub reason: Option<String>,
    pub customer: Option<Expandable<Customer>>,
    pub invoice: Option<Expandable<Invoice>>,
    #[serde(default)]
    pub lines: List<CreditNoteLine>,
    #[serde(default)]
    pub total_taxes: Option<Vec<TaxAmount>>,
}

impl HasId for CreditNote {
    fn id(&self) -> &str {
        &self.id
    }
}

impl CreditNote {
    pub fn invoice_object(&self) -> Option<&Invoice> {
        self.invoice.as_ref().and_then(Expandable::object)
    }

    pub fn customer_object(&self) -> Option<&Customer> {
        self.customer.as_ref().and_then(Expandable::object)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditNoteLine {
    pub id: String,
    /// Minor units, before discounts.
    pub amount: i64,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    /// "invoice_line_item" or "custom_line_item".
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub unit_amount_decimal: Option<Decimal>,
    #[serde(default)]
    pub discount_amounts: Vec<DiscountAmount>,
    #[serde(default)]
    pub taxes: Option<Vec<TaxAmount>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CreditNoteLine {
    /// Zero when the line has no unit amount, so only its total is used.
    pub fn scheme_quantity(&self) -> i64 {
        match self.unit_amount_decimal {
            None => 0,
            Some(_) => self.quantity.unwrap_or(0),
        }
    }
}
