use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::*;

/// Platform invoice, the subset of fields the converter reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Assigned on finalization; drafts have none.
    pub number: Option<String>,
    /// Lower-case ISO 4217.
    pub currency: String,
    /// Unix timestamp.
    pub created: i64,
    /// Unix timestamp of finalization.
    pub effective_at: Option<i64>,
    pub due_date: Option<i64>,
    pub description: Option<String>,
    pub footer: Option<String>,
    /// "charge_automatically" or "send_invoice".
    pub collection_method: Option<String>,

    pub account_country: Option<String>,
    pub account_name: Option<String>,
    #[serde(default)]
    pub account_tax_ids: Option<Vec<Expandable<TaxId>>>,

    pub customer: Option<Expandable<Customer>>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<Address>,
    pub customer_shipping: Option<Shipping>,
    #[serde(default)]
    pub customer_tax_ids: Option<Vec<TaxId>>,
    pub shipping_details: Option<Shipping>,

    #[serde(default)]
    pub lines: List<InvoiceLine>,
    #[serde(default)]
    pub total_taxes: Option<Vec<TaxAmount>>,

    /// Minor units.
    #[serde(default)]
    pub amount_paid: i64,
    pub payment_settings: Option<PaymentSettings>,
    pub status_transitions: Option<StatusTransitions>,
}

impl HasId for Invoice {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Invoice {
    /// The expanded customer object, if fetched.
    pub fn customer_object(&self) -> Option<&Customer> {
        self.customer.as_ref().and_then(Expandable::object)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default)]
    pub payment_method_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTransitions {
    pub finalized_at: Option<i64>,
    pub paid_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: String,
    /// Minor units, before discounts.
    pub amount: i64,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub period: Option<Period>,
    #[serde(default)]
    pub proration: bool,
    pub price: Option<Price>,
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub discount_amounts: Vec<DiscountAmount>,
    #[serde(default)]
    pub taxes: Option<Vec<TaxAmount>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Pricing details of a line on newer API versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Minor units, may carry fractional digits.
    pub unit_amount_decimal: Option<Decimal>,
}

impl InvoiceLine {
    /// The quantity the line resolver works from: zero when only the line
    /// total is meaningful (tiered pricing, proration or no quantity).
    pub fn scheme_quantity(&self) -> i64 {
        let tiered = self
            .price
            .as_ref()
            .and_then(|p| p.billing_scheme.as_deref())
            == Some("tiered");
        if tiered || self.proration {
            return 0;
        }
        self.quantity.unwrap_or(0)
    }

    /// Unit amount in minor units, from the pricing block or the price.
    pub fn unit_amount_decimal(&self) -> Option<Decimal> {
        self.pricing
            .as_ref()
            .and_then(|p| p.unit_amount_decimal)
            .or_else(|| self.price.as_ref().and_then(|p| p.unit_amount_decimal))
    }

    pub fn product(&self) -> Option<&Product> {
        self.price
            .as_ref()
            .and_then(|p| p.product.as_ref())
            .and_then(Expandable::object)
    }
}
