use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A reference the platform may return either as an id or as the
/// expanded object, depending on the `expand` parameters of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    /// The expanded object, if the caller fetched it.
    pub fn object(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Object(obj) => Some(obj),
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Object(_))
    }
}

impl<T: HasId> Expandable<T> {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Object(obj) => obj.id(),
        }
    }
}

/// Objects with a platform identifier.
pub trait HasId {
    fn id(&self) -> &str;
}

/// Paginated list wrapper; callers resolve every page before converting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2.
    pub country: Option<String>,
}

/// Shipping details attached to an invoice or customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipping {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

/// Tax identifier of an account or customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxId {
    #[serde(default)]
    pub id: String,
    /// Platform type, e.g. "eu_vat", "de_stn", "gb_vat".
    #[serde(rename = "type")]
    pub id_type: String,
    pub value: String,
    /// Only present on fully expanded tax id objects.
    #[serde(default)]
    pub country: Option<String>,
}

impl HasId for TaxId {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub shipping: Option<Shipping>,
    /// Only present when expanded.
    #[serde(default)]
    pub tax_ids: Option<List<TaxId>>,
}

impl HasId for Customer {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    pub id: String,
    pub country: Option<String>,
    #[serde(default)]
    pub display_name: String,
    pub jurisdiction: Option<String>,
    pub percentage: Option<Decimal>,
    pub effective_percentage: Option<Decimal>,
    #[serde(default)]
    pub inclusive: bool,
    /// e.g. "vat", "sales_tax", "gst".
    pub tax_type: Option<String>,
}

impl HasId for TaxRate {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRateDetails {
    pub tax_rate: Expandable<TaxRate>,
}

/// Tax applied to a line, or one of the document total taxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxAmount {
    /// Minor units.
    pub amount: i64,
    /// "inclusive" or "exclusive".
    pub tax_behavior: Option<String>,
    pub taxability_reason: Option<String>,
    /// Minor units.
    pub taxable_amount: Option<i64>,
    pub tax_rate_details: Option<TaxRateDetails>,
}

impl TaxAmount {
    pub fn is_inclusive(&self) -> bool {
        self.tax_behavior.as_deref() == Some("inclusive")
    }

    /// The expanded tax rate, if any.
    pub fn tax_rate(&self) -> Option<&TaxRate> {
        self.tax_rate_details
            .as_ref()
            .and_then(|d| d.tax_rate.object())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub name: Option<String>,
    pub percent_off: Option<Decimal>,
    pub amount_off: Option<i64>,
}

impl HasId for Coupon {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSource {
    pub coupon: Option<Expandable<Coupon>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    /// Older API versions put the coupon directly on the discount.
    pub coupon: Option<Coupon>,
    pub source: Option<DiscountSource>,
}

impl HasId for Discount {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Discount {
    pub fn coupon(&self) -> Option<&Coupon> {
        self.source
            .as_ref()
            .and_then(|s| s.coupon.as_ref())
            .and_then(Expandable::object)
            .or(self.coupon.as_ref())
    }
}

/// Amount a discount took off a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountAmount {
    /// Minor units.
    pub amount: i64,
    pub discount: Option<Expandable<Discount>>,
}

/// Billing period as unix timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl HasId for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    /// "per_unit" or "tiered".
    pub billing_scheme: Option<String>,
    pub unit_amount_decimal: Option<Decimal>,
    pub product: Option<Expandable<Product>>,
}

impl HasId for Price {
    fn id(&self) -> &str {
        &self.id
    }
}
