//! Tax regime catalogs.
//!
//! A regime lists the tax categories of a jurisdiction and the dated rate
//! values of each category. The calculation engine owns the authoritative
//! definitions; this crate only needs them as a lookup when naming rates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::currencies::Currency;
use super::types::{RateKey, TaxCategory};

/// Lookup interface onto the published rate catalogs.
pub trait RegimeCatalog {
    /// Rate definitions of `category` in `country`, if the catalog knows them.
    fn category(&self, country: &str, category: &TaxCategory) -> Option<&CategoryDef>;
}

/// Tax regime of one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regime {
    /// ISO 3166-1 alpha-2.
    pub country: String,
    pub currency: Currency,
    pub categories: Vec<CategoryDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub code: TaxCategory,
    #[serde(default)]
    pub rates: Vec<RateDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDef {
    pub key: RateKey,
    #[serde(default)]
    pub values: Vec<RateValueDef>,
}

/// One dated value of a rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateValueDef {
    pub percent: Decimal,
    /// Additional percentage charged on top, e.g. Spanish equivalence surcharge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Decimal>,
    /// First day the value applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
    /// First day the value no longer applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

impl RateValueDef {
    pub fn new(percent: Decimal) -> Self {
        Self {
            percent,
            surcharge: None,
            since: None,
            until: None,
        }
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    pub fn surcharge(mut self, percent: Decimal) -> Self {
        self.surcharge = Some(percent);
        self
    }

    /// Whether `date` falls within `[since, until)`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.since.is_none_or(|since| since <= date) && self.until.is_none_or(|until| date < until)
    }
}

impl Regime {
    pub fn new(country: impl Into<String>, currency: impl Into<Currency>) -> Self {
        Self {
            country: country.into(),
            currency: currency.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: CategoryDef) -> Self {
        self.categories.push(category);
        self
    }

    pub fn category_def(&self, code: &TaxCategory) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| &c.code == code)
    }

    /// A built-in regime by ISO country code.
    pub fn builtin(country: &str) -> Option<Self> {
        match country.trim().to_ascii_uppercase().as_str() {
            "DE" => Some(Self::de()),
            "ES" => Some(Self::es()),
            _ => None,
        }
    }

    /// Germany: 19 % / 7 %, including the reduced rates of the second half of 2020.
    pub fn de() -> Self {
        let jul_2020 = ymd(2020, 7, 1);
        let jan_2021 = ymd(2021, 1, 1);
        Self::new("DE", "EUR").with_category(CategoryDef {
            code: TaxCategory::Vat,
            rates: vec![
                RateDef {
                    key: RateKey::Zero,
                    values: vec![RateValueDef::new(dec!(0)).since(ymd(2023, 1, 1))],
                },
                RateDef {
                    key: RateKey::Standard,
                    values: vec![
                        RateValueDef::new(dec!(19)).since(jan_2021),
                        RateValueDef::new(dec!(16)).since(jul_2020).until(jan_2021),
                        RateValueDef::new(dec!(19))
                            .since(ymd(2007, 1, 1))
                            .until(jul_2020),
                    ],
                },
                RateDef {
                    key: RateKey::Reduced,
                    values: vec![
                        RateValueDef::new(dec!(7)).since(jan_2021),
                        RateValueDef::new(dec!(5)).since(jul_2020).until(jan_2021),
                        RateValueDef::new(dec!(7))
                            .since(ymd(1983, 7, 1))
                            .until(jul_2020),
                    ],
                },
            ],
        })
    }

    /// Spain: 21 % / 10 % / 4 %, plus the surcharged standard rate.
    pub fn es() -> Self {
        let sep_2012 = ymd(2012, 9, 1);
        Self::new("ES", "EUR").with_category(CategoryDef {
            code: TaxCategory::Vat,
            rates: vec![
                RateDef {
                    key: RateKey::Zero,
                    values: vec![RateValueDef::new(dec!(0))],
                },
                RateDef {
                    key: RateKey::Standard,
                    values: vec![RateValueDef::new(dec!(21)).since(sep_2012)],
                },
                RateDef {
                    key: RateKey::Reduced,
                    values: vec![RateValueDef::new(dec!(10)).since(sep_2012)],
                },
                RateDef {
                    key: RateKey::SuperReduced,
                    values: vec![RateValueDef::new(dec!(4)).since(ymd(1995, 1, 1))],
                },
                // Same percentages as above but billed with the equivalence
                // surcharge, which the converter cannot express.
                RateDef {
                    key: RateKey::Standard,
                    values: vec![
                        RateValueDef::new(dec!(21))
                            .since(sep_2012)
                            .surcharge(dec!(5.2)),
                    ],
                },
            ],
        })
    }
}

impl RegimeCatalog for Regime {
    fn category(&self, country: &str, category: &TaxCategory) -> Option<&CategoryDef> {
        if !self.country.eq_ignore_ascii_case(country) {
            return None;
        }
        self.category_def(category)
    }
}

impl RegimeCatalog for [Regime] {
    fn category(&self, country: &str, category: &TaxCategory) -> Option<&CategoryDef> {
        self.iter().find_map(|r| r.category(country, category))
    }
}

impl RegimeCatalog for Vec<Regime> {
    fn category(&self, country: &str, category: &TaxCategory) -> Option<&CategoryDef> {
        self.as_slice().category(country, category)
    }
}

/// Literal dates of the built-in catalogs; a typo here is a bug, not input.
fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("built-in catalog date is a valid calendar date")
}
