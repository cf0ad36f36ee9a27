//! ISO 4217 currency codes and minor-unit scales.
//!
//! The billing platform sends lower-case codes and amounts in minor units;
//! the canonical format wants upper-case codes and decimal amounts. The
//! scale of a currency decides how many fractional digits an amount has.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper-case ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Normalizes the code to upper case; the platform sends "eur".
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of fractional digits: 0 for zero-decimal currencies, else 2.
    pub fn scale(&self) -> u32 {
        if self.is_zero_decimal() { 0 } else { 2 }
    }

    pub fn is_zero_decimal(&self) -> bool {
        is_zero_decimal_currency(&self.0)
    }

    pub fn is_known(&self) -> bool {
        is_known_currency_code(&self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Check whether `code` has no minor unit on the billing platform.
pub fn is_zero_decimal_currency(code: &str) -> bool {
    ZERO_DECIMAL_CODES.binary_search(&code).is_ok()
}

/// Currencies the billing platform bills in whole units.
/// Sorted for binary search.
static ZERO_DECIMAL_CODES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Sorted list of common ISO 4217 currency codes.
/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", // UAE Dirham
    "ARS", // Argentine Peso
    "AUD", // Australian Dollar
    "BGN", // Bulgarian Lev
    "BIF", // Burundian Franc
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CLP", // Chilean Peso
    "CNY", // Chinese Yuan
    "COP", // Colombian Peso
    "CZK", // Czech Koruna
    "DJF", // Djiboutian Franc
    "DKK", // Danish Krone
    "EUR", // Euro
    "GBP", // Pound Sterling
    "GNF", // Guinean Franc
    "HKD", // Hong Kong Dollar
    "HUF", // Hungarian Forint
    "IDR", // Indonesian Rupiah
    "ILS", // Israeli Shekel
    "INR", // Indian Rupee
    "JPY", // Japanese Yen
    "KMF", // Comorian Franc
    "KRW", // South Korean Won
    "MGA", // Malagasy Ariary
    "MXN", // Mexican Peso
    "MYR", // Malaysian Ringgit
    "NOK", // Norwegian Krone
    "NZD", // New Zealand Dollar
    "PEN", // Peruvian Sol
    "PHP", // Philippine Peso
    "PLN", // Polish Zloty
    "PYG", // Paraguayan Guarani
    "RON", // Romanian Leu
    "RWF", // Rwandan Franc
    "SEK", // Swedish Krona
    "SGD", // Singapore Dollar
    "THB", // Thai Baht
    "TRY", // Turkish Lira
    "TWD", // New Taiwan Dollar
    "UGX", // Ugandan Shilling
    "USD", // US Dollar
    "UYU", // Uruguayan Peso
    "VND", // Vietnamese Dong
    "VUV", // Vanuatu Vatu
    "XAF", // Central African CFA Franc
    "XOF", // West African CFA Franc
    "XPF", // CFP Franc
    "ZAR", // South African Rand
];
