use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currencies::Currency;

/// The canonical billing document handed to the calculation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Deterministic identifier, absent when no namespace was configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Natural code taken from the source document.
    pub code: String,
    pub issue_date: NaiveDate,
    pub currency: Currency,
    /// At most one entry; `None` when the document and regime currencies match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rates: Option<Vec<ExchangeRate>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preceding: Vec<DocumentRef>,
    /// Tax category whose rates are already included in line prices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_include: Option<TaxCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Party>,
    pub lines: Vec<Line>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Ordering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// Populated by the calculation engine, never by the converter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
}

/// Document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// 380: Commercial invoice.
    Standard,
    /// 381: Credit note.
    CreditNote,
}

impl DocumentType {
    /// UNTDID 1001 numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Standard => 380,
            Self::CreditNote => 381,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::CreditNote => "credit-note",
        }
    }
}

/// Reference to an earlier document, e.g. the invoice a credit note corrects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
}

/// Exchange rate from the document currency into the regime currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: Currency,
    pub to: Currency,
    pub amount: Decimal,
}

/// Supplier, customer or delivery receiver.
///
/// Every field is optional: a party only exists once at least one of them
/// was found in the source, see [`PartyBuilder`](super::PartyBuilder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxIdentity>,
    /// Organization identity, used instead of `tax_id` for local tax numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telephones: Vec<String>,
}

/// Tax identity: country plus the national code without the country prefix.
/// A tax identity may carry only a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxIdentity {
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
}

impl fmt::Display for TaxIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.country, self.code)
    }
}

/// Organization identity such as a German Steuernummer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub key: String,
    pub code: String,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    /// ISO 3166-1 alpha-2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// 1-based position in the document.
    pub index: usize,
    /// Always greater than zero.
    pub quantity: Decimal,
    pub item: Item,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<Discount>,
    /// `None` when the source line carries no tax records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Vec<TaxCombo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

/// What was sold on a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Unit price in the document currency.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Extension values copied from prefixed source metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ext: BTreeMap<String, String>,
}

/// Line discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(flatten)]
    pub value: DiscountValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountValue {
    /// Absolute amount in the document currency.
    Amount(Decimal),
    /// Percentage of the line sum.
    Percent(Decimal),
}

/// Destination tax category code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaxCategory {
    /// VAT: value added tax.
    Vat,
    /// ST: US style sales tax.
    SalesTax,
    /// GST: goods and services tax.
    Gst,
    /// Opaque code taken verbatim from the source.
    Other(String),
}

impl TaxCategory {
    pub fn code(&self) -> &str {
        match self {
            Self::Vat => "VAT",
            Self::SalesTax => "ST",
            Self::Gst => "GST",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "VAT" => Self::Vat,
            "ST" => Self::SalesTax,
            "GST" => Self::Gst,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for TaxCategory {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<TaxCategory> for String {
    fn from(category: TaxCategory) -> Self {
        category.code().to_string()
    }
}

/// Named tax rate keys used by regime catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateKey {
    Standard,
    Intermediate,
    Reduced,
    SuperReduced,
    Zero,
    Exempt,
    /// Tax liability shifts to the customer.
    ReverseCharge,
    IntraCommunity,
    Export,
    OutsideScope,
}

impl RateKey {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Intermediate => "intermediate",
            Self::Reduced => "reduced",
            Self::SuperReduced => "super-reduced",
            Self::Zero => "zero",
            Self::Exempt => "exempt",
            Self::ReverseCharge => "reverse-charge",
            Self::IntraCommunity => "intra-community",
            Self::Export => "export",
            Self::OutsideScope => "outside-scope",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "standard" => Some(Self::Standard),
            "intermediate" => Some(Self::Intermediate),
            "reduced" => Some(Self::Reduced),
            "super-reduced" => Some(Self::SuperReduced),
            "zero" => Some(Self::Zero),
            "exempt" => Some(Self::Exempt),
            "reverse-charge" => Some(Self::ReverseCharge),
            "intra-community" => Some(Self::IntraCommunity),
            "export" => Some(Self::Export),
            "outside-scope" => Some(Self::OutsideScope),
            _ => None,
        }
    }
}

/// How a tax combo expresses its rate. A combo never has both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboRate {
    Rate(RateKey),
    Percent(Decimal),
}

/// One tax applied to a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCombo {
    #[serde(rename = "cat")]
    pub category: TaxCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub rate: Option<ComboRate>,
}

impl TaxCombo {
    pub fn new(category: TaxCategory) -> Self {
        Self {
            category,
            country: None,
            rate: None,
        }
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn percent(mut self, percent: Decimal) -> Self {
        self.rate = Some(ComboRate::Percent(percent));
        self
    }

    pub fn rate_key(mut self, key: RateKey) -> Self {
        self.rate = Some(ComboRate::Rate(key));
        self
    }

    pub fn percentage(&self) -> Option<Decimal> {
        match self.rate {
            Some(ComboRate::Percent(p)) => Some(p),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<RateKey> {
        match self.rate {
            Some(ComboRate::Rate(k)) => Some(k),
            _ => None,
        }
    }
}

/// Calendar period, both ends inclusive as given by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Ordering details, only present when every line shares one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub receiver: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<PaymentTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<PaymentInstructions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advances: Vec<Advance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub key: TermsKey,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub due_dates: Vec<DueDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermsKey {
    /// Payment expected by the listed due dates.
    DueDate,
    /// Charged automatically on issue.
    Instant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDate {
    pub date: NaiveDate,
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstructions {
    pub means: PaymentMeans,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Payment means, keyed like the canonical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMeans {
    Any,
    Card,
    CreditTransfer,
    DirectDebit,
    Online,
}

/// Amount already paid against the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub key: NoteKey,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKey {
    General,
    Legal,
    /// Why a credit note was issued.
    Reason,
}

/// Document totals, filled in by the calculation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line amounts after discounts.
    pub sum: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Amount due after advances.
    pub payable: Decimal,
}
