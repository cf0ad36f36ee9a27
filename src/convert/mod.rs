//! Conversion engine: source platform objects → canonical documents.
//!
//! A [`Converter`] is configured once with the destination regime and
//! then used for any number of documents. It holds no mutable state, so
//! one instance can be shared across threads.
//!
//! # Example
//!
//! ```
//! use billing_convert::convert::Converter;
//! use billing_convert::core::{DocumentType, Regime};
//! use billing_convert::source::SourceDocument;
//! use uuid::Uuid;
//!
//! let source = SourceDocument::from_json(r#"{
//!     "object": "invoice",
//!     "id": "in_1",
//!     "number": "INV-0001",
//!     "currency": "usd",
//!     "created": 1718409600,
//!     "account_name": "ACME GmbH",
//!     "lines": {"data": [{"id": "il_1", "amount": 11000, "description": "Support"}]}
//! }"#)
//! .unwrap();
//!
//! let converter = Converter::new(Regime::de()).namespace(Uuid::NAMESPACE_URL);
//! let doc = converter.convert(&source).unwrap();
//!
//! assert_eq!(doc.doc_type, DocumentType::Standard);
//! assert_eq!(doc.code, "INV-0001");
//! assert_eq!(doc.lines[0].item.price.to_string(), "110.00");
//! assert_eq!(doc.exchange_rates.unwrap()[0].to.code(), "EUR");
//! assert!(doc.uuid.is_some());
//! ```

mod amount;
mod document;
mod exchange;
mod line;
mod party;
mod payment;
mod tax;

pub use amount::{div_keep_scale, minor_decimal_to_amount, to_decimal, to_minor_units};
pub use document::{common_period, document_uuid};
pub use exchange::{RateTable, needs_exchange_rate};
pub use line::{LineContext, LineInput, resolve_line, resolve_price};
pub use party::{
    org_identity, resolve_customer, resolve_customer_object, resolve_receiver, resolve_supplier,
    tax_identity,
};
pub use payment::{payment_means, resolve_payment};
pub use tax::{classify, classify_tax, match_catalog_rate, prices_include, resolve_combo};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{ConvertError, Document, ErrorKind, Regime, RegimeCatalog};
use crate::source::SourceDocument;

/// Converter settings that can live in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Namespace for document identifiers; no identifier is derived without one.
    pub namespace: Option<Uuid>,
    /// Metadata keys with this prefix are copied to line item extensions.
    pub ext_prefix: String,
    /// Country of a built-in regime, used by [`Converter::from_options`].
    pub regime: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            namespace: None,
            ext_prefix: "ext:".to_string(),
            regime: None,
        }
    }
}

/// The external engine that computes totals and validates documents.
pub trait Calculator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn calculate(&self, document: &mut Document) -> Result<(), Self::Error>;
}

/// Converts source documents for one destination regime.
#[derive(Clone)]
pub struct Converter {
    regime: Regime,
    options: ConvertOptions,
    rates: Arc<RateTable>,
    catalog: Option<Arc<dyn RegimeCatalog + Send + Sync>>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("regime", &self.regime.country)
            .field("options", &self.options)
            .field("rates", &self.rates.reference())
            .field("external_catalog", &self.catalog.is_some())
            .finish()
    }
}

impl Converter {
    /// A converter using the regime as its own rate catalog and the
    /// built-in exchange-rate table.
    pub fn new(regime: Regime) -> Self {
        Self {
            regime,
            options: ConvertOptions::default(),
            rates: RateTable::fallback(),
            catalog: None,
        }
    }

    /// Build from options naming a built-in regime.
    pub fn from_options(options: ConvertOptions) -> Result<Self, ConvertError> {
        let country = options.regime.as_deref().unwrap_or_default();
        let regime = Regime::builtin(country).ok_or_else(|| {
            ConvertError::new(
                ErrorKind::Invalid,
                format!("no built-in regime for country '{country}'"),
            )
            .field("regime")
        })?;
        Ok(Self {
            options,
            ..Self::new(regime)
        })
    }

    pub fn namespace(mut self, namespace: Uuid) -> Self {
        self.options.namespace = Some(namespace);
        self
    }

    pub fn ext_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.ext_prefix = prefix.into();
        self
    }

    /// Replace the built-in exchange-rate table.
    pub fn rates(mut self, rates: Arc<RateTable>) -> Self {
        self.rates = rates;
        self
    }

    /// Look rates up in an external catalog instead of the regime.
    pub fn catalog(mut self, catalog: Arc<dyn RegimeCatalog + Send + Sync>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn regime(&self) -> &Regime {
        &self.regime
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub(crate) fn rate_table(&self) -> &RateTable {
        &self.rates
    }

    pub(crate) fn rate_catalog(&self) -> &dyn RegimeCatalog {
        match &self.catalog {
            Some(catalog) => catalog.as_ref(),
            None => &self.regime,
        }
    }

    pub fn convert(&self, source: &SourceDocument) -> Result<Document, ConvertError> {
        match source {
            SourceDocument::Invoice(invoice) => document::assemble_invoice(self, invoice),
            SourceDocument::CreditNote(note) => document::assemble_credit_note(self, note),
        }
    }

    /// Parse and convert in one step.
    pub fn convert_json(&self, json: &str) -> Result<Document, ConvertError> {
        self.convert(&SourceDocument::from_json(json)?)
    }

    /// Convert, then hand the document to the calculation engine. Its
    /// failure is returned as [`ErrorKind::Downstream`] with the original
    /// error as source.
    pub fn convert_and_calculate<C: Calculator>(
        &self,
        source: &SourceDocument,
        calculator: &C,
    ) -> Result<Document, ConvertError> {
        let mut document = self.convert(source)?;
        calculator
            .calculate(&mut document)
            .map_err(|e| ConvertError::downstream(e).object(source.id()))?;
        Ok(document)
    }
}
