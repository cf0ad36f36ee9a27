//! Billing-platform input schema.
//!
//! Only the fields the converter reads are modelled; everything else in
//! the platform payload is ignored. The `object` discriminator is read once
//! here, so the rest of the crate works on a typed [`SourceDocument`].
//!
//! ```
//! use billing_convert::source::SourceDocument;
//!
//! let doc = SourceDocument::from_json(
//!     r#"{"object": "invoice", "id": "in_1", "currency": "eur", "created": 1718409600}"#,
//! )
//! .unwrap();
//! assert_eq!(doc.id(), "in_1");
//!
//! let err = SourceDocument::from_json(r#"{"object": "payout", "id": "po_1"}"#).unwrap_err();
//! assert!(err.is(billing_convert::core::ErrorKind::UnsupportedKind));
//! ```

mod common;
mod credit_note;
mod invoice;

pub use common::*;
pub use credit_note::*;
pub use invoice::*;

use serde_json::Value;

use crate::core::ConvertError;

/// A parsed platform object, tagged by its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDocument {
    Invoice(Box<Invoice>),
    CreditNote(Box<CreditNote>),
}

impl SourceDocument {
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            ConvertError::malformed(format!("invalid JSON: {e}")).with_source(e)
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConvertError> {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let Some(kind) = value
            .get("object")
            .and_then(Value::as_str)
            .map(String::from)
        else {
            return Err(ConvertError::malformed("missing object kind")
                .field("object")
                .or_object(&id));
        };

        let parsed = match kind.as_str() {
            "invoice" => serde_json::from_value(value).map(|i| Self::Invoice(Box::new(i))),
            "credit_note" => serde_json::from_value(value).map(|c| Self::CreditNote(Box::new(c))),
            other => return Err(ConvertError::unsupported_kind(other).or_object(&id)),
        };

        parsed.map_err(|e| {
            ConvertError::malformed(format!("does not match the {kind} schema: {e}"))
                .or_object(&id)
                .with_source(e)
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Invoice(inv) => &inv.id,
            Self::CreditNote(cn) => &cn.id,
        }
    }

    /// The discriminator value this document was parsed from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Invoice(_) => "invoice",
            Self::CreditNote(_) => "credit_note",
        }
    }
}

impl From<Invoice> for SourceDocument {
    fn from(invoice: Invoice) -> Self {
        Self::Invoice(Box::new(invoice))
    }
}

impl From<CreditNote> for SourceDocument {
    fn from(credit_note: CreditNote) -> Self {
        Self::CreditNote(Box::new(credit_note))
    }
}
