//! # billing-convert
//!
//! Converts invoices and credit notes of a billing platform into canonical,
//! tax-regime-aware billing documents, ready for an external engine that
//! computes totals and validates them.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Conversion is pure: no I/O, no shared mutable state, so one
//! [`Converter`](convert::Converter) can serve any number of threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use billing_convert::convert::Converter;
//! use billing_convert::core::{Regime, TaxCategory};
//! use billing_convert::source::SourceDocument;
//!
//! let source = SourceDocument::from_json(r#"{
//!     "object": "invoice",
//!     "id": "in_1",
//!     "currency": "eur",
//!     "created": 1718409600,
//!     "total_taxes": [{
//!         "amount": 190,
//!         "taxable_amount": 1000,
//!         "tax_behavior": "inclusive",
//!         "tax_rate_details": {"tax_rate": {"id": "txr_1", "display_name": "VAT", "tax_type": "vat"}}
//!     }],
//!     "lines": {"data": [{"id": "il_1", "amount": 1190, "quantity": 1,
//!         "price": {"id": "price_1", "unit_amount_decimal": "1190"}}]}
//! }"#)
//! .unwrap();
//!
//! let doc = Converter::new(Regime::de()).convert(&source).unwrap();
//! assert_eq!(doc.prices_include, Some(TaxCategory::Vat));
//! assert!(doc.exchange_rates.is_none());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Canonical document model, builders, regime catalogs |
//! | `convert` (default) | Source platform schema and the conversion engine |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "convert")]
pub mod source;

#[cfg(feature = "convert")]
pub mod convert;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

#[cfg(feature = "convert")]
pub use crate::convert::{ConvertOptions, Converter};
