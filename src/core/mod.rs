//! Canonical document model, regime catalogs and shared tables.
//!
//! This module holds the destination side of the conversion: the
//! normalized invoice document and everything needed to describe it.

mod builder;
pub mod countries;
pub mod currencies;
mod error;
mod regime;
mod types;
mod validation;

pub use builder::*;
pub use currencies::Currency;
pub use error::*;
pub use regime::*;
pub use types::*;
pub use validation::*;
