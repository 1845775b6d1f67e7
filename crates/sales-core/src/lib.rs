//! Shared domain layer for the sales dashboard.
//!
//! Holds the record and dataset models, the error taxonomy, currency parsing
//! and rounding, display formatting, and CLI settings used by every other
//! crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod price;
pub mod settings;

pub use rust_decimal::Decimal;
