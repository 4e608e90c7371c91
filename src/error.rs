//! Error types for catalogue and requirement handling
//!
//! The search itself never fails; these cover the data coming into it.

use thiserror::Error;

/// A catalogue record that breaks a data invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogueError {
    /// A numeric attribute is negative or not a number.
    #[error("{record}: field `{field}` must be a non-negative number, got {value}")]
    InvalidNumber {
        record: String,
        field: &'static str,
        value: f64,
    },

    /// Nominal voltage must sit below the charge cut-off voltage.
    #[error("{record}: nominal voltage {nominal} V is not below charge voltage {charge} V")]
    VoltageOrder {
        record: String,
        nominal: f64,
        charge: f64,
    },

    #[error("{record}: model identifier is empty")]
    MissingModel { record: String },
}

/// A requirement value supplied by the caller that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementsError {
    #[error("requirement `{field}`: `{value}` is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}
