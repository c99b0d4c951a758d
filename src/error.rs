//! Error types for engine construction.
//!
//! Setup-time mistakes (inverted bounds, unusable encoding widths,
//! inconsistent configuration) are surfaced as [`GaError`] values from
//! the constructors that detect them. Runtime anomalies that the engine
//! can recover from, such as a forced gene that does not survive its
//! round trip through the encoding, are logged and counted instead of
//! returned as errors.

use thiserror::Error;

/// Errors reported while assembling a parameter set, population or engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaError {
    /// The lower bound of a parameter is not strictly below its upper bound.
    #[error("invalid bounds: lower bound must be strictly less than upper bound, got lower={lower}, upper={upper}")]
    InvalidBounds {
        /// Offending lower bound.
        lower: f64,
        /// Offending upper bound.
        upper: f64,
    },

    /// The encoding width cannot be represented in the 64-bit gene codes.
    #[error("invalid encoding width: expected 1..=63 bits per gene, got {width}")]
    InvalidWidth {
        /// Offending width in bits.
        width: u32,
    },

    /// A parameter set was built from an empty list of parameters.
    #[error("parameter set must contain at least one parameter")]
    EmptyParameterSet,

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// ==== Tests ====
