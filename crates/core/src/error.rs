//! Error types for Costera

use thiserror::Error;

/// Main error type for Costera operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input geometry: expected {expected}, got {got}")]
    InvalidGeometry {
        expected: &'static str,
        got: String,
    },

    #[error("Baseline too short: length {length_m:.2} m with spacing {spacing_m:.2} m (length must exceed spacing)")]
    BaselineTooShort { length_m: f64, spacing_m: f64 },

    #[error("Empty or degenerate geometry: {0}")]
    EmptyGeometry(&'static str),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Costera operations
pub type Result<T> = std::result::Result<T, Error>;
