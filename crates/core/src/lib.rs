//! # Costera Core
//!
//! Core types for the Costera coastal transect generator.
//!
//! This crate provides:
//! - `CRS`: Coordinate Reference System handling
//! - `UtmZone`: local metric projection (WGS84 ↔ UTM)
//! - Vector feature records: `ReferenceLine`, `Transect`, `StationPoint`
//! - The `Algorithm` trait for consistent API

pub mod crs;
pub mod error;
pub mod proj;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use proj::UtmZone;
pub use vector::{ReferenceIssue, ReferenceLine, StationPoint, Transect, TransectSet};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::proj::UtmZone;
    pub use crate::vector::{ReferenceLine, StationPoint, Transect, TransectSet};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in Costera.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
