//! # Costera Algorithms
//!
//! Transect generation for coastal/shoreline surveying.
//!
//! The single pipeline lives in [`transect`]: project a drawn baseline
//! into a local UTM zone, resample it, align stations with pre-existing
//! reference survey lines, build a smoothed perpendicular orientation
//! field, and emit fixed-length labeled transects.

pub mod transect;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::transect::{
        baseline_from_geometry, generate_transects, Crossing, GenerateTransects, TransectInput,
        TransectParams,
    };
    pub use costera_core::prelude::*;
}
