//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation.
///
/// Costera only ever produces EPSG-coded systems (WGS84 geographic input,
/// UTM metric output), so the record is EPSG-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    /// EPSG code
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// UTM zone CRS: EPSG 326xx (north) or 327xx (south)
    pub fn utm(zone: u32, north: bool) -> Self {
        let base = if north { 32600 } else { 32700 };
        Self::from_epsg(base + zone)
    }

    /// Get the EPSG code
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// True for degree-based geographic systems
    pub fn is_geographic(&self) -> bool {
        self.epsg == 4326
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(4326);
        assert_eq!(crs.epsg(), 4326);
        assert_eq!(crs.identifier(), "EPSG:4326");
    }

    #[test]
    fn test_crs_utm() {
        assert_eq!(CRS::utm(11, true).epsg(), 32611);
        assert_eq!(CRS::utm(21, false).epsg(), 32721);
        assert!(!CRS::utm(11, true).is_geographic());
    }

    #[test]
    fn test_crs_geographic() {
        assert!(CRS::wgs84().is_geographic());
        assert_eq!(CRS::default(), CRS::wgs84());
    }
}
