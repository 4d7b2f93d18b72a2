//! Vector feature records for transect generation.
//!
//! Fixed-field records rather than attribute bags: every feature this
//! system produces or consumes has a known, small schema, so optional
//! duck-typed property lookups buy nothing but failure modes.

use geo_types::{Line, LineString, Point};

use crate::crs::CRS;
use crate::proj::UtmZone;

/// Why a reference line was rejected for alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceIssue {
    /// Fewer than 2 coordinates; no direction can be derived.
    TooFewCoordinates,
}

impl std::fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceIssue::TooFewCoordinates => write!(f, "fewer than 2 coordinates"),
        }
    }
}

/// A pre-existing named survey line used to anchor transect orientation
/// and labeling where the baseline crosses it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// Survey line name, carried into transect labels.
    pub name: String,
    /// Line geometry (geographic on input, planar after projection).
    pub geometry: LineString<f64>,
}

impl ReferenceLine {
    pub fn new(name: impl Into<String>, geometry: LineString<f64>) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }

    /// Build a reference line with the `REF_<index>` fallback name used
    /// when the source layer carries no name attribute.
    pub fn unnamed(index: usize, geometry: LineString<f64>) -> Self {
        Self {
            name: format!("REF_{index}"),
            geometry,
        }
    }

    /// Classify this reference as usable or not before alignment runs.
    /// Unusable references are skipped, never fatal.
    pub fn validate(&self) -> Result<(), ReferenceIssue> {
        if self.geometry.0.len() < 2 {
            return Err(ReferenceIssue::TooFewCoordinates);
        }
        Ok(())
    }
}

/// A fixed-length cross-section segment centered on a baseline sample
/// point.
#[derive(Debug, Clone, PartialEq)]
pub struct Transect {
    /// Running index in emission order.
    pub id: usize,
    /// Distance along the baseline of the originating sample, in metres.
    pub distance_along: f64,
    /// Label: reference name, `<ref>_<NNN>`, or `start_<NNN>`.
    pub label: String,
    /// Two-point segment in planar coordinates.
    pub geometry: Line<f64>,
}

/// The baseline sample point a transect was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPoint {
    pub id: usize,
    pub distance_along: f64,
    pub label: String,
    /// Point in planar coordinates.
    pub geometry: Point<f64>,
}

/// The result of one pipeline invocation: transects and their station
/// points, index-aligned, with the planar CRS they are expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct TransectSet {
    pub transects: Vec<Transect>,
    pub points: Vec<StationPoint>,
    pub crs: CRS,
}

impl TransectSet {
    pub fn len(&self) -> usize {
        self.transects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transects.is_empty()
    }

    /// Reproject all geometry back to WGS84 through the zone the set was
    /// computed in. Attributes are untouched; `distance_along` stays in
    /// metres.
    pub fn to_geographic(&self, zone: &UtmZone) -> TransectSet {
        let transects = self
            .transects
            .iter()
            .map(|t| {
                let (sx, sy) = zone.inverse(t.geometry.start.x, t.geometry.start.y);
                let (ex, ey) = zone.inverse(t.geometry.end.x, t.geometry.end.y);
                Transect {
                    id: t.id,
                    distance_along: t.distance_along,
                    label: t.label.clone(),
                    geometry: Line::new((sx, sy), (ex, ey)),
                }
            })
            .collect();
        let points = self
            .points
            .iter()
            .map(|p| {
                let (x, y) = zone.inverse(p.geometry.x(), p.geometry.y());
                StationPoint {
                    id: p.id,
                    distance_along: p.distance_along,
                    label: p.label.clone(),
                    geometry: Point::new(x, y),
                }
            })
            .collect();
        TransectSet {
            transects,
            points,
            crs: CRS::wgs84(),
        }
    }
}
