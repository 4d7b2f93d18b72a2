//! Transect generation pipeline.
//!
//! From a user-drawn geographic baseline to labeled, evenly spaced,
//! perpendicular survey transects in a local metric CRS:
//! 1. project baseline and reference lines into the centroid's UTM zone;
//! 2. resample the baseline at `spacing_m`, snapping stations onto
//!    reference-line crossings;
//! 3. build a smoothed perpendicular orientation field, locked and
//!    blended against crossed reference orientations;
//! 4. emit fixed-length segments with survey labels.
//!
//! The whole pipeline is a pure, deterministic function of its inputs:
//! no I/O, no shared state, single-threaded.

pub mod align;
pub mod build;
pub mod normals;
pub mod resample;

pub use align::{find_crossings, Crossing, EXTENSION_M};
pub use resample::{merge_distances, point_at_distance, regular_distances};

use costera_core::error::{Error, Result};
use costera_core::proj::UtmZone;
use costera_core::vector::{ReferenceLine, TransectSet};
use costera_core::Algorithm;
use geo::{Euclidean, Length};
use geo_types::{Coord, Geometry, LineString};
use serde::{Deserialize, Serialize};

/// Parameters controlling transect generation.
///
/// `snap_fraction` and `influence_radius` are empirical survey constants;
/// their defaults come from field use, not a derivation, and are exposed
/// for tuning rather than hard-coded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransectParams {
    /// Station spacing along the baseline, metres.
    pub spacing_m: f64,
    /// Total transect length, metres (half on each side of the baseline).
    pub length_m: f64,
    /// Width of the centered moving average over the normal field.
    pub smoothing_window: usize,
    /// Regular stations within `snap_fraction * spacing_m` of a crossing
    /// are replaced by the crossing station.
    pub snap_fraction: f64,
    /// How many stations on each side of a crossing inherit a share of
    /// its locked orientation (by index, not distance).
    pub influence_radius: usize,
}

impl Default for TransectParams {
    fn default() -> Self {
        Self {
            spacing_m: 1.0,
            length_m: 20.0,
            smoothing_window: 9,
            snap_fraction: 0.3,
            influence_radius: 10,
        }
    }
}

impl TransectParams {
    fn validate(&self) -> Result<()> {
        if !(self.spacing_m > 0.0) {
            return Err(Error::InvalidParameter {
                name: "spacing_m",
                value: self.spacing_m.to_string(),
                reason: "must be positive".into(),
            });
        }
        if !(self.length_m > 0.0) {
            return Err(Error::InvalidParameter {
                name: "length_m",
                value: self.length_m.to_string(),
                reason: "must be positive".into(),
            });
        }
        if self.smoothing_window == 0 {
            return Err(Error::InvalidParameter {
                name: "smoothing_window",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Extract the baseline from a drawn feature, rejecting anything that is
/// not a linestring (points, polygons, empty collections).
pub fn baseline_from_geometry(geometry: &Geometry<f64>) -> Result<LineString<f64>> {
    match geometry {
        Geometry::LineString(ls) if ls.0.len() >= 2 => Ok(ls.clone()),
        Geometry::LineString(ls) => Err(Error::InvalidGeometry {
            expected: "LineString with at least 2 coordinates",
            got: format!("LineString with {} coordinates", ls.0.len()),
        }),
        other => Err(Error::InvalidGeometry {
            expected: "LineString",
            got: geometry_type_name(other).to_string(),
        }),
    }
}

fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Generate transects along a geographic (WGS84 lon/lat) baseline.
///
/// Output geometry is planar, in the UTM zone of the baseline centroid;
/// the zone is recoverable from the returned CRS (see [`UtmZone::from_crs`])
/// for reprojection.
pub fn generate_transects(
    baseline: &LineString<f64>,
    references: &[ReferenceLine],
    params: &TransectParams,
) -> Result<TransectSet> {
    params.validate()?;
    if baseline.0.len() < 2 {
        return Err(Error::InvalidGeometry {
            expected: "LineString with at least 2 coordinates",
            got: format!("LineString with {} coordinates", baseline.0.len()),
        });
    }

    let zone = UtmZone::for_linestring(baseline)?;
    let planar = zone.forward_linestring(baseline);
    let planar_refs: Vec<ReferenceLine> = references
        .iter()
        .map(|r| ReferenceLine::new(r.name.clone(), zone.forward_linestring(&r.geometry)))
        .collect();

    let length = planar.length::<Euclidean>();
    let regular = resample::regular_distances(length, params.spacing_m)?;
    let crossings = align::find_crossings(&planar, &planar_refs);
    let distances = resample::merge_distances(
        regular,
        &crossings,
        params.snap_fraction * params.spacing_m,
    );

    let points: Vec<Coord<f64>> = distances
        .iter()
        .map(|&d| resample::point_at_distance(&planar, d))
        .collect();
    let orientations = normals::build_orientations(
        &points,
        &distances,
        &crossings,
        params.smoothing_window,
        params.influence_radius,
    );

    Ok(build::build_transects(
        &points,
        &distances,
        &orientations,
        &crossings,
        params.length_m,
        zone.crs(),
    ))
}

/// Input for [`GenerateTransects`].
#[derive(Debug, Clone)]
pub struct TransectInput {
    /// Drawn baseline, geographic coordinates.
    pub baseline: LineString<f64>,
    /// Pre-existing survey lines, geographic coordinates. May be empty.
    pub references: Vec<ReferenceLine>,
}

/// [`Algorithm`] wrapper around [`generate_transects`].
pub struct GenerateTransects;

impl Algorithm for GenerateTransects {
    type Input = TransectInput;
    type Output = TransectSet;
    type Params = TransectParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "generate_transects"
    }

    fn description(&self) -> &'static str {
        "Generate labeled perpendicular survey transects along a baseline"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        generate_transects(&input.baseline, &input.references, &params)
    }
}
