//! Reference-line crossing detection.
//!
//! Reference lines are pre-existing survey transects whose orientation and
//! naming must be preserved where the new baseline crosses them. Baselines
//! are drawn offshore of the exact survey endpoints, so each reference is
//! synthetically extended by a terminal ray at both ends before the
//! intersection pass.

use costera_core::vector::ReferenceLine;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Euclidean, Length, LineLocatePoint};
use geo_types::{Coord, Line, LineString, Point};

use super::resample::{cumulative_lengths, point_at_distance};

/// Terminal ray length for reference extension, in metres.
pub const EXTENSION_M: f64 = 5000.0;

/// Crossings closer than this along the baseline are duplicates of the
/// same intersection (shared-vertex hits from adjacent segments).
const DUPLICATE_TOL: f64 = 1e-6;

/// Step used to sample a reference's local direction around the foot of a
/// station point, in metres.
const DIRECTION_STEP: f64 = 1.0;

/// One point where the baseline crosses a (possibly extended) reference
/// line.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    /// Distance along the baseline at which the crossing occurs.
    pub distance: f64,
    /// Name of the crossed reference line.
    pub name: String,
    /// The intersection point, in planar coordinates.
    pub point: Coord<f64>,
    /// Index of the reference in the caller's input order.
    pub reference_index: usize,
    /// The reference's original (non-extended) geometry, used to derive
    /// its true local orientation.
    pub geometry: LineString<f64>,
}

/// Extend a reference line by `ray` metres at both ends, following the
/// direction of each terminal segment. A degenerate terminal segment
/// (coincident endpoints) leaves that end unextended.
pub fn extend_reference(line: &LineString<f64>, ray: f64) -> LineString<f64> {
    let coords = &line.0;
    if coords.len() < 2 {
        return line.clone();
    }
    let mut extended = Vec::with_capacity(coords.len() + 2);

    let first = coords[0];
    let second = coords[1];
    if let Some((ux, uy)) = unit(second.x - first.x, second.y - first.y) {
        extended.push(Coord {
            x: first.x - ux * ray,
            y: first.y - uy * ray,
        });
    }
    extended.extend_from_slice(coords);

    let last = coords[coords.len() - 1];
    let prev = coords[coords.len() - 2];
    if let Some((ux, uy)) = unit(last.x - prev.x, last.y - prev.y) {
        extended.push(Coord {
            x: last.x + ux * ray,
            y: last.y + uy * ray,
        });
    }
    LineString::from(extended)
}

/// Find all points where the (unextended) baseline crosses the extended
/// reference lines.
///
/// Unusable references (per [`ReferenceLine::validate`]) are skipped, as
/// are collinear overlaps, which have no single crossing point. Output is
/// sorted by distance along the baseline, deduplicated, with ties broken
/// by reference input order.
pub fn find_crossings(
    baseline: &LineString<f64>,
    references: &[ReferenceLine],
) -> Vec<Crossing> {
    let base_cum = cumulative_lengths(baseline);
    let mut crossings: Vec<Crossing> = Vec::new();

    for (index, reference) in references.iter().enumerate() {
        if reference.validate().is_err() {
            continue;
        }
        let extended = extend_reference(&reference.geometry, EXTENSION_M);

        for (i, bw) in baseline.0.windows(2).enumerate() {
            let base_seg = Line::new(bw[0], bw[1]);
            for rw in extended.0.windows(2) {
                let ref_seg = Line::new(rw[0], rw[1]);
                match line_intersection(base_seg, ref_seg) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => {
                        let dx = intersection.x - bw[0].x;
                        let dy = intersection.y - bw[0].y;
                        crossings.push(Crossing {
                            distance: base_cum[i] + (dx * dx + dy * dy).sqrt(),
                            name: reference.name.clone(),
                            point: intersection,
                            reference_index: index,
                            geometry: reference.geometry.clone(),
                        });
                    }
                    // Collinear overlap has no single crossing point
                    Some(LineIntersection::Collinear { .. }) | None => {}
                }
            }
        }
    }

    crossings.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .expect("distances are finite")
            .then(a.reference_index.cmp(&b.reference_index))
    });
    crossings.dedup_by(|b, a| (b.distance - a.distance).abs() < DUPLICATE_TOL);
    crossings
}

/// The reference line's own local direction at the foot of `at`, as a unit
/// vector: the normalized difference of points sampled 1 m before and
/// after the foot. `None` when the reference is degenerate at that spot.
pub fn local_direction(reference: &LineString<f64>, at: Coord<f64>) -> Option<(f64, f64)> {
    let fraction = reference.line_locate_point(&Point::from(at))?;
    let total = reference.length::<Euclidean>();
    let foot = fraction * total;

    let before = point_at_distance(reference, (foot - DIRECTION_STEP).max(0.0));
    let after = point_at_distance(reference, (foot + DIRECTION_STEP).min(total));
    unit(after.x - before.x, after.y - before.y)
}

fn unit(dx: f64, dy: f64) -> Option<(f64, f64)> {
    let mag = (dx * dx + dy * dy).sqrt();
    if mag == 0.0 {
        None
    } else {
        Some((dx / mag, dy / mag))
    }
}
