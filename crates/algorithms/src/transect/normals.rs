//! Per-station orientation field.
//!
//! Raw perpendiculars follow the local baseline tangent, which makes
//! neighbouring transects fan out and cross each other on curved
//! baselines. Two corrections are applied: a moving-average smoothing of
//! the normal field, and locking/blending against the crossed reference
//! lines so the new transects stay consistent with the existing survey.

use geo_types::Coord;

use super::align::{local_direction, Crossing};

/// A station whose distance is within this of a crossing distance is the
/// crossing's own sample.
pub(crate) const CROSSING_TOL: f64 = 0.01;

/// Raw normals: the tangent at each station is the average of the unit
/// vector in from the previous station and the unit vector out to the next
/// (one-sided at the endpoints), rotated 90° via `(dx, dy) → (-dy, dx)`.
///
/// Stations coincident with a neighbour have no defined direction and get
/// the zero vector; they are dropped at the output stage, not here.
pub fn raw_normals(points: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let n = points.len();
    let mut normals = Vec::with_capacity(n);

    for i in 0..n {
        let v_in = if i > 0 {
            unit(points[i].x - points[i - 1].x, points[i].y - points[i - 1].y)
        } else {
            None
        };
        let v_out = if i + 1 < n {
            unit(points[i + 1].x - points[i].x, points[i + 1].y - points[i].y)
        } else {
            None
        };

        let (tx, ty) = match (v_in, v_out) {
            (Some((ax, ay)), Some((bx, by))) => ((ax + bx) / 2.0, (ay + by) / 2.0),
            (Some(t), None) | (None, Some(t)) => t,
            (None, None) => (0.0, 0.0),
        };
        normals.push(Coord { x: -ty, y: tx });
    }
    normals
}

/// Centered moving average of width `window` over the x and y component
/// series independently, with edge padding (boundary values repeated) so
/// endpoints are not biased toward zero and the output length equals the
/// input length.
pub fn smooth(normals: &[Coord<f64>], window: usize) -> Vec<Coord<f64>> {
    let n = normals.len() as i64;
    let half = (window / 2) as i64;
    let w = window as f64;

    (0..n)
        .map(|i| {
            let mut sx = 0.0;
            let mut sy = 0.0;
            for k in (i - half)..=(i + half) {
                let idx = k.clamp(0, n - 1) as usize;
                sx += normals[idx].x;
                sy += normals[idx].y;
            }
            Coord {
                x: sx / w,
                y: sy / w,
            }
        })
        .collect()
}

/// Build the final per-station orientation field.
///
/// Smoothing is skipped when there are too few stations to average
/// meaningfully (`points.len() <= smoothing_window`). With no crossings
/// the locking and blending passes are no-ops.
pub fn build_orientations(
    points: &[Coord<f64>],
    distances: &[f64],
    crossings: &[Crossing],
    smoothing_window: usize,
    influence_radius: usize,
) -> Vec<Coord<f64>> {
    let raw = raw_normals(points);
    let smoothed = if points.len() > smoothing_window {
        smooth(&raw, smoothing_window)
    } else {
        raw
    };
    // Averaging shrinks magnitude; restore unit length (zero stays zero)
    let smoothed: Vec<Coord<f64>> = smoothed.iter().map(|&v| normalize(v)).collect();

    let locked = lock_reference_orientations(points, distances, crossings, &smoothed);
    blend_influence(&smoothed, &locked, influence_radius)
}

/// Locked orientations: for every station coinciding with a crossing, the
/// reference line's own local direction, sign-corrected against the
/// smoothed baseline normal so an arbitrary digitization direction cannot
/// flip a transect 180° relative to its neighbours.
///
/// Returned sorted by station index; when two crossings land on the same
/// station the first (lowest reference index at equal distance) wins.
fn lock_reference_orientations(
    points: &[Coord<f64>],
    distances: &[f64],
    crossings: &[Crossing],
    smoothed: &[Coord<f64>],
) -> Vec<(usize, Coord<f64>)> {
    let mut locked: Vec<(usize, Coord<f64>)> = Vec::new();

    for crossing in crossings {
        let Some(i) = distances
            .iter()
            .position(|&d| (d - crossing.distance).abs() < CROSSING_TOL)
        else {
            continue;
        };
        if locked.iter().any(|&(j, _)| j == i) {
            continue;
        }
        let Some((dx, dy)) = local_direction(&crossing.geometry, points[i]) else {
            continue;
        };

        let dot = dx * smoothed[i].x + dy * smoothed[i].y;
        let dir = if dot < 0.0 {
            Coord { x: -dx, y: -dy }
        } else {
            Coord { x: dx, y: dy }
        };
        locked.push((i, dir));
    }

    locked.sort_by_key(|&(i, _)| i);
    locked
}

/// Blend locked orientations into their neighbours.
///
/// Each station takes the index-nearest locked orientation within
/// `radius` stations (ties: first found), weighted
/// `1 - indexDistance / (radius + 1)` so the locked direction dominates
/// close to the crossing and fades toward the station's own smoothed
/// normal. Stations outside every influence radius are unchanged.
fn blend_influence(
    smoothed: &[Coord<f64>],
    locked: &[(usize, Coord<f64>)],
    radius: usize,
) -> Vec<Coord<f64>> {
    if locked.is_empty() {
        return smoothed.to_vec();
    }

    smoothed
        .iter()
        .enumerate()
        .map(|(i, &own)| {
            let mut nearest: Option<(usize, Coord<f64>)> = None;
            for &(j, dir) in locked {
                let idx_dist = i.abs_diff(j);
                if idx_dist <= radius
                    && nearest.map_or(true, |(best, _)| idx_dist < best)
                {
                    nearest = Some((idx_dist, dir));
                }
            }

            match nearest {
                Some((0, dir)) => dir,
                Some((idx_dist, dir)) => {
                    let w = 1.0 - idx_dist as f64 / (radius as f64 + 1.0);
                    let blended = Coord {
                        x: dir.x * w + own.x * (1.0 - w),
                        y: dir.y * w + own.y * (1.0 - w),
                    };
                    let blended = normalize(blended);
                    // Opposed vectors can cancel; keep the station's own
                    // normal rather than emit nothing
                    if blended.x == 0.0 && blended.y == 0.0 {
                        own
                    } else {
                        blended
                    }
                }
                None => own,
            }
        })
        .collect()
}

/// Unit-length copy of `v`; the zero vector stays zero.
pub fn normalize(v: Coord<f64>) -> Coord<f64> {
    let mag = (v.x * v.x + v.y * v.y).sqrt();
    if mag == 0.0 {
        v
    } else {
        Coord {
            x: v.x / mag,
            y: v.y / mag,
        }
    }
}

fn unit(dx: f64, dy: f64) -> Option<(f64, f64)> {
    let mag = (dx * dx + dy * dy).sqrt();
    if mag == 0.0 {
        None
    } else {
        Some((dx / mag, dy / mag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn points_on_x(n: usize, step: f64) -> Vec<Coord<f64>> {
        (0..n)
            .map(|i| Coord {
                x: i as f64 * step,
                y: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_raw_normals_straight_line() {
        let pts = points_on_x(5, 10.0);
        let normals = raw_normals(&pts);
        assert_eq!(normals.len(), 5);
        // Tangent (1,0) rotates to (0,1)
        for nv in &normals {
            assert!(nv.x.abs() < 1e-12);
            assert!((nv.y - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_raw_normals_perpendicular_to_tangent() {
        // L-shaped station run
        let pts = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 10.0, y: 10.0 },
        ];
        let normals = raw_normals(&pts);

        // Interior tangent is the average of in/out unit vectors
        let tangent = (0.5_f64, 0.5_f64);
        let dot = normals[1].x * tangent.0 + normals[1].y * tangent.1;
        assert!(dot.abs() < 1e-12, "normal must be perpendicular, dot {dot}");
    }

    #[test]
    fn test_raw_normals_coincident_points_zero() {
        let pts = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        let normals = raw_normals(&pts);
        assert_eq!(normals[0], Coord { x: 0.0, y: 0.0 });
        assert_eq!(normals[1], Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_smooth_preserves_length_and_constants() {
        let normals: Vec<Coord<f64>> = (0..20).map(|_| Coord { x: 0.0, y: 1.0 }).collect();
        let out = smooth(&normals, 9);
        assert_eq!(out.len(), 20);
        for v in &out {
            assert!((v.y - 1.0).abs() < 1e-12, "constant series is unchanged");
        }
    }

    #[test]
    fn test_smooth_edge_padding_no_zero_bias() {
        // A step series: padding repeats boundary values so the first
        // output stays near the first input instead of decaying to 0
        let mut normals = vec![Coord { x: 0.0, y: 1.0 }; 20];
        for v in normals.iter_mut().skip(10) {
            v.y = -1.0;
        }
        let out = smooth(&normals, 5);
        assert!((out[0].y - 1.0).abs() < 1e-12);
        assert!((out[19].y - -1.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_orientations_unit_magnitude() {
        // Gentle arc
        let pts: Vec<Coord<f64>> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.05;
                Coord {
                    x: 100.0 * t.cos(),
                    y: 100.0 * t.sin(),
                }
            })
            .collect();
        let distances: Vec<f64> = (0..30).map(|i| i as f64 * 5.0).collect();

        let out = build_orientations(&pts, &distances, &[], 9, 10);
        assert_eq!(out.len(), 30);
        for v in &out {
            let mag = (v.x * v.x + v.y * v.y).sqrt();
            assert!((mag - 1.0).abs() < 1e-9, "non-unit orientation {mag}");
        }
    }

    #[test]
    fn test_build_orientations_skips_smoothing_when_few_samples() {
        let pts = points_on_x(4, 1.0);
        let distances = vec![0.0, 1.0, 2.0, 3.0];
        // window 9 > 4 samples; must not fail and keeps raw directions
        let out = build_orientations(&pts, &distances, &[], 9, 10);
        assert_eq!(out.len(), 4);
        for v in &out {
            assert!((v.y - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_locked_orientation_exact_at_crossing() {
        let pts = points_on_x(21, 10.0);
        let distances: Vec<f64> = (0..21).map(|i| i as f64 * 10.0).collect();

        // Reference at x=100 tilted 45° to the baseline normal
        let crossing = Crossing {
            distance: 100.0,
            name: "R1".into(),
            point: Coord { x: 100.0, y: 0.0 },
            reference_index: 0,
            geometry: LineString::from(vec![(90.0, -10.0), (110.0, 10.0)]),
        };

        let out = build_orientations(&pts, &distances, &[crossing], 9, 10);
        let v = out[10];
        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert!((v.x - inv_sqrt2).abs() < 1e-9);
        assert!((v.y - inv_sqrt2).abs() < 1e-9);
    }

    #[test]
    fn test_locked_orientation_sign_corrected() {
        let pts = points_on_x(21, 10.0);
        let distances: Vec<f64> = (0..21).map(|i| i as f64 * 10.0).collect();

        // Reference digitized top-to-bottom: raw direction (0,-1) opposes
        // the smoothed baseline normal (0,1) and must be flipped
        let crossing = Crossing {
            distance: 100.0,
            name: "R1".into(),
            point: Coord { x: 100.0, y: 0.0 },
            reference_index: 0,
            geometry: LineString::from(vec![(100.0, 10.0), (100.0, -10.0)]),
        };

        let out = build_orientations(&pts, &distances, &[crossing], 9, 10);
        assert!((out[10].y - 1.0).abs() < 1e-9, "flipped to match neighbours");
    }

    #[test]
    fn test_influence_fades_with_index_distance() {
        let pts = points_on_x(41, 10.0);
        let distances: Vec<f64> = (0..41).map(|i| i as f64 * 10.0).collect();

        // Tilted reference at station 20
        let crossing = Crossing {
            distance: 200.0,
            name: "R1".into(),
            point: Coord { x: 200.0, y: 0.0 },
            reference_index: 0,
            geometry: LineString::from(vec![(190.0, -10.0), (210.0, 10.0)]),
        };

        let out = build_orientations(&pts, &distances, &[crossing], 9, 10);

        // Deviation from the plain baseline normal (0,1) shrinks with
        // index distance from the crossing
        let dev = |v: Coord<f64>| (v.x).abs();
        assert!(dev(out[20]) > dev(out[23]));
        assert!(dev(out[23]) > dev(out[28]));
        // Outside the radius, untouched
        assert!(dev(out[35]) < 1e-12);
        assert!((out[35].y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_crossings_is_noop() {
        let pts = points_on_x(15, 10.0);
        let distances: Vec<f64> = (0..15).map(|i| i as f64 * 10.0).collect();
        let out = build_orientations(&pts, &distances, &[], 9, 10);
        for v in &out {
            assert!((v.y - 1.0).abs() < 1e-12);
        }
    }
}
