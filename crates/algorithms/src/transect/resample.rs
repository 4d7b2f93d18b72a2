//! Baseline resampling: regular station distances and exact interpolation.

use costera_core::error::{Error, Result};
use geo_types::{Coord, LineString};

use super::align::Crossing;

/// Regular sample distances `0, spacing, 2*spacing, …` strictly less than
/// `length` (half-open; the final partial segment is not padded with an
/// extra endpoint).
///
/// A baseline no longer than the requested spacing cannot be sampled and
/// is reported as an input error with both measurements attached.
pub fn regular_distances(length: f64, spacing: f64) -> Result<Vec<f64>> {
    if !(spacing > 0.0) {
        return Err(Error::InvalidParameter {
            name: "spacing_m",
            value: spacing.to_string(),
            reason: "must be positive".into(),
        });
    }
    if length <= spacing {
        return Err(Error::BaselineTooShort {
            length_m: length,
            spacing_m: spacing,
        });
    }

    let mut distances = Vec::with_capacity((length / spacing) as usize + 1);
    let mut i = 0u64;
    loop {
        let d = i as f64 * spacing;
        if d >= length {
            break;
        }
        distances.push(d);
        i += 1;
    }
    Ok(distances)
}

/// Merge crossing distances into the regular distance set.
///
/// Regular distances within `snap_tolerance` of any crossing are dropped
/// in favour of the crossing distance, so each reference crossing gets its
/// own sample without a near-duplicate neighbour.
pub fn merge_distances(
    regular: Vec<f64>,
    crossings: &[Crossing],
    snap_tolerance: f64,
) -> Vec<f64> {
    let mut merged: Vec<f64> = regular
        .into_iter()
        .filter(|&d| {
            crossings
                .iter()
                .all(|c| (d - c.distance).abs() >= snap_tolerance)
        })
        .collect();
    merged.extend(crossings.iter().map(|c| c.distance));
    merged.sort_by(|a, b| a.partial_cmp(b).expect("distances are finite"));
    merged
}

/// Cumulative vertex distances along a linestring, starting at 0.
pub(crate) fn cumulative_lengths(line: &LineString<f64>) -> Vec<f64> {
    let mut cum = Vec::with_capacity(line.0.len());
    let mut total = 0.0;
    cum.push(0.0);
    for w in line.0.windows(2) {
        let dx = w[1].x - w[0].x;
        let dy = w[1].y - w[0].y;
        total += (dx * dx + dy * dy).sqrt();
        cum.push(total);
    }
    cum
}

/// The point at distance `d` along the line, by exact segment walk.
/// Distances beyond the line clamp to the endpoints.
pub fn point_at_distance(line: &LineString<f64>, d: f64) -> Coord<f64> {
    let coords = &line.0;
    if d <= 0.0 {
        return coords[0];
    }
    let cum = cumulative_lengths(line);
    let total = *cum.last().expect("non-empty linestring");
    if d >= total {
        return coords[coords.len() - 1];
    }

    // Find the segment containing d and interpolate within it.
    for i in 1..cum.len() {
        if d <= cum[i] {
            let seg_len = cum[i] - cum[i - 1];
            if seg_len == 0.0 {
                return coords[i - 1];
            }
            let t = (d - cum[i - 1]) / seg_len;
            let a = coords[i - 1];
            let b = coords[i];
            return Coord {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
            };
        }
    }
    coords[coords.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crossing_at(distance: f64) -> Crossing {
        Crossing {
            distance,
            name: "R1".into(),
            point: Coord { x: 0.0, y: 0.0 },
            reference_index: 0,
            geometry: LineString::from(vec![(0.0, -1.0), (0.0, 1.0)]),
        }
    }

    #[test]
    fn test_regular_distances_half_open() {
        let d = regular_distances(100.0, 10.0).unwrap();
        assert_eq!(d.len(), 10);
        assert_eq!(d[0], 0.0);
        assert_eq!(d[9], 90.0);
        // No endpoint padding at 100.0
        assert!(d.iter().all(|&x| x < 100.0));
    }

    #[test]
    fn test_regular_distances_partial_tail() {
        // 95 / 10 → 0..=90, the 5 m tail gets no station
        let d = regular_distances(95.0, 10.0).unwrap();
        assert_eq!(d.len(), 10);
        assert_eq!(*d.last().unwrap(), 90.0);
    }

    #[test]
    fn test_too_short_rejected() {
        let err = regular_distances(50.0, 100.0).unwrap_err();
        match err {
            Error::BaselineTooShort {
                length_m,
                spacing_m,
            } => {
                assert_eq!(length_m, 50.0);
                assert_eq!(spacing_m, 100.0);
            }
            other => panic!("expected BaselineTooShort, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_length_and_spacing_rejected() {
        assert!(regular_distances(10.0, 10.0).is_err());
    }

    #[test]
    fn test_nonpositive_spacing_rejected() {
        assert!(regular_distances(100.0, 0.0).is_err());
        assert!(regular_distances(100.0, -1.0).is_err());
    }

    #[test]
    fn test_merge_drops_near_regular() {
        let regular = regular_distances(100.0, 10.0).unwrap();
        let crossings = vec![crossing_at(51.0)];
        // snap tolerance 3.0 → the 50.0 station is dropped, 51.0 inserted
        let merged = merge_distances(regular, &crossings, 3.0);
        assert!(!merged.contains(&50.0));
        assert!(merged.contains(&51.0));
        assert_eq!(merged.len(), 10);
        // Sorted ascending
        for w in merged.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn test_merge_keeps_distant_regular() {
        let regular = regular_distances(100.0, 10.0).unwrap();
        let crossings = vec![crossing_at(55.0)];
        let merged = merge_distances(regular, &crossings, 3.0);
        assert!(merged.contains(&50.0));
        assert!(merged.contains(&60.0));
        assert!(merged.contains(&55.0));
        assert_eq!(merged.len(), 11);
    }

    #[test]
    fn test_point_at_distance_straight() {
        let line = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
        let p = point_at_distance(&line, 4.0);
        assert!((p.x - 4.0).abs() < 1e-12);
        assert!((p.y).abs() < 1e-12);
    }

    #[test]
    fn test_point_at_distance_multi_segment() {
        let line = LineString::from(vec![(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)]);
        let p = point_at_distance(&line, 5.0);
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_at_distance_clamps() {
        let line = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
        let before = point_at_distance(&line, -1.0);
        assert_eq!(before, Coord { x: 0.0, y: 0.0 });
        let beyond = point_at_distance(&line, 99.0);
        assert_eq!(beyond, Coord { x: 10.0, y: 0.0 });
    }

    #[test]
    fn test_point_at_distance_skips_degenerate_segment() {
        let line = LineString::from(vec![(0.0, 0.0), (5.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let p = point_at_distance(&line, 7.5);
        assert!((p.x - 7.5).abs() < 1e-12);
    }
}
