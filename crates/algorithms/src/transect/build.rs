//! Transect segment emission and labeling.

use costera_core::crs::CRS;
use costera_core::vector::{StationPoint, Transect, TransectSet};
use geo_types::{Coord, Line, Point};

use super::align::Crossing;
use super::normals::{normalize, CROSSING_TOL};

/// Build the output collections from stations and their orientations.
///
/// Each station with a non-zero orientation becomes a segment of total
/// length `length_m` centered on the station; zero-orientation stations
/// are silently dropped, so the output may be shorter than the input.
/// Labels count through every station, dropped or not, so a degenerate
/// station cannot shift the numbering of its successors.
pub fn build_transects(
    points: &[Coord<f64>],
    distances: &[f64],
    orientations: &[Coord<f64>],
    crossings: &[Crossing],
    length_m: f64,
    crs: CRS,
) -> TransectSet {
    debug_assert_eq!(points.len(), distances.len());
    debug_assert_eq!(points.len(), orientations.len());

    let half = length_m / 2.0;
    let mut transects = Vec::with_capacity(points.len());
    let mut stations = Vec::with_capacity(points.len());

    for (i, (&p, &o)) in points.iter().zip(orientations.iter()).enumerate() {
        if o.x == 0.0 && o.y == 0.0 {
            continue;
        }
        let n = normalize(o);
        let d = distances[i];
        let label = label_for(i, d, distances, crossings);

        let id = transects.len();
        transects.push(Transect {
            id,
            distance_along: d,
            label: label.clone(),
            geometry: Line::new(
                Coord {
                    x: p.x + n.x * half,
                    y: p.y + n.y * half,
                },
                Coord {
                    x: p.x - n.x * half,
                    y: p.y - n.y * half,
                },
            ),
        });
        stations.push(StationPoint {
            id,
            distance_along: d,
            label,
            geometry: Point::new(p.x, p.y),
        });
    }

    TransectSet {
        transects,
        points: stations,
        crs,
    }
}

/// Label for the station at index `i`, distance `d`:
/// - a crossing's own station takes the reference name verbatim;
/// - otherwise `<precedingRefName>_<NNN>` counting stations after that
///   crossing (1-based, zero-padded);
/// - with no preceding crossing, `start_<NNN>` by position from the
///   baseline start.
fn label_for(i: usize, d: f64, distances: &[f64], crossings: &[Crossing]) -> String {
    if let Some(c) = crossings
        .iter()
        .find(|c| (c.distance - d).abs() <= CROSSING_TOL)
    {
        return c.name.clone();
    }

    let preceding = crossings
        .iter()
        .filter(|c| c.distance < d)
        .max_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .expect("distances are finite")
        });

    match preceding {
        Some(c) => {
            let between = distances
                .iter()
                .filter(|&&dk| {
                    dk > c.distance
                        && dk < d
                        && crossings
                            .iter()
                            .all(|cc| (cc.distance - dk).abs() > CROSSING_TOL)
                })
                .count();
            format!("{}_{:03}", c.name, between + 1)
        }
        None => format!("start_{:03}", i + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn crossing(name: &str, distance: f64) -> Crossing {
        Crossing {
            distance,
            name: name.into(),
            point: Coord { x: distance, y: 0.0 },
            reference_index: 0,
            geometry: LineString::from(vec![(distance, -10.0), (distance, 10.0)]),
        }
    }

    fn straight_stations(distances: &[f64]) -> (Vec<Coord<f64>>, Vec<Coord<f64>>) {
        let points = distances.iter().map(|&d| Coord { x: d, y: 0.0 }).collect();
        let orientations = distances.iter().map(|_| Coord { x: 0.0, y: 1.0 }).collect();
        (points, orientations)
    }

    #[test]
    fn test_segment_length_and_centering() {
        let distances = vec![0.0, 10.0];
        let (points, orientations) = straight_stations(&distances);

        let set = build_transects(&points, &distances, &orientations, &[], 20.0, CRS::utm(11, true));
        assert_eq!(set.len(), 2);

        let t = &set.transects[0];
        let dx = t.geometry.end.x - t.geometry.start.x;
        let dy = t.geometry.end.y - t.geometry.start.y;
        let len = (dx * dx + dy * dy).sqrt();
        assert!((len - 20.0).abs() < 1e-9);

        // Centered on the station
        let mx = (t.geometry.start.x + t.geometry.end.x) / 2.0;
        let my = (t.geometry.start.y + t.geometry.end.y) / 2.0;
        assert!((mx - 0.0).abs() < 1e-9);
        assert!((my - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_orientation_dropped() {
        let distances = vec![0.0, 10.0, 20.0];
        let (points, mut orientations) = straight_stations(&distances);
        orientations[1] = Coord { x: 0.0, y: 0.0 };

        let set = build_transects(&points, &distances, &orientations, &[], 20.0, CRS::utm(11, true));
        assert_eq!(set.transects.len(), 2);
        assert_eq!(set.points.len(), 2);
        // IDs stay a dense running sequence
        assert_eq!(set.transects[0].id, 0);
        assert_eq!(set.transects[1].id, 1);
        assert_eq!(set.transects[1].distance_along, 20.0);
    }

    #[test]
    fn test_labels_without_crossings() {
        let distances = vec![0.0, 10.0, 20.0];
        let (points, orientations) = straight_stations(&distances);

        let set = build_transects(&points, &distances, &orientations, &[], 20.0, CRS::utm(11, true));
        assert_eq!(set.transects[0].label, "start_001");
        assert_eq!(set.transects[1].label, "start_002");
        assert_eq!(set.transects[2].label, "start_003");
    }

    #[test]
    fn test_labels_around_crossing() {
        let distances = vec![0.0, 10.0, 25.0, 30.0, 40.0];
        let (points, orientations) = straight_stations(&distances);
        let crossings = vec![crossing("R1", 25.0)];

        let set = build_transects(&points, &distances, &orientations, &crossings, 20.0, CRS::utm(11, true));
        let labels: Vec<&str> = set.transects.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["start_001", "start_002", "R1", "R1_001", "R1_002"]);
    }

    #[test]
    fn test_labels_two_crossings() {
        let distances = vec![0.0, 10.0, 20.0, 30.0, 40.0];
        let (points, orientations) = straight_stations(&distances);
        let crossings = vec![crossing("A", 10.0), crossing("B", 30.0)];

        let set = build_transects(&points, &distances, &orientations, &crossings, 20.0, CRS::utm(11, true));
        let labels: Vec<&str> = set.transects.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["start_001", "A", "A_001", "B", "B_001"]);
    }

    #[test]
    fn test_points_and_transects_aligned() {
        let distances = vec![0.0, 10.0, 20.0];
        let (points, orientations) = straight_stations(&distances);

        let set = build_transects(&points, &distances, &orientations, &[], 20.0, CRS::utm(11, true));
        assert_eq!(set.transects.len(), set.points.len());
        for (t, p) in set.transects.iter().zip(set.points.iter()) {
            assert_eq!(t.id, p.id);
            assert_eq!(t.label, p.label);
            assert_eq!(t.distance_along, p.distance_along);
        }
    }
}
