//! Costera CLI - transect generation from drawn GeoJSON baselines

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use costera_algorithms::transect::{baseline_from_geometry, generate_transects, TransectParams};
use costera_core::proj::UtmZone;
use costera_core::vector::{ReferenceLine, TransectSet};
use geo_types::{Geometry, LineString, Point, Polygon};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "costera")]
#[command(author, version, about = "Coastal transect generation", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate perpendicular transects along a drawn baseline
    Generate {
        /// Input GeoJSON FeatureCollection; the last drawn feature is the
        /// baseline and must be a LineString
        input: PathBuf,
        /// Output GeoJSON file for the transect segments
        output: PathBuf,
        /// Optional GeoJSON FeatureCollection of named reference survey
        /// lines ("name" property; REF_<i> when absent)
        #[arg(short, long)]
        references: Option<PathBuf>,
        /// Optional output GeoJSON file for the station points
        #[arg(long)]
        points: Option<PathBuf>,
        /// Station spacing along the baseline, metres
        #[arg(short, long, default_value = "1.0")]
        spacing: f64,
        /// Transect length, metres
        #[arg(short, long, default_value = "20.0")]
        length: f64,
        /// Smoothing window over the orientation field (stations)
        #[arg(short, long, default_value = "9")]
        window: usize,
        /// Reproject output back to WGS84 instead of UTM metres
        #[arg(long)]
        wgs84: bool,
    },
}

// ─── GeoJSON input ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: GeoJsonGeometry,
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

fn parse_positions(value: &serde_json::Value) -> Result<Vec<(f64, f64)>> {
    let positions: Vec<Vec<f64>> =
        serde_json::from_value(value.clone()).context("Malformed coordinate array")?;
    positions
        .into_iter()
        .map(|p| {
            if p.len() < 2 {
                bail!("Coordinate with fewer than 2 components");
            }
            Ok((p[0], p[1]))
        })
        .collect()
}

/// Convert a GeoJSON geometry into a geo type so the core can apply its
/// input-shape validation with a precise type name.
fn to_geometry(g: &GeoJsonGeometry) -> Result<Geometry<f64>> {
    match g.kind.as_str() {
        "LineString" => {
            let coords = parse_positions(&g.coordinates)?;
            Ok(Geometry::LineString(LineString::from(coords)))
        }
        "Point" => {
            let p: Vec<f64> =
                serde_json::from_value(g.coordinates.clone()).context("Malformed point")?;
            if p.len() < 2 {
                bail!("Point with fewer than 2 components");
            }
            Ok(Geometry::Point(Point::new(p[0], p[1])))
        }
        "Polygon" => {
            let rings: Vec<serde_json::Value> =
                serde_json::from_value(g.coordinates.clone()).context("Malformed polygon")?;
            let exterior = match rings.first() {
                Some(ring) => parse_positions(ring)?,
                None => Vec::new(),
            };
            Ok(Geometry::Polygon(Polygon::new(
                LineString::from(exterior),
                vec![],
            )))
        }
        other => bail!("Unsupported geometry type: {other}"),
    }
}

/// The baseline is the most recent feature the user drew.
fn read_baseline(path: &PathBuf) -> Result<LineString<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let fc: FeatureCollection =
        serde_json::from_str(&text).context("Failed to parse GeoJSON FeatureCollection")?;
    let last = fc
        .features
        .last()
        .context("Input contains no drawn features")?;
    let geometry = to_geometry(&last.geometry)?;
    let baseline = baseline_from_geometry(&geometry)
        .context("Please draw a polyline, not a point or polygon")?;
    debug!("Baseline with {} vertices", baseline.0.len());
    Ok(baseline)
}

fn read_references(path: &PathBuf) -> Result<Vec<ReferenceLine>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let fc: FeatureCollection =
        serde_json::from_str(&text).context("Failed to parse reference GeoJSON")?;

    let mut references = Vec::with_capacity(fc.features.len());
    for (i, feature) in fc.features.iter().enumerate() {
        let geometry = match to_geometry(&feature.geometry)? {
            Geometry::LineString(ls) => ls,
            _ => bail!("Reference feature {i} is not a LineString"),
        };
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        references.push(match name {
            Some(name) => ReferenceLine::new(name, geometry),
            None => ReferenceLine::unnamed(i, geometry),
        });
    }
    info!("Loaded {} reference line(s)", references.len());
    Ok(references)
}

// ─── GeoJSON output ─────────────────────────────────────────────────────

fn transects_to_geojson(set: &TransectSet) -> serde_json::Value {
    let features: Vec<serde_json::Value> = set
        .transects
        .iter()
        .map(|t| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [
                        [t.geometry.start.x, t.geometry.start.y],
                        [t.geometry.end.x, t.geometry.end.y],
                    ],
                },
                "properties": {
                    "transect_id": t.id,
                    "dist_along": t.distance_along,
                    "label": t.label,
                },
            })
        })
        .collect();
    feature_collection(features, set)
}

fn points_to_geojson(set: &TransectSet) -> serde_json::Value {
    let features: Vec<serde_json::Value> = set
        .points
        .iter()
        .map(|p| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [p.geometry.x(), p.geometry.y()],
                },
                "properties": {
                    "transect_id": p.id,
                    "dist_along": p.distance_along,
                    "label": p.label,
                },
            })
        })
        .collect();
    feature_collection(features, set)
}

fn feature_collection(features: Vec<serde_json::Value>, set: &TransectSet) -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "crs": {
            "type": "name",
            "properties": { "name": set.crs.identifier() },
        },
        "features": features,
    })
}

fn write_geojson(value: &serde_json::Value, path: &PathBuf) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            references,
            points,
            spacing,
            length,
            window,
            wgs84,
        } => {
            let baseline = read_baseline(&input)?;
            let reference_lines = match &references {
                Some(path) => read_references(path)?,
                None => Vec::new(),
            };

            let params = TransectParams {
                spacing_m: spacing,
                length_m: length,
                smoothing_window: window,
                ..Default::default()
            };

            let start = Instant::now();
            let set = generate_transects(&baseline, &reference_lines, &params)
                .context("Failed to generate transects")?;
            let elapsed = start.elapsed();

            info!("Generated {} transects", set.len());
            info!("Export projection: {}", set.crs);

            let set = if wgs84 {
                let zone = UtmZone::from_crs(&set.crs)
                    .context("Output CRS is not a UTM zone")?;
                set.to_geographic(&zone)
            } else {
                set
            };

            write_geojson(&transects_to_geojson(&set), &output)?;
            done("Transects", &output, elapsed);

            if let Some(points_path) = points {
                write_geojson(&points_to_geojson(&set), &points_path)?;
                done("Station points", &points_path, elapsed);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_geometry_linestring() {
        let g = GeoJsonGeometry {
            kind: "LineString".into(),
            coordinates: json!([[-117.0, 32.0], [-117.0, 32.001]]),
        };
        assert!(matches!(to_geometry(&g).unwrap(), Geometry::LineString(_)));
    }

    #[test]
    fn test_to_geometry_malformed_polygon_ring_errors() {
        // Truncated coordinate in the exterior ring: an error, not a panic
        let g = GeoJsonGeometry {
            kind: "Polygon".into(),
            coordinates: json!([[[1.0]]]),
        };
        assert!(to_geometry(&g).is_err());
    }

    #[test]
    fn test_to_geometry_malformed_linestring_errors() {
        let g = GeoJsonGeometry {
            kind: "LineString".into(),
            coordinates: json!([[-117.0, 32.0], [32.001]]),
        };
        assert!(to_geometry(&g).is_err());
    }
}
