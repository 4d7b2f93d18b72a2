//! Pure-Rust WGS84 ↔ UTM projection (Snyder 1987, USGS formulas).
//!
//! The transect pipeline does all of its distance and angle math in a local
//! UTM zone chosen from the baseline centroid, then hands the zone back to
//! the caller so results can be reprojected for export. No external C
//! dependencies (no libproj).

use geo_types::{Coord, LineString};

use crate::crs::CRS;
use crate::error::{Error, Result};

// ── WGS84 ellipsoid constants ────────────────────────────────────────────

const A: f64 = 6_378_137.0; // semi-major axis (m)
const F: f64 = 1.0 / 298.257_223_563; // flattening
const E2: f64 = 2.0 * F - F * F; // eccentricity squared
const E_PRIME2: f64 = E2 / (1.0 - E2); // second eccentricity squared
const K0: f64 = 0.9996; // UTM scale factor
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

// ── Public API ───────────────────────────────────────────────────────────

/// A UTM zone acting as the local metric coordinate system for one
/// pipeline invocation.
///
/// Zone choice is a deterministic function of the geometry centroid and is
/// not user-configurable: survey-scale extents (tens to hundreds of meters)
/// fit comfortably inside a single zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    zone: u32,
    north: bool,
}

impl UtmZone {
    /// Zone containing the given WGS84 longitude/latitude (degrees).
    pub fn for_lonlat(lon: f64, lat: f64) -> Self {
        let zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u32;
        Self {
            zone,
            north: lat >= 0.0,
        }
    }

    /// Zone for the centroid of a geographic linestring.
    ///
    /// Uses the coordinate mean, which is accurate enough for zone choice.
    /// Fails on empty geometry rather than falling back to a geographic
    /// system (degree-based length/angle math would be wrong downstream).
    pub fn for_linestring(line: &LineString<f64>) -> Result<Self> {
        if line.0.is_empty() {
            return Err(Error::EmptyGeometry("cannot derive UTM zone"));
        }
        let n = line.0.len() as f64;
        let (sx, sy) = line
            .0
            .iter()
            .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
        Ok(Self::for_lonlat(sx / n, sy / n))
    }

    /// Recover a zone from an EPSG-coded CRS: 326xx → north, 327xx →
    /// south. `None` for anything else (including WGS84).
    pub fn from_crs(crs: &CRS) -> Option<Self> {
        let epsg = crs.epsg();
        if (32601..=32660).contains(&epsg) {
            Some(Self {
                zone: epsg - 32600,
                north: true,
            })
        } else if (32701..=32760).contains(&epsg) {
            Some(Self {
                zone: epsg - 32700,
                north: false,
            })
        } else {
            None
        }
    }

    pub fn zone(&self) -> u32 {
        self.zone
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    /// EPSG-coded CRS for this zone (326xx north, 327xx south).
    pub fn crs(&self) -> CRS {
        CRS::utm(self.zone, self.north)
    }

    /// WGS84 (longitude, latitude) in degrees to (easting, northing) in
    /// metres.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        wgs84_to_utm(lon, lat, self.zone, self.north)
    }

    /// (easting, northing) in metres back to WGS84 (longitude, latitude)
    /// in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        utm_to_wgs84(easting, northing, self.zone, self.north)
    }

    /// Project a geographic linestring into this zone.
    pub fn forward_linestring(&self, line: &LineString<f64>) -> LineString<f64> {
        LineString::from(
            line.0
                .iter()
                .map(|c| {
                    let (x, y) = self.forward(c.x, c.y);
                    Coord { x, y }
                })
                .collect::<Vec<_>>(),
        )
    }

    /// Reproject a planar linestring in this zone back to WGS84.
    pub fn inverse_linestring(&self, line: &LineString<f64>) -> LineString<f64> {
        LineString::from(
            line.0
                .iter()
                .map(|c| {
                    let (lon, lat) = self.inverse(c.x, c.y);
                    Coord { x: lon, y: lat }
                })
                .collect::<Vec<_>>(),
        )
    }
}

// ── Forward projection (Snyder 1987, USGS Prof. Paper 1395, pp. 61-64) ──

/// Convert WGS84 (longitude, latitude) in degrees to UTM (easting, northing)
/// in metres for the given zone and hemisphere.
fn wgs84_to_utm(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    let lon0 = central_meridian(zone);

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = E_PRIME2 * cos_lat * cos_lat;
    let a_coeff = cos_lat * (lon - lon0);

    // Meridional arc length M (Snyder eq. 3-21)
    let m = meridional_arc(lat);

    let a2 = a_coeff * a_coeff;
    let a4 = a2 * a2;
    let a6 = a4 * a2;

    // Easting (Snyder eq. 8-9)
    let easting = K0 * n
        * (a_coeff
            + (1.0 - t + c) * a2 * a_coeff / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * E_PRIME2)
                * a4
                * a_coeff
                / 120.0)
        + FALSE_EASTING;

    // Northing (Snyder eq. 8-10)
    let northing = K0
        * (m
            + n * tan_lat
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * E_PRIME2) * a6 / 720.0));

    let northing = if north {
        northing
    } else {
        northing + FALSE_NORTHING_SOUTH
    };

    (easting, northing)
}

// ── Inverse projection (Snyder eqs. 8-17 to 8-25) ───────────────────────

/// Convert UTM (easting, northing) in metres back to WGS84
/// (longitude, latitude) in degrees.
fn utm_to_wgs84(easting: f64, northing: f64, zone: u32, north: bool) -> (f64, f64) {
    let x = easting - FALSE_EASTING;
    let y = if north {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };

    let lon0 = central_meridian(zone);

    // Footprint latitude (Snyder eqs. 7-19, 3-24)
    let m = y / K0;
    let e2 = E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let sqrt_1me2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = E_PRIME2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    // Latitude (Snyder eq. 8-17)
    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * E_PRIME2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * E_PRIME2
                    - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    // Longitude (Snyder eq. 8-18)
    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * E_PRIME2 + 24.0 * t1 * t1)
                * d5
                / 120.0)
            / cos_phi1;

    (lon.to_degrees(), lat.to_degrees())
}

/// Central meridian of the zone, in radians.
fn central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

/// Meridional arc from equator to latitude `lat` (radians).
/// Snyder eq. 3-21.
fn meridional_arc(lat: f64) -> f64 {
    let e2 = E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

// ── Tests ────────────────────────────────────────────────────────────────
