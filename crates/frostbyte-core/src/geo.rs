//! Spherical geometry: distances, bearings and polyline resampling.

use crate::models::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (Haversine formula).
pub fn haversine_distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let dphi = (p2.lat - p1.lat).to_radians();
    let dlambda = (p2.lon - p1.lon).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Forward azimuth from `p1` to `p2` in degrees, normalized to [0, 360).
/// 0 = north, 90 = east. Coincident points yield 0.
pub fn bearing_degrees(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let dlambda = (p2.lon - p1.lon).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Linear interpolation of longitude and latitude independently.
///
/// Not a geodesic slerp; at pedestrian segment lengths the error is far
/// below the sampling interval.
pub fn interpolate(p1: GeoPoint, p2: GeoPoint, fraction: f64) -> GeoPoint {
    GeoPoint {
        lon: p1.lon + (p2.lon - p1.lon) * fraction,
        lat: p1.lat + (p2.lat - p1.lat) * fraction,
    }
}

/// Resample a route polyline into near-uniformly spaced points.
///
/// Every original vertex is kept; each segment additionally gets
/// `floor(length / interval_m)` interior points at even fractions.
/// Repeated vertices are kept as-is. An empty or single-point input
/// yields an empty result.
pub fn sample_route_points(geometry: &[GeoPoint], interval_m: f64) -> Vec<GeoPoint> {
    if geometry.len() < 2 {
        return Vec::new();
    }

    let mut sampled = Vec::new();

    for (i, pair) in geometry.windows(2).enumerate() {
        let (p1, p2) = (pair[0], pair[1]);
        let segment_distance = haversine_distance(p1, p2);

        if i == 0 {
            sampled.push(p1);
        }

        let num_samples = if interval_m > 0.0 && segment_distance.is_finite() {
            (segment_distance / interval_m).floor() as usize
        } else {
            0
        };
        for j in 1..=num_samples {
            let fraction = j as f64 / (num_samples + 1) as f64;
            sampled.push(interpolate(p1, p2, fraction));
        }

        sampled.push(p2);
    }

    sampled
}
