//! Core data models for the route comfort scorer.

use serde::{Deserialize, Serialize};

/// A geographic point in degrees (longitude first, GeoJSON order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Midpoint by plain coordinate averaging. Good enough at city scales.
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            lon: (self.lon + other.lon) / 2.0,
            lat: (self.lat + other.lat) / 2.0,
        }
    }
}

/// One walking route as returned by the routing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAlternative {
    /// Ordered polyline vertices, never mutated after receipt.
    pub geometry: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Ambient wind, meteorological convention: `direction_deg` is the
/// direction the wind blows *from*, in [0, 360).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindVector {
    pub speed_mps: f64,
    pub direction_deg: f64,
}

/// Building-density enrichment for one location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShelterSample {
    /// Number of buildings found near the point.
    pub count: u32,
    /// Average estimated building height in meters, when known.
    pub avg_height_m: Option<f64>,
    /// Normalized shelter estimate in [0, 1]; 1 = fully sheltered.
    pub shelter_score: f64,
}

/// Snow-clearing status codes reported by the snow provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnowStatus {
    Snowy,
    Cleared,
    Clear,
    Planned,
    Replanned,
    InProgress,
    #[default]
    Unknown,
}

/// Snow-risk enrichment for one location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnowSample {
    pub status: SnowStatus,
    /// Normalized risk estimate in [0, 1]; 1 = worst.
    pub risk: f64,
}

/// Accumulated per-route costs. Created once per scoring pass and not
/// mutated after aggregation completes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_m: f64,
    pub wind_cost: f64,
    pub snow_cost: f64,
}

/// Scoring result for a route. Lower total is better.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteScore {
    pub total_score: f64,
    pub breakdown: RouteMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// The routing provider's first alternative.
    Fastest,
    /// Any further alternative.
    Comfort,
}

/// One fully scored route candidate, request-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub geometry: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub metrics: RouteMetrics,
    pub total_score: f64,
}
