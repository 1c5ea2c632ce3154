//! Winter walking-route comfort scoring.
//!
//! Given candidate route geometries between two points, one shared wind
//! vector and per-location shelter/snow enrichment, this crate resamples
//! each polyline, accumulates headwind and snow costs per segment and
//! picks the route with the lowest weighted score. It performs no I/O:
//! enrichment arrives through the [`enrichment`] traits.

pub mod enrichment;
pub mod error;
pub mod geo;
pub mod models;
pub mod pipeline;
pub mod scoring;
pub mod throttle;
pub mod wind;

pub use enrichment::{ShelterLookup, SnowLookup};
pub use error::{validate_unit_interval, EnrichmentError, ScoreError};
pub use geo::{bearing_degrees, haversine_distance, sample_route_points, EARTH_RADIUS_M};
pub use models::{
    Candidate, GeoPoint, RouteAlternative, RouteKind, RouteMetrics, RouteScore, ShelterSample,
    SnowSample, SnowStatus, WindVector,
};
pub use pipeline::{accumulate_route_metrics, score_alternative, SamplingOptions};
pub use scoring::{choose_best, RouteScorer, ScoreWeights};
pub use throttle::SnowThrottle;
pub use wind::{headwind_component, wind_cost};
