//! Per-route cost accumulation: the segment-by-segment fold that turns a
//! raw route geometry plus enrichment lookups into [`RouteMetrics`].
//!
//! Segment processing is strictly sequential because the snow throttle
//! carries its last sample forward in point order. The enrichment lookups
//! are the only suspension points; different routes of one request are
//! independent and may be scored concurrently by the caller.

use crate::enrichment::{ShelterLookup, SnowLookup};
use crate::error::{validate_unit_interval, EnrichmentError};
use crate::models::{Candidate, GeoPoint, RouteAlternative, RouteKind, RouteMetrics, WindVector};
use crate::scoring::RouteScorer;
use crate::throttle::SnowThrottle;
use crate::{geo, wind};

/// Knobs of the geometry sampler and the snow throttle.
#[derive(Debug, Clone, Copy)]
pub struct SamplingOptions {
    /// Target spacing of sampled points in meters.
    pub interval_m: f64,
    /// Snow lookup happens once every this many sampled points.
    pub snow_stride: usize,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            interval_m: 40.0,
            snow_stride: SnowThrottle::DEFAULT_STRIDE,
        }
    }
}

/// Accumulate wind and snow costs along one route geometry.
///
/// `distance_m` comes from the routing provider and is passed through
/// untouched. A degenerate geometry (fewer than two points) degrades to
/// zero accumulated cost instead of erroring.
pub async fn accumulate_route_metrics<S, N>(
    geometry: &[GeoPoint],
    distance_m: f64,
    ambient_wind: WindVector,
    shelter: &S,
    snow: &N,
    options: SamplingOptions,
) -> Result<RouteMetrics, EnrichmentError>
where
    S: ShelterLookup,
    N: SnowLookup,
{
    let points = geo::sample_route_points(geometry, options.interval_m);

    let mut wind_cost = 0.0;
    let mut snow_cost = 0.0;
    let mut throttle = SnowThrottle::new(options.snow_stride);

    for pair in points.windows(2) {
        let (point, next) = (pair[0], pair[1]);

        let shelter_sample = shelter.shelter_at(point.lat, point.lon).await?;
        let shelter_score = validate_unit_interval(shelter_sample.shelter_score, "shelter_score")?;

        if throttle.needs_refresh() {
            let sample = snow.snow_at(point.lat, point.lon).await?;
            validate_unit_interval(sample.risk, "snow_risk")?;
            throttle.refresh(sample);
        }

        let bearing = geo::bearing_degrees(point, next);
        let headwind =
            wind::headwind_component(bearing, ambient_wind.direction_deg, ambient_wind.speed_mps);
        wind_cost += wind::wind_cost(headwind, shelter_score);

        if let Some(snow_sample) = throttle.advance() {
            snow_cost += snow_sample.risk;
        }
    }

    Ok(RouteMetrics {
        distance_m,
        wind_cost,
        snow_cost,
    })
}

/// Score one routing-provider alternative into a [`Candidate`].
///
/// The first alternative is conventionally the provider's fastest route;
/// any further one is a comfort alternative.
pub async fn score_alternative<S, N>(
    index: usize,
    alternative: &RouteAlternative,
    ambient_wind: WindVector,
    shelter: &S,
    snow: &N,
    scorer: &RouteScorer,
    options: SamplingOptions,
) -> Result<Candidate, EnrichmentError>
where
    S: ShelterLookup,
    N: SnowLookup,
{
    let metrics = accumulate_route_metrics(
        &alternative.geometry,
        alternative.distance_m,
        ambient_wind,
        shelter,
        snow,
        options,
    )
    .await?;
    let score = scorer.score_route(metrics);

    Ok(Candidate {
        id: format!("route_{index}"),
        kind: if index == 0 {
            RouteKind::Fastest
        } else {
            RouteKind::Comfort
        },
        geometry: alternative.geometry.clone(),
        distance_m: alternative.distance_m,
        duration_s: alternative.duration_s,
        metrics: score.breakdown,
        total_score: score.total_score,
    })
}
