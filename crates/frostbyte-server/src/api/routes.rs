//! REST API routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use frostbyte_core::{
    choose_best, pipeline, GeoPoint, RouteKind, RouteMetrics, ScoreError, WindVector,
};
use frostbyte_providers::{Explanation, ProviderError};

use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/route", post(compute_route))
        .route("/health", get(|| async { "OK" }))
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// [lon, lat]
    pub start: [f64; 2],
    /// [lon, lat]
    pub end: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub routes: Vec<RouteSummary>,
    pub chosen_route_id: String,
    pub wind: WindVector,
    pub explanation: Explanation,
}

#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub geojson: LineString,
    pub distance_m: f64,
    pub duration_s: f64,
    pub score: f64,
    pub metrics: RouteMetrics,
}

/// GeoJSON LineString geometry.
#[derive(Debug, Serialize)]
pub struct LineString {
    pub r#type: &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

fn line_string(points: &[GeoPoint]) -> LineString {
    LineString {
        r#type: "LineString",
        coordinates: points.iter().map(|p| [p.lon, p.lat]).collect(),
    }
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn parse_point(coords: [f64; 2], name: &str) -> Result<GeoPoint, ApiError> {
    let [lon, lat] = coords;
    if !lon.is_finite() || !lat.is_finite() || !(-180.0..=180.0).contains(&lon)
        || !(-90.0..=90.0).contains(&lat)
    {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("{name} must be [lon, lat] in valid ranges"),
        ));
    }
    Ok(GeoPoint::new(lon, lat))
}

fn map_provider_error(err: ProviderError) -> ApiError {
    match err {
        ProviderError::NoRoutes => error_response(StatusCode::NOT_FOUND, "no routes found"),
        ProviderError::MissingApiKey(name) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, format!("{name} is not configured"))
        }
        other => {
            tracing::error!("provider failure: {}", other);
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}

/// Compute walking routes with wind and snow awareness.
async fn compute_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let start = parse_point(request.start, "start")?;
    let end = parse_point(request.end, "end")?;

    let alternatives = state
        .routing
        .alternatives(start, end)
        .await
        .map_err(map_provider_error)?;
    if alternatives.is_empty() {
        return Err(error_response(StatusCode::NOT_FOUND, "no routes found"));
    }

    // One wind vector for the whole request, sampled at the midpoint.
    let midpoint = start.midpoint(end);
    let wind = state
        .wind
        .wind_at(midpoint.lat, midpoint.lon)
        .await
        .map_err(map_provider_error)?;

    // Routes are independent once sampled; score them concurrently.
    // Within each route, segments stay sequential for the snow throttle.
    let candidates = futures::future::try_join_all(alternatives.iter().enumerate().map(
        |(index, alternative)| {
            pipeline::score_alternative(
                index,
                alternative,
                wind,
                &state.shelter,
                &state.snow,
                &state.scorer,
                state.sampling,
            )
        },
    ))
    .await
    .map_err(|err| {
        tracing::error!("enrichment failure: {}", err);
        error_response(StatusCode::BAD_GATEWAY, err.to_string())
    })?;

    let best_id = match choose_best(&candidates) {
        Ok(best) => best.id.clone(),
        Err(ScoreError::NoCandidates) => {
            return Err(error_response(StatusCode::NOT_FOUND, "no routes found"));
        }
        Err(err) => {
            return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
        }
    };

    let explanation = state.explainer.explain(&best_id, &candidates).await;

    let routes = candidates
        .into_iter()
        .map(|candidate| RouteSummary {
            geojson: line_string(&candidate.geometry),
            id: candidate.id,
            kind: candidate.kind,
            distance_m: candidate.distance_m,
            duration_s: candidate.duration_s,
            score: candidate.total_score,
            metrics: candidate.metrics,
        })
        .collect();

    Ok(Json(RouteResponse {
        routes,
        chosen_route_id: best_id,
        wind,
        explanation,
    }))
}
