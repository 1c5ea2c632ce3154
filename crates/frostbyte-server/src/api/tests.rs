use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, state::AppState};

fn setup_app() -> axum::Router {
    let mut config = Config::from_env();
    config.offline_mode = true;
    let state = Arc::new(AppState::offline(&config));
    api::routes().with_state(state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn route_request(start: [f64; 2], end: [f64; 2]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/route")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "start": start, "end": end }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = setup_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn computes_and_ranks_offline_routes() {
    let app = setup_app();

    // Old Montréal to the Plateau, ~1.5km.
    let response = app
        .oneshot(route_request([-73.5673, 45.5017], [-73.5540, 45.5120]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let routes = body["routes"].as_array().expect("routes array");
    assert_eq!(routes.len(), 2);

    assert_eq!(routes[0]["id"], "route_0");
    assert_eq!(routes[0]["type"], "fastest");
    assert_eq!(routes[1]["type"], "comfort");

    for route in routes {
        assert_eq!(route["geojson"]["type"], "LineString");
        assert!(route["geojson"]["coordinates"].as_array().unwrap().len() >= 2);
        assert!(route["distance_m"].as_f64().unwrap() > 0.0);
        assert!(route["score"].as_f64().unwrap() > 0.0);
        assert!(route["metrics"]["wind_cost"].as_f64().unwrap() >= 0.0);
        assert!(route["metrics"]["snow_cost"].as_f64().unwrap() > 0.0);
    }

    // The chosen id must be the minimum-score route.
    let chosen = body["chosen_route_id"].as_str().unwrap();
    let min_route = routes
        .iter()
        .min_by(|a, b| {
            a["score"]
                .as_f64()
                .unwrap()
                .partial_cmp(&b["score"].as_f64().unwrap())
                .unwrap()
        })
        .unwrap();
    assert_eq!(chosen, min_route["id"].as_str().unwrap());

    assert!(body["wind"]["speed_mps"].as_f64().is_some());
    assert!(!body["explanation"]["explanation"]
        .as_str()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn identical_endpoints_still_succeed() {
    let app = setup_app();
    let response = app
        .oneshot(route_request([-73.5673, 45.5017], [-73.5673, 45.5017]))
        .await
        .unwrap();
    // Zero-length routes degrade to zero cost, they never error.
    assert_eq!(response.status(), StatusCode::OK);

    // The degenerate bearing of 0 folds the fixed westerly into a pure
    // crosswind; cos(90 deg) leaves only float noise in the cost.
    let body = read_json(response).await;
    let wind_cost = body["routes"][0]["metrics"]["wind_cost"].as_f64().unwrap();
    assert!(wind_cost.abs() < 1e-9);
}

#[tokio::test]
async fn rejects_out_of_range_coordinates() {
    let app = setup_app();
    let response = app
        .oneshot(route_request([-73.5673, 95.0], [-73.5540, 45.5120]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("start"));
}

#[tokio::test]
async fn rejects_malformed_body() {
    let app = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/route")
        .header("content-type", "application/json")
        .body(Body::from("{\"start\": [1.0]}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
