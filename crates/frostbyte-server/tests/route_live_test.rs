//! Live end-to-end route scoring test.
//!
//! Run with: cargo test --test route_live_test -- --ignored
//! Requires a running frostbyte server (offline mode is fine:
//! FROSTBYTE_OFFLINE=true cargo run --bin frostbyte-server).

use reqwest::Client;

fn base_url() -> String {
    std::env::var("FROSTBYTE_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[tokio::test]
#[ignore]
async fn scores_and_explains_a_route() {
    let client = Client::new();
    let base = base_url();

    let response = client
        .post(format!("{}/v1/route", base))
        .json(&serde_json::json!({
            "start": [-73.5673, 45.5017],
            "end": [-73.5540, 45.5120]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    let routes = body["routes"].as_array().unwrap();
    assert!(!routes.is_empty());

    let chosen = body["chosen_route_id"].as_str().unwrap();
    assert!(routes.iter().any(|r| r["id"] == chosen));
    assert!(body["wind"]["speed_mps"].as_f64().is_some());
    assert!(body["explanation"]["explanation"].as_str().is_some());
}
