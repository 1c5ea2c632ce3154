//! Open-Meteo current-wind client.
//!
//! One wind vector is fetched per scoring request, at the midpoint of
//! start and end, and shared across all routes and segments.

use dashmap::DashMap;
use frostbyte_core::WindVector;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{decode_json, ProviderError};

pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Wind changes slowly; cache per ~1km cell for a few minutes.
const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_GRID_DEG: f64 = 0.01;

pub struct OpenMeteoWind {
    client: Client,
    base_url: String,
    cache: DashMap<(i64, i64), CachedWind>,
}

#[derive(Debug, Clone)]
struct CachedWind {
    fetched_at: Instant,
    vector: WindVector,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentWind,
}

#[derive(Debug, Deserialize)]
struct CurrentWind {
    wind_speed_10m: f64,
    wind_direction_10m: f64,
}

fn cache_key(lat: f64, lon: f64) -> (i64, i64) {
    (
        (lat / CACHE_GRID_DEG).round() as i64,
        (lon / CACHE_GRID_DEG).round() as i64,
    )
}

impl OpenMeteoWind {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            cache: DashMap::new(),
        }
    }

    pub async fn wind_at(&self, lat: f64, lon: f64) -> Result<WindVector, ProviderError> {
        let key = cache_key(lat, lon);
        if let Some(entry) = self.cache.get(&key) {
            if entry.fetched_at.elapsed() < CACHE_TTL {
                return Ok(entry.vector);
            }
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", format!("{lat:.4}")),
                ("longitude", format!("{lon:.4}")),
                ("current", "wind_speed_10m,wind_direction_10m".to_string()),
                // Open-Meteo defaults to km/h; the scorer works in m/s.
                ("wind_speed_unit", "ms".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let payload: ForecastResponse = decode_json(&response.text().await?)?;
        let vector = WindVector {
            speed_mps: payload.current.wind_speed_10m.max(0.0),
            direction_deg: payload.current.wind_direction_10m.rem_euclid(360.0),
        };

        self.prune_expired();
        self.cache.insert(
            key,
            CachedWind {
                fetched_at: Instant::now(),
                vector,
            },
        );
        Ok(vector)
    }

    /// Drop entries past the TTL so the map stays bounded.
    fn prune_expired(&self) {
        self.cache
            .retain(|_, entry| entry.fetched_at.elapsed() < CACHE_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_rounds_to_hundredths() {
        assert_eq!(cache_key(45.5017, -73.5673), cache_key(45.5049, -73.5651));
        assert_ne!(cache_key(45.5017, -73.5673), cache_key(45.5117, -73.5673));
    }

    #[tokio::test(start_paused = true)]
    async fn inserting_prunes_expired_entries() {
        let wind = OpenMeteoWind::new(DEFAULT_OPEN_METEO_URL);
        let canned = WindVector {
            speed_mps: 5.0,
            direction_deg: 180.0,
        };

        let stale_key = cache_key(45.50, -73.56);
        wind.cache.insert(
            stale_key,
            CachedWind {
                fetched_at: Instant::now(),
                vector: canned,
            },
        );
        tokio::time::advance(CACHE_TTL + Duration::from_secs(1)).await;

        let fresh_key = cache_key(45.60, -73.56);
        wind.cache.insert(
            fresh_key,
            CachedWind {
                fetched_at: Instant::now(),
                vector: canned,
            },
        );
        wind.prune_expired();

        assert!(!wind.cache.contains_key(&stale_key));
        assert!(wind.cache.contains_key(&fresh_key));
    }

    #[test]
    fn parses_forecast_payload() {
        let payload = serde_json::json!({
            "latitude": 45.5,
            "longitude": -73.57,
            "current": {"wind_speed_10m": 6.4, "wind_direction_10m": 285.0}
        });
        let parsed: ForecastResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.current.wind_speed_10m, 6.4);
        assert_eq!(parsed.current.wind_direction_10m, 285.0);
    }
}
