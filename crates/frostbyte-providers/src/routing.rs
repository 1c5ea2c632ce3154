//! OpenRouteService walking-route alternatives client.

use frostbyte_core::{GeoPoint, RouteAlternative};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::error::{decode_json, ProviderError};

pub const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org/v2";

/// How many alternatives to request on top of the fastest route.
const ALTERNATIVE_TARGET_COUNT: u32 = 2;
const ALTERNATIVE_WEIGHT_FACTOR: f64 = 1.4;

pub struct OrsRouting {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    summary: Summary,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

impl OrsRouting {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch 2-3 alternative walking routes between two points.
    ///
    /// The POST geojson endpoint supports alternative routes; when it
    /// fails the plain GET directions endpoint is tried before giving up.
    pub async fn alternatives(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<RouteAlternative>, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("ORS_API_KEY"));
        }

        match self.post_alternatives(start, end).await {
            Ok(routes) => Ok(routes),
            Err(err) => {
                tracing::warn!("ORS POST request failed, retrying with GET: {}", err);
                self.get_alternatives(start, end).await
            }
        }
    }

    async fn post_alternatives(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<RouteAlternative>, ProviderError> {
        let url = format!("{}/directions/foot-walking/geojson", self.base_url);
        let body = json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
            "geometry": true,
            "instructions": false,
            "alternative_routes": {
                "target_count": ALTERNATIVE_TARGET_COUNT,
                "weight_factor": ALTERNATIVE_WEIGHT_FACTOR,
            },
        });

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json, application/geo+json")
            .header("Authorization", &self.api_key)
            .json(&body)
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

        let collection: FeatureCollection = decode_json(&response.text().await?)?;
        parse_features(collection)
    }

    async fn get_alternatives(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<RouteAlternative>, ProviderError> {
        let url = format!("{}/directions/foot-walking", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("start", &format!("{},{}", start.lon, start.lat)),
                ("end", &format!("{},{}", end.lon, end.lat)),
                ("alternatives", &ALTERNATIVE_TARGET_COUNT.to_string()),
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

        let collection: FeatureCollection = decode_json(&response.text().await?)?;
        parse_features(collection)
    }
}

fn parse_features(collection: FeatureCollection) -> Result<Vec<RouteAlternative>, ProviderError> {
    let routes: Vec<RouteAlternative> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let geometry = feature.geometry?;
            if geometry.coordinates.len() < 2 {
                return None;
            }
            Some(RouteAlternative {
                geometry: geometry
                    .coordinates
                    .iter()
                    .map(|&[lon, lat]| GeoPoint::new(lon, lat))
                    .collect(),
                distance_m: feature.properties.summary.distance,
                duration_s: feature.properties.summary.duration,
            })
        })
        .collect();

    if routes.is_empty() {
        return Err(ProviderError::NoRoutes);
    }
    Ok(routes)
}
