//! Overpass building-density shelter enrichment.
//!
//! Shelter at a point is estimated from buildings within a small radius:
//! more buildings and taller buildings mean more wind protection. The
//! client is fallback-first: any Overpass failure degrades to an
//! unsheltered sample instead of failing the scoring pass.

use async_trait::async_trait;
use frostbyte_core::{EnrichmentError, ShelterLookup, ShelterSample};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::GridCache;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_RADIUS_M: u32 = 40;

/// Count contribution caps at 0.6 once 20+ buildings are nearby.
const COUNT_CAP: f64 = 0.6;
const COUNT_SATURATION: f64 = 20.0;
/// Height contribution caps at 0.4 once the average reaches 30m.
const HEIGHT_CAP: f64 = 0.4;
const HEIGHT_SATURATION_M: f64 = 30.0;

const METERS_PER_LEVEL: f64 = 3.0;

pub struct OverpassShelter {
    client: Client,
    base_url: String,
    radius_m: u32,
    cache: GridCache<ShelterSample>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl OverpassShelter {
    pub fn new(
        base_url: impl Into<String>,
        radius_m: u32,
        cache_grid_deg: f64,
        cache_max_entries: usize,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            radius_m,
            cache: GridCache::new(cache_grid_deg, cache_max_entries),
        }
    }

    async fn fetch(&self, lat: f64, lon: f64) -> Result<ShelterSample, EnrichmentError> {
        let query = buildings_query(lat, lon, self.radius_m);

        let response = match self
            .client
            .post(&self.base_url)
            .body(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Overpass request failed, assuming no shelter: {}", err);
                return Ok(unsheltered());
            }
        };

        let payload: OverpassResponse = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("Overpass payload unreadable, assuming no shelter: {}", err);
                return Ok(unsheltered());
            }
        };

        let heights: Vec<f64> = payload
            .elements
            .iter()
            .filter_map(|element| estimate_height_m(&element.tags))
            .collect();
        let avg_height_m = if heights.is_empty() {
            None
        } else {
            Some(heights.iter().sum::<f64>() / heights.len() as f64)
        };
        let count = payload.elements.len();

        Ok(ShelterSample {
            count: count as u32,
            avg_height_m,
            shelter_score: shelter_score(count, avg_height_m),
        })
    }
}

#[async_trait]
impl ShelterLookup for OverpassShelter {
    async fn shelter_at(&self, lat: f64, lon: f64) -> Result<ShelterSample, EnrichmentError> {
        self.cache
            .get_or_fetch(lat, lon, || self.fetch(lat, lon))
            .await
    }
}

fn unsheltered() -> ShelterSample {
    ShelterSample {
        count: 0,
        avg_height_m: None,
        shelter_score: 0.0,
    }
}

fn buildings_query(lat: f64, lon: f64, radius_m: u32) -> String {
    format!(
        "[out:json][timeout:25];\n\
         (\n\
           way(around:{radius_m},{lat},{lon})[\"building\"];\n\
           relation(around:{radius_m},{lat},{lon})[\"building\"];\n\
         );\n\
         out tags center;"
    )
}

/// Extract the leading number from tag values like `12`, `12.5` or `12m`.
fn parse_leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        if ch.is_ascii_digit() || ch == '.' || (idx == 0 && ch == '-') {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    trimmed.get(..end)?.parse().ok()
}

/// Best-effort building height: the `height` tag when present, otherwise
/// floor count at ~3m per level.
fn estimate_height_m(tags: &HashMap<String, String>) -> Option<f64> {
    if let Some(height) = tags.get("height").and_then(|v| parse_leading_number(v)) {
        if height > 0.0 {
            return Some(height);
        }
    }

    let levels = tags
        .get("building:levels")
        .and_then(|v| parse_leading_number(v))?;
    if levels > 0.0 {
        Some(levels * METERS_PER_LEVEL)
    } else {
        None
    }
}

/// Shelter score in [0, 1] from building count and average height.
fn shelter_score(count: usize, avg_height_m: Option<f64>) -> f64 {
    if count == 0 {
        return 0.0;
    }

    let count_score = (count as f64 / COUNT_SATURATION).min(COUNT_CAP);

    let height_bonus = avg_height_m
        .map(|height| (height / HEIGHT_SATURATION_M).min(HEIGHT_CAP))
        .unwrap_or(0.0);

    (count_score + height_bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_height_tag_variants() {
        assert_eq!(parse_leading_number("12"), Some(12.0));
        assert_eq!(parse_leading_number("12.5"), Some(12.5));
        assert_eq!(parse_leading_number("12m"), Some(12.0));
        assert_eq!(parse_leading_number(" 8 m "), Some(8.0));
        assert_eq!(parse_leading_number("tall"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn height_prefers_explicit_tag_over_levels() {
        let both = tags(&[("height", "25m"), ("building:levels", "3")]);
        assert_eq!(estimate_height_m(&both), Some(25.0));

        let levels_only = tags(&[("building:levels", "4")]);
        assert_eq!(estimate_height_m(&levels_only), Some(12.0));

        assert_eq!(estimate_height_m(&tags(&[])), None);
    }

    #[test]
    fn shelter_score_count_contribution_caps() {
        assert_eq!(shelter_score(0, None), 0.0);
        assert!((shelter_score(10, None) - 0.5).abs() < 1e-12);
        assert_eq!(shelter_score(20, None), 0.6);
        assert_eq!(shelter_score(100, None), 0.6);
    }

    #[test]
    fn shelter_score_height_contribution_caps() {
        assert!((shelter_score(10, Some(6.0)) - 0.7).abs() < 1e-12);
        assert_eq!(shelter_score(20, Some(30.0)), 1.0);
        assert_eq!(shelter_score(20, Some(90.0)), 1.0);
    }

    #[test]
    fn shelter_score_clamps_to_one() {
        assert!(shelter_score(50, Some(100.0)) <= 1.0);
    }
}
