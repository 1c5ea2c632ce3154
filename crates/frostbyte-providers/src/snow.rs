//! Montréal snow-clearing ("planif-neige") snow-risk enrichment.
//!
//! Risk for a point is resolved in three steps: reverse-geocode the
//! point to a street and house number (Nominatim), match the street
//! against the geobase map to find its street-side id, then look up the
//! current clearing state in the planif feed. The feed and map are held
//! in memory and refreshed every 20 minutes. Fallback-first: every
//! failure path yields a conservative `unknown` sample instead of
//! failing the scoring pass.

use async_trait::async_trait;
use frostbyte_core::{EnrichmentError, SnowLookup, SnowSample, SnowStatus};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::cache::GridCache;

pub const DEFAULT_PLANIF_URL: &str =
    "https://raw.githubusercontent.com/ludodefgh/planif-neige-public-api/main/data/planif-neige.json";
pub const DEFAULT_GEOMAP_URL: &str =
    "https://raw.githubusercontent.com/ludodefgh/planif-neige-public-api/main/data/geobase-map.json";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

const DATASET_REFRESH: Duration = Duration::from_secs(20 * 60);
const USER_AGENT: &str = "frostbyte";

/// Conservative risk when nothing is known about a street.
const FALLBACK_RISK: f64 = 0.3;

pub struct PlanifNeigeSnow {
    client: Client,
    planif_url: String,
    geomap_url: String,
    nominatim_url: String,
    dataset: RwLock<Option<SnowDataset>>,
    cache: GridCache<SnowSample>,
}

struct SnowDataset {
    loaded_at: Instant,
    planif_by_cote: BTreeMap<String, Option<i64>>,
    geomap: BTreeMap<String, GeobaseSegment>,
}

#[derive(Debug, Deserialize)]
struct PlanifFeed {
    #[serde(default)]
    planifications: Vec<PlanifRecord>,
}

#[derive(Debug, Deserialize)]
struct PlanifRecord {
    cote_rue_id: Option<Value>,
    etat_deneig: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeobaseSegment {
    nom_voie: Option<String>,
    debut_adresse: Option<Value>,
    fin_adresse: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    pedestrian: Option<String>,
    footway: Option<String>,
    house_number: Option<String>,
}

impl PlanifNeigeSnow {
    pub fn new(
        planif_url: impl Into<String>,
        geomap_url: impl Into<String>,
        nominatim_url: impl Into<String>,
        cache_grid_deg: f64,
        cache_max_entries: usize,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            planif_url: planif_url.into(),
            geomap_url: geomap_url.into(),
            nominatim_url: nominatim_url.into(),
            dataset: RwLock::new(None),
            cache: GridCache::new(cache_grid_deg, cache_max_entries),
        }
    }

    async fn fetch(&self, lat: f64, lon: f64) -> Result<SnowSample, EnrichmentError> {
        if let Err(err) = self.ensure_dataset().await {
            tracing::warn!("planif dataset unavailable, using fallback risk: {}", err);
            return Ok(fallback_sample());
        }

        let (street, house_number) = match self.reverse_geocode(lat, lon).await {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!("reverse geocoding failed, using fallback risk: {}", err);
                return Ok(fallback_sample());
            }
        };

        let Some(street) = street else {
            return Ok(fallback_sample());
        };

        let guard = self.dataset.read().await;
        let Some(dataset) = guard.as_ref() else {
            return Ok(fallback_sample());
        };

        let Some(cote_id) = find_cote_rue_id(&dataset.geomap, &street, house_number) else {
            return Ok(fallback_sample());
        };
        let Some(etat) = dataset.planif_by_cote.get(&cote_id) else {
            return Ok(fallback_sample());
        };

        Ok(etat_to_sample(*etat))
    }

    /// Load or refresh the planif feed and geobase map.
    async fn ensure_dataset(&self) -> Result<(), reqwest::Error> {
        {
            let guard = self.dataset.read().await;
            if let Some(dataset) = guard.as_ref() {
                if dataset.loaded_at.elapsed() < DATASET_REFRESH {
                    return Ok(());
                }
            }
        }

        let mut guard = self.dataset.write().await;
        // Another writer may have refreshed while we waited.
        if let Some(dataset) = guard.as_ref() {
            if dataset.loaded_at.elapsed() < DATASET_REFRESH {
                return Ok(());
            }
        }

        let planif: PlanifFeed = self
            .client
            .get(&self.planif_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let geomap: BTreeMap<String, GeobaseSegment> = self
            .client
            .get(&self.geomap_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut planif_by_cote = BTreeMap::new();
        for record in planif.planifications {
            if let Some(id) = record.cote_rue_id.as_ref().and_then(value_to_id) {
                planif_by_cote.insert(id, record.etat_deneig);
            }
        }

        *guard = Some(SnowDataset {
            loaded_at: Instant::now(),
            planif_by_cote,
            geomap,
        });
        Ok(())
    }

    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<(Option<String>, Option<i64>), reqwest::Error> {
        let response: NominatimResponse = self
            .client
            .get(&self.nominatim_url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let address = response.address;
        let street = address
            .road
            .or(address.pedestrian)
            .or(address.footway);
        let house_number = address
            .house_number
            .as_deref()
            .and_then(parse_house_number);
        Ok((street, house_number))
    }
}

#[async_trait]
impl SnowLookup for PlanifNeigeSnow {
    async fn snow_at(&self, lat: f64, lon: f64) -> Result<SnowSample, EnrichmentError> {
        self.cache
            .get_or_fetch(lat, lon, || self.fetch(lat, lon))
            .await
    }
}

fn fallback_sample() -> SnowSample {
    SnowSample {
        status: SnowStatus::Unknown,
        risk: FALLBACK_RISK,
    }
}

/// Ids appear both as strings and numbers across the feed.
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// House numbers like "123-125" keep the leading number.
fn parse_house_number(raw: &str) -> Option<i64> {
    raw.split('-').next()?.trim().parse().ok()
}

/// Normalize street names for matching: lowercase, alphanumerics and
/// spaces only. Capitalization and punctuation vary between sources.
fn normalize_street(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Find the street-side id matching a street name and optional house
/// number. With a house number, the tightest address range containing it
/// wins; without one, the first name match is taken.
fn find_cote_rue_id(
    geomap: &BTreeMap<String, GeobaseSegment>,
    street: &str,
    house_number: Option<i64>,
) -> Option<String> {
    let street_norm = normalize_street(street);
    if street_norm.is_empty() {
        return None;
    }

    let mut best_id: Option<String> = None;
    let mut best_range: Option<i64> = None;

    for (id, segment) in geomap {
        let Some(nom_voie) = segment.nom_voie.as_deref() else {
            continue;
        };
        if normalize_street(nom_voie) != street_norm {
            continue;
        }

        match house_number {
            Some(number) => {
                let (Some(start), Some(end)) = (
                    segment.debut_adresse.as_ref().and_then(value_to_i64),
                    segment.fin_adresse.as_ref().and_then(value_to_i64),
                ) else {
                    continue;
                };
                if start <= number && number <= end {
                    let range = end - start;
                    if best_range.map_or(true, |best| range < best) {
                        best_range = Some(range);
                        best_id = Some(id.clone());
                    }
                }
            }
            None => return Some(id.clone()),
        }
    }

    best_id
}

/// Map planif `etat_deneig` codes to a status and risk estimate.
fn etat_to_sample(etat: Option<i64>) -> SnowSample {
    let (status, risk) = match etat {
        None => (SnowStatus::Unknown, 0.3),
        Some(0) => (SnowStatus::Snowy, 0.9),
        Some(1) => (SnowStatus::Cleared, 0.1),
        Some(2) => (SnowStatus::Planned, 0.6),
        Some(3) | Some(4) => (SnowStatus::Replanned, 0.7),
        Some(5) => (SnowStatus::InProgress, 0.4),
        Some(10) => (SnowStatus::Clear, 0.2),
        Some(_) => (SnowStatus::Unknown, 0.35),
    };
    SnowSample { status, risk }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(nom_voie: &str, start: i64, end: i64) -> GeobaseSegment {
        GeobaseSegment {
            nom_voie: Some(nom_voie.to_string()),
            debut_adresse: Some(Value::from(start)),
            fin_adresse: Some(Value::from(end)),
        }
    }

    #[test]
    fn normalizes_street_names() {
        assert_eq!(normalize_street("  Rue Sainte-Catherine "), "rue saintecatherine");
        assert_eq!(normalize_street("SAINT-URBAIN"), "sainturbain");
    }

    #[test]
    fn house_number_keeps_leading_part() {
        assert_eq!(parse_house_number("123"), Some(123));
        assert_eq!(parse_house_number("123-125"), Some(123));
        assert_eq!(parse_house_number(" 42 - 44"), Some(42));
        assert_eq!(parse_house_number("n/a"), None);
    }

    #[test]
    fn tightest_address_range_wins() {
        let mut geomap = BTreeMap::new();
        geomap.insert("10".to_string(), segment("Rue Rachel", 1, 500));
        geomap.insert("11".to_string(), segment("Rue Rachel", 100, 160));
        geomap.insert("12".to_string(), segment("Boulevard Pie-IX", 1, 500));

        let id = find_cote_rue_id(&geomap, "rue rachel", Some(120)).unwrap();
        assert_eq!(id, "11");
    }

    #[test]
    fn no_house_number_takes_first_street_match() {
        let mut geomap = BTreeMap::new();
        geomap.insert("20".to_string(), segment("Avenue du Parc", 1, 99));
        geomap.insert("21".to_string(), segment("Avenue du Parc", 100, 200));

        let id = find_cote_rue_id(&geomap, "Avenue du Parc", None).unwrap();
        assert_eq!(id, "20");
    }

    #[test]
    fn unmatched_street_yields_none() {
        let mut geomap = BTreeMap::new();
        geomap.insert("30".to_string(), segment("Rue Ontario", 1, 99));

        assert!(find_cote_rue_id(&geomap, "Rue Sherbrooke", Some(50)).is_none());
        assert!(find_cote_rue_id(&geomap, "Rue Ontario", Some(150)).is_none());
    }

    #[test]
    fn etat_codes_map_to_status_and_risk() {
        assert_eq!(etat_to_sample(Some(0)).status, SnowStatus::Snowy);
        assert_eq!(etat_to_sample(Some(0)).risk, 0.9);
        assert_eq!(etat_to_sample(Some(1)).status, SnowStatus::Cleared);
        assert_eq!(etat_to_sample(Some(1)).risk, 0.1);
        assert_eq!(etat_to_sample(Some(2)).risk, 0.6);
        assert_eq!(etat_to_sample(Some(3)).status, SnowStatus::Replanned);
        assert_eq!(etat_to_sample(Some(4)).risk, 0.7);
        assert_eq!(etat_to_sample(Some(5)).status, SnowStatus::InProgress);
        assert_eq!(etat_to_sample(Some(10)).status, SnowStatus::Clear);
        assert_eq!(etat_to_sample(Some(99)).risk, 0.35);
        assert_eq!(etat_to_sample(None).risk, 0.3);
    }

    #[test]
    fn feed_ids_accept_strings_and_numbers() {
        assert_eq!(value_to_id(&Value::from("204")), Some("204".to_string()));
        assert_eq!(value_to_id(&Value::from(204)), Some("204".to_string()));
        assert_eq!(value_to_id(&Value::Null), None);
        assert_eq!(value_to_i64(&Value::from("15")), Some(15));
        assert_eq!(value_to_i64(&Value::from(15)), Some(15));
    }

    #[test]
    fn planif_feed_parses() {
        let payload = serde_json::json!({
            "planifications": [
                {"cote_rue_id": 104002, "etat_deneig": 1, "munid": 50},
                {"cote_rue_id": "104003", "etat_deneig": 5}
            ]
        });
        let feed: PlanifFeed = serde_json::from_value(payload).unwrap();
        assert_eq!(feed.planifications.len(), 2);
        assert_eq!(feed.planifications[1].etat_deneig, Some(5));
    }
}
