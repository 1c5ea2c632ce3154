//! Fixed collaborator implementations for tests and offline mode.
//!
//! Each live client has a `Fixed*` counterpart that answers instantly
//! with canned data, so the whole pipeline can run without network
//! access and with fully deterministic output.

use async_trait::async_trait;
use frostbyte_core::{
    geo, EnrichmentError, GeoPoint, RouteAlternative, ShelterLookup, ShelterSample, SnowLookup,
    SnowSample, SnowStatus, WindVector,
};

/// Canned shelter: a moderately built-up street.
#[derive(Debug, Clone)]
pub struct FixedShelter {
    pub sample: ShelterSample,
}

impl Default for FixedShelter {
    fn default() -> Self {
        Self {
            sample: ShelterSample {
                count: 10,
                avg_height_m: None,
                shelter_score: 0.6,
            },
        }
    }
}

#[async_trait]
impl ShelterLookup for FixedShelter {
    async fn shelter_at(&self, _lat: f64, _lon: f64) -> Result<ShelterSample, EnrichmentError> {
        Ok(self.sample)
    }
}

/// Canned snow: a freshly cleared street.
#[derive(Debug, Clone)]
pub struct FixedSnow {
    pub sample: SnowSample,
}

impl Default for FixedSnow {
    fn default() -> Self {
        Self {
            sample: SnowSample {
                status: SnowStatus::Cleared,
                risk: 0.1,
            },
        }
    }
}

#[async_trait]
impl SnowLookup for FixedSnow {
    async fn snow_at(&self, _lat: f64, _lon: f64) -> Result<SnowSample, EnrichmentError> {
        Ok(self.sample)
    }
}

/// Canned wind: a brisk westerly.
#[derive(Debug, Clone)]
pub struct FixedWind {
    pub vector: WindVector,
}

impl Default for FixedWind {
    fn default() -> Self {
        Self {
            vector: WindVector {
                speed_mps: 6.0,
                direction_deg: 270.0,
            },
        }
    }
}

/// Synthetic route alternatives: the direct line plus a dogleg through
/// an offset midpoint, at typical walking speed.
#[derive(Debug, Clone, Default)]
pub struct FixedRouting;

const WALKING_SPEED_MPS: f64 = 1.4;
const DOGLEG_OFFSET_DEG: f64 = 0.001;

impl FixedRouting {
    pub fn alternatives(&self, start: GeoPoint, end: GeoPoint) -> Vec<RouteAlternative> {
        let direct_distance = geo::haversine_distance(start, end);

        let via = GeoPoint::new(
            (start.lon + end.lon) / 2.0 + DOGLEG_OFFSET_DEG,
            (start.lat + end.lat) / 2.0 + DOGLEG_OFFSET_DEG,
        );
        let dogleg_distance =
            geo::haversine_distance(start, via) + geo::haversine_distance(via, end);

        vec![
            RouteAlternative {
                geometry: vec![start, end],
                distance_m: direct_distance,
                duration_s: direct_distance / WALKING_SPEED_MPS,
            },
            RouteAlternative {
                geometry: vec![start, via, end],
                distance_m: dogleg_distance,
                duration_s: dogleg_distance / WALKING_SPEED_MPS,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_routing_returns_two_alternatives() {
        let start = GeoPoint::new(-73.5673, 45.5017);
        let end = GeoPoint::new(-73.5540, 45.5120);
        let routes = FixedRouting.alternatives(start, end);

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].geometry, vec![start, end]);
        assert_eq!(routes[1].geometry.len(), 3);
        assert!(routes[1].distance_m > routes[0].distance_m);
        assert!(routes[0].duration_s > 0.0);
    }

    #[tokio::test]
    async fn fixed_enrichment_is_deterministic() {
        let shelter = FixedShelter::default();
        let snow = FixedSnow::default();

        let s = shelter.shelter_at(45.5, -73.56).await.unwrap();
        assert_eq!(s.shelter_score, 0.6);

        let n = snow.snow_at(45.5, -73.56).await.unwrap();
        assert_eq!(n.status, SnowStatus::Cleared);
        assert_eq!(n.risk, 0.1);
    }
}
