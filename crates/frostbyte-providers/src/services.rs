//! Live-or-fixed collaborator selection.
//!
//! Each external dependency is an enum with a live HTTP variant and a
//! fixed variant, chosen once at construction time. Plain match dispatch,
//! no trait objects.

use async_trait::async_trait;
use frostbyte_core::{
    EnrichmentError, GeoPoint, RouteAlternative, ShelterLookup, ShelterSample, SnowLookup,
    SnowSample, WindVector,
};

use crate::buildings::OverpassShelter;
use crate::error::ProviderError;
use crate::mock::{FixedRouting, FixedShelter, FixedSnow, FixedWind};
use crate::routing::OrsRouting;
use crate::snow::PlanifNeigeSnow;
use crate::wind::OpenMeteoWind;

pub enum RoutingService {
    Ors(OrsRouting),
    Fixed(FixedRouting),
}

impl RoutingService {
    pub async fn alternatives(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<RouteAlternative>, ProviderError> {
        match self {
            Self::Ors(client) => client.alternatives(start, end).await,
            Self::Fixed(fixed) => Ok(fixed.alternatives(start, end)),
        }
    }
}

pub enum WindService {
    OpenMeteo(OpenMeteoWind),
    Fixed(FixedWind),
}

impl WindService {
    pub async fn wind_at(&self, lat: f64, lon: f64) -> Result<WindVector, ProviderError> {
        match self {
            Self::OpenMeteo(client) => client.wind_at(lat, lon).await,
            Self::Fixed(fixed) => Ok(fixed.vector),
        }
    }
}

pub enum ShelterService {
    Overpass(OverpassShelter),
    Fixed(FixedShelter),
}

#[async_trait]
impl ShelterLookup for ShelterService {
    async fn shelter_at(&self, lat: f64, lon: f64) -> Result<ShelterSample, EnrichmentError> {
        match self {
            Self::Overpass(client) => client.shelter_at(lat, lon).await,
            Self::Fixed(fixed) => fixed.shelter_at(lat, lon).await,
        }
    }
}

pub enum SnowService {
    Planif(PlanifNeigeSnow),
    Fixed(FixedSnow),
}

#[async_trait]
impl SnowLookup for SnowService {
    async fn snow_at(&self, lat: f64, lon: f64) -> Result<SnowSample, EnrichmentError> {
        match self {
            Self::Planif(client) => client.snow_at(lat, lon).await,
            Self::Fixed(fixed) => fixed.snow_at(lat, lon).await,
        }
    }
}
