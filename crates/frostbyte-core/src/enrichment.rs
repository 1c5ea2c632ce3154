//! Interfaces to the shelter and snow enrichment collaborators.
//!
//! The engine never performs I/O itself; providers implement these traits
//! and are injected into the scoring pipeline. Both live HTTP clients and
//! fixed test doubles exist, selected at construction time.

use async_trait::async_trait;

use crate::error::EnrichmentError;
use crate::models::{ShelterSample, SnowSample};

/// Building-density shelter lookup, keyed by (lat, lon).
#[async_trait]
pub trait ShelterLookup: Send + Sync {
    async fn shelter_at(&self, lat: f64, lon: f64) -> Result<ShelterSample, EnrichmentError>;
}

/// Snow-risk lookup, keyed by (lat, lon).
#[async_trait]
pub trait SnowLookup: Send + Sync {
    async fn snow_at(&self, lat: f64, lon: f64) -> Result<SnowSample, EnrichmentError>;
}
