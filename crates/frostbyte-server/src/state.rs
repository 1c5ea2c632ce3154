//! Shared application state: the scorer plus the constructed collaborator
//! services.

use frostbyte_core::{RouteScorer, SamplingOptions};
use frostbyte_providers::{
    FixedRouting, FixedShelter, FixedSnow, FixedWind, GeminiExplainer, OpenMeteoWind, OrsRouting,
    OverpassShelter, PlanifNeigeSnow, RoutingService, ShelterService, SnowService, WindService,
};

use crate::config::Config;

pub struct AppState {
    pub scorer: RouteScorer,
    pub sampling: SamplingOptions,
    pub routing: RoutingService,
    pub wind: WindService,
    pub shelter: ShelterService,
    pub snow: SnowService,
    pub explainer: GeminiExplainer,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        if config.offline_mode {
            tracing::info!("offline mode: using fixed providers");
            return Self::offline(config);
        }

        Self {
            scorer: RouteScorer::new(config.weights),
            sampling: SamplingOptions {
                interval_m: config.sample_interval_m,
                snow_stride: config.snow_stride,
            },
            routing: RoutingService::Ors(OrsRouting::new(
                &config.ors_base_url,
                &config.ors_api_key,
            )),
            wind: WindService::OpenMeteo(OpenMeteoWind::new(&config.open_meteo_url)),
            shelter: ShelterService::Overpass(OverpassShelter::new(
                &config.overpass_url,
                config.shelter_radius_m,
                config.cache_grid_deg,
                config.cache_max_entries,
            )),
            snow: SnowService::Planif(PlanifNeigeSnow::new(
                &config.planif_url,
                &config.geomap_url,
                &config.nominatim_url,
                config.cache_grid_deg,
                config.cache_max_entries,
            )),
            explainer: GeminiExplainer::new(&config.gemini_url, config.gemini_api_key.clone()),
        }
    }

    /// Fixed providers only; deterministic and network-free.
    pub fn offline(config: &Config) -> Self {
        Self {
            scorer: RouteScorer::new(config.weights),
            sampling: SamplingOptions {
                interval_m: config.sample_interval_m,
                snow_stride: config.snow_stride,
            },
            routing: RoutingService::Fixed(FixedRouting),
            wind: WindService::Fixed(FixedWind::default()),
            shelter: ShelterService::Fixed(FixedShelter::default()),
            snow: SnowService::Fixed(FixedSnow::default()),
            explainer: GeminiExplainer::new(&config.gemini_url, None),
        }
    }
}
