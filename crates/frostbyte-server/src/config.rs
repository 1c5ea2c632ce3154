//! Server configuration from environment.

use frostbyte_core::ScoreWeights;
use frostbyte_providers::{
    DEFAULT_GEMINI_URL, DEFAULT_GEOMAP_URL, DEFAULT_GRID_DEG, DEFAULT_MAX_ENTRIES,
    DEFAULT_NOMINATIM_URL, DEFAULT_OPEN_METEO_URL, DEFAULT_ORS_BASE_URL, DEFAULT_OVERPASS_URL,
    DEFAULT_PLANIF_URL, DEFAULT_RADIUS_M,
};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Serve canned providers instead of live HTTP collaborators.
    pub offline_mode: bool,

    pub ors_base_url: String,
    pub ors_api_key: String,
    pub open_meteo_url: String,
    pub overpass_url: String,
    pub nominatim_url: String,
    pub planif_url: String,
    pub geomap_url: String,
    pub gemini_url: String,
    pub gemini_api_key: Option<String>,

    pub sample_interval_m: f64,
    pub snow_stride: usize,
    pub weights: ScoreWeights,
    pub shelter_radius_m: u32,
    pub cache_grid_deg: f64,
    pub cache_max_entries: usize,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_or_else(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = ScoreWeights::default();
        Self {
            server_port: env_or("FROSTBYTE_PORT", 8000),
            offline_mode: env_or("FROSTBYTE_OFFLINE", false),

            ors_base_url: env_or_else("ORS_BASE_URL", DEFAULT_ORS_BASE_URL),
            ors_api_key: env::var("ORS_API_KEY").unwrap_or_default(),
            open_meteo_url: env_or_else("OPEN_METEO_URL", DEFAULT_OPEN_METEO_URL),
            overpass_url: env_or_else("OVERPASS_URL", DEFAULT_OVERPASS_URL),
            nominatim_url: env_or_else("NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            planif_url: env_or_else("PLANIF_URL", DEFAULT_PLANIF_URL),
            geomap_url: env_or_else("GEOMAP_URL", DEFAULT_GEOMAP_URL),
            gemini_url: env_or_else("GEMINI_BASE_URL", DEFAULT_GEMINI_URL),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),

            sample_interval_m: env_or("FROSTBYTE_SAMPLE_INTERVAL_M", 40.0),
            snow_stride: env_or("FROSTBYTE_SNOW_STRIDE", 20),
            weights: ScoreWeights {
                distance: env_or("FROSTBYTE_WEIGHT_DISTANCE", defaults.distance),
                wind: env_or("FROSTBYTE_WEIGHT_WIND", defaults.wind),
                snow: env_or("FROSTBYTE_WEIGHT_SNOW", defaults.snow),
            },
            shelter_radius_m: env_or("FROSTBYTE_SHELTER_RADIUS_M", DEFAULT_RADIUS_M),
            cache_grid_deg: env_or("FROSTBYTE_CACHE_GRID_DEG", DEFAULT_GRID_DEG),
            cache_max_entries: env_or("FROSTBYTE_CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
        }
    }
}
