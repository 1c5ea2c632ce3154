//! HTTP collaborator clients for the route comfort scorer.
//!
//! Routing alternatives (OpenRouteService), ambient wind (Open-Meteo),
//! building-density shelter (Overpass), snow-clearing status (Montréal
//! planif-neige via Nominatim) and natural-language explanations
//! (Gemini). Every client has a fixed offline counterpart in [`mock`];
//! [`services`] selects between them at construction time.

pub mod buildings;
pub mod cache;
pub mod error;
pub mod explain;
pub mod mock;
pub mod routing;
pub mod services;
pub mod snow;
pub mod wind;

pub use buildings::{OverpassShelter, DEFAULT_OVERPASS_URL, DEFAULT_RADIUS_M};
pub use cache::{GridCache, GridKey, DEFAULT_GRID_DEG, DEFAULT_MAX_ENTRIES};
pub use error::ProviderError;
pub use explain::{Explanation, GeminiExplainer, DEFAULT_GEMINI_URL};
pub use mock::{FixedRouting, FixedShelter, FixedSnow, FixedWind};
pub use routing::{OrsRouting, DEFAULT_ORS_BASE_URL};
pub use services::{RoutingService, ShelterService, SnowService, WindService};
pub use snow::{
    PlanifNeigeSnow, DEFAULT_GEOMAP_URL, DEFAULT_NOMINATIM_URL, DEFAULT_PLANIF_URL,
};
pub use wind::{OpenMeteoWind, DEFAULT_OPEN_METEO_URL};
