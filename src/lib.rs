//! # mapsync
//!
//! Keeps an imperative, event-driven map engine in step with a declarative
//! description of the map.
//!
//! A [`MapView`] owns exactly one engine instance, binds semantic event
//! handlers (`onClick`, `onMoveEnd`, ...) to engine events, and publishes the
//! loaded instance through a [`FeatureContext`]. Declared sources and layers
//! are reconciled against that instance by [`SourceReconciler`],
//! [`LayerReconciler`], or a [`FeatureManager`] over a whole list of them.

pub mod core;
pub mod data;
pub mod engine;
pub mod input;
pub mod layers;
pub mod photos;
pub mod prelude;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{MapViewOptions, MapViewProfile, PhotoSearchConfig},
    context::{FeatureContext, MapHandle},
    geo::{LatLng, LatLngBounds},
    lifecycle::{LifecycleState, MapView, RenderReport},
};

pub use engine::{
    EngineEvent, EngineSource, HeadlessContainer, HeadlessEngine, LayerSpec, ListenerId,
    MapEngine, SourceSpec,
};

pub use input::{
    events::{event_table, EventBinding},
    handler::{handler, BindingDiff, EventBindingSet, Handler, HandlerArgs, HandlerProps},
};

pub use layers::{
    base::{FeatureDescriptor, FeatureKind, LayerDescriptor, ReconcileOutcome, SourceDescriptor},
    layer::LayerReconciler,
    manager::FeatureManager,
    source::SourceReconciler,
};

pub use data::geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry};

pub use photos::{PhotoAggregator, PhotoMarker, PhotoProvider, PhotoQuery, ProviderPhoto};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Engine construction failed: {0}")]
    EngineConstruction(String),

    #[error("Not retryable: {0}")]
    NotRetryable(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Photo provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger`, honouring `RUST_LOG`. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
