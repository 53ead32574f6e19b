//! Prelude module for common mapsync types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapsync::prelude::*;`

pub use crate::core::{
    config::{MapViewOptions, MapViewProfile, PhotoSearchConfig},
    context::{FeatureContext, MapHandle},
    geo::{LatLng, LatLngBounds},
    lifecycle::{LifecycleState, MapView, RenderReport},
};

pub use crate::engine::{
    listener, EngineEvent, EngineSource, HeadlessContainer, HeadlessEngine, ListenerId, MapEngine,
};

pub use crate::input::handler::{handler, EventBindingSet, Handler, HandlerArgs, HandlerProps};

pub use crate::layers::{
    base::{FeatureDescriptor, LayerDescriptor, ReconcileOutcome, SourceDescriptor},
    layer::LayerReconciler,
    manager::FeatureManager,
    source::SourceReconciler,
};

pub use crate::data::{
    geojson::{circle_polygon, markers_feature_collection, FeatureCollection, GeoJsonFeature},
    search::search_radius_km,
};

pub use crate::photos::{PhotoAggregator, PhotoMarker, PhotoProvider, PhotoQuery, ProviderPhoto};

pub use crate::{Error as MapError, Result};

pub use std::{cell::RefCell, rc::Rc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
