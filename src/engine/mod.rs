//! Boundary to the imperative map engine
//!
//! Everything in this crate talks to the engine through [`MapEngine`]. The
//! trait mirrors the small set of primitives the reconciler needs: construct,
//! subscribe/unsubscribe, and look up / add / patch sources and layers by id.

pub mod headless;

pub use headless::{EngineStats, HeadlessContainer, HeadlessEngine};

use crate::core::config::MapViewOptions;
use crate::core::geo::{LatLng, LatLngBounds};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// Token returned by [`MapEngine::on`], used to detach that exact listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Payload the engine attaches to a dispatched event
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub name: String,
    pub lng_lat: Option<LatLng>,
    pub data: Value,
}

impl EngineEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lng_lat: None,
            data: Value::Null,
        }
    }

    pub fn at(mut self, lng_lat: LatLng) -> Self {
        self.lng_lat = Some(lng_lat);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Listener closure installed on an engine. The engine passes itself on dispatch.
pub type Listener<E> = Rc<dyn Fn(&E, Option<&EngineEvent>)>;

/// Boxes a closure as a [`Listener`]
pub fn listener<E, F>(f: F) -> Listener<E>
where
    F: Fn(&E, Option<&EngineEvent>) + 'static,
{
    Rc::new(f)
}

/// `addSource` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    #[serde(rename = "type")]
    pub source_type: String,
    pub data: Value,
}

/// `addLayer` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub source: String,
    pub paint: Value,
    pub layout: Value,
}

/// A source object living inside the engine
pub trait EngineSource {
    fn source_type(&self) -> &str;

    fn data(&self) -> &Value;

    /// Replaces the source's data payload in place
    fn set_data(&mut self, data: Value);
}

/// The imperative map engine this crate keeps in sync
pub trait MapEngine: Sized + 'static {
    /// Whatever the engine renders into (a DOM node, a window, a surface id)
    type Container;
    type Source: EngineSource;

    /// Builds one engine instance. Failure is fatal for the owning view.
    fn construct(container: Self::Container, options: &MapViewOptions) -> Result<Self>;

    fn on(&mut self, event: &str, listener: Listener<Self>) -> ListenerId;

    /// Like [`MapEngine::on`], but the listener is dropped after its first dispatch
    fn once(&mut self, event: &str, listener: Listener<Self>) -> ListenerId;

    /// Returns false when no such listener was attached
    fn off(&mut self, event: &str, id: ListenerId) -> bool;

    fn get_source(&self, id: &str) -> Option<&Self::Source>;

    fn get_source_mut(&mut self, id: &str) -> Option<&mut Self::Source>;

    fn add_source(&mut self, id: &str, spec: SourceSpec) -> Result<()>;

    fn get_layer(&self, id: &str) -> Option<&LayerSpec>;

    fn add_layer(&mut self, spec: LayerSpec) -> Result<()>;

    fn center(&self) -> LatLng;

    fn bounds(&self) -> LatLngBounds;
}
