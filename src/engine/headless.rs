use crate::{
    core::{
        config::MapViewOptions,
        geo::{LatLng, LatLngBounds},
    },
    engine::{
        EngineEvent, EngineSource, LayerSpec, Listener, ListenerId, MapEngine, SourceSpec,
    },
    prelude::HashMap,
    MapError, Result,
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const STYLE_SCHEMES: [&str; 3] = ["mapbox://", "http://", "https://"];

/// Counters for every engine primitive the reconciler can trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub add_source: u64,
    pub set_data: u64,
    pub add_layer: u64,
    pub on: u64,
    pub off: u64,
    pub dispatched: u64,
}

/// Where a [`HeadlessEngine`] pretends to render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessContainer {
    pub id: String,
}

impl HeadlessContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// GeoJSON-like source held by the headless engine
#[derive(Debug)]
pub struct HeadlessSource {
    source_type: String,
    data: Value,
    stats: Rc<RefCell<EngineStats>>,
}

impl EngineSource for HeadlessSource {
    fn source_type(&self) -> &str {
        &self.source_type
    }

    fn data(&self) -> &Value {
        &self.data
    }

    fn set_data(&mut self, data: Value) {
        self.stats.borrow_mut().set_data += 1;
        self.data = data;
    }
}

struct Registration<E> {
    id: ListenerId,
    listener: Listener<E>,
    once: bool,
}

/// In-memory engine: keeps sources, layers and listeners, renders nothing.
///
/// Used by the demo application and by tests, where [`EngineStats`] makes
/// every imperative call observable.
pub struct HeadlessEngine {
    container: HeadlessContainer,
    style: String,
    center: Cell<LatLng>,
    zoom: Cell<f64>,
    bounds: Cell<LatLngBounds>,
    loaded: Cell<bool>,
    listeners: RefCell<HashMap<String, Vec<Registration<HeadlessEngine>>>>,
    next_listener_id: u64,
    sources: HashMap<String, HeadlessSource>,
    layers: Vec<LayerSpec>,
    stats: Rc<RefCell<EngineStats>>,
}

impl HeadlessEngine {
    pub fn container(&self) -> &HeadlessContainer {
        &self.container
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    pub fn stats(&self) -> EngineStats {
        *self.stats.borrow()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Fires `load` the first time it is called; later calls do nothing
    pub fn complete_load(&self) -> bool {
        if self.loaded.replace(true) {
            return false;
        }
        self.fire("load", Some(EngineEvent::new("load")));
        true
    }

    /// Moves the camera without emitting events. Pair with [`HeadlessEngine::fire`].
    ///
    /// Camera movement belongs to the engine (user gestures), so this needs no
    /// mutable access to the instance.
    pub fn jump_to(&self, center: LatLng, zoom: f64, bounds: LatLngBounds) {
        self.center.set(center);
        self.zoom.set(zoom);
        self.bounds.set(bounds);
    }

    /// Dispatches `event_name` to every listener attached for it, in attach order.
    /// Returns the number of listeners invoked.
    pub fn fire(&self, event_name: &str, event: Option<EngineEvent>) -> usize {
        let targets: Vec<Listener<Self>> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(registrations) = listeners.get_mut(event_name) else {
                return 0;
            };
            let targets = registrations
                .iter()
                .map(|r| Rc::clone(&r.listener))
                .collect();
            registrations.retain(|r| !r.once);
            targets
        };

        for listener in &targets {
            listener(self, event.as_ref());
        }
        self.stats.borrow_mut().dispatched += targets.len() as u64;
        targets.len()
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .borrow()
            .get(event_name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().values().map(Vec::len).sum()
    }

    pub fn source_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sources.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Layer ids in draw order
    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    fn register(&mut self, event: &str, listener: Listener<Self>, once: bool) -> ListenerId {
        self.next_listener_id += 1;
        let id = ListenerId(self.next_listener_id);
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, listener, once });
        self.stats.borrow_mut().on += 1;
        id
    }
}

impl MapEngine for HeadlessEngine {
    type Container = HeadlessContainer;
    type Source = HeadlessSource;

    fn construct(container: HeadlessContainer, options: &MapViewOptions) -> Result<Self> {
        if container.id.trim().is_empty() {
            return Err(MapError::EngineConstruction(
                "container is missing".to_string(),
            ));
        }
        if !STYLE_SCHEMES.iter().any(|s| options.style.starts_with(s)) {
            return Err(MapError::EngineConstruction(format!(
                "invalid style reference '{}'",
                options.style
            )));
        }

        let bounds = options
            .bounds
            .unwrap_or_else(|| LatLngBounds::new(options.center, options.center));
        let center = if options.bounds.is_some() {
            bounds.center()
        } else {
            options.center
        };

        log::debug!(
            "headless engine constructed in '{}' at ({:.4}, {:.4}) z{}",
            container.id,
            center.lat,
            center.lng,
            options.zoom
        );

        Ok(Self {
            container,
            style: options.style.clone(),
            center: Cell::new(center),
            zoom: Cell::new(options.zoom),
            bounds: Cell::new(bounds),
            loaded: Cell::new(false),
            listeners: RefCell::new(HashMap::default()),
            next_listener_id: 0,
            sources: HashMap::default(),
            layers: Vec::new(),
            stats: Rc::new(RefCell::new(EngineStats::default())),
        })
    }

    fn on(&mut self, event: &str, listener: Listener<Self>) -> ListenerId {
        self.register(event, listener, false)
    }

    fn once(&mut self, event: &str, listener: Listener<Self>) -> ListenerId {
        self.register(event, listener, true)
    }

    fn off(&mut self, event: &str, id: ListenerId) -> bool {
        self.stats.borrow_mut().off += 1;
        let mut listeners = self.listeners.borrow_mut();
        let Some(registrations) = listeners.get_mut(event) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        before != registrations.len()
    }

    fn get_source(&self, id: &str) -> Option<&HeadlessSource> {
        self.sources.get(id)
    }

    fn get_source_mut(&mut self, id: &str) -> Option<&mut HeadlessSource> {
        self.sources.get_mut(id)
    }

    fn add_source(&mut self, id: &str, spec: SourceSpec) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(MapError::Engine(format!(
                "there is already a source with id '{}'",
                id
            )));
        }
        self.stats.borrow_mut().add_source += 1;
        self.sources.insert(
            id.to_string(),
            HeadlessSource {
                source_type: spec.source_type,
                data: spec.data,
                stats: Rc::clone(&self.stats),
            },
        );
        Ok(())
    }

    fn get_layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn add_layer(&mut self, spec: LayerSpec) -> Result<()> {
        if self.get_layer(&spec.id).is_some() {
            return Err(MapError::Engine(format!(
                "there is already a layer with id '{}'",
                spec.id
            )));
        }
        if !self.sources.contains_key(&spec.source) {
            return Err(MapError::Engine(format!(
                "layer '{}' references missing source '{}'",
                spec.id, spec.source
            )));
        }
        self.stats.borrow_mut().add_layer += 1;
        self.layers.push(spec);
        Ok(())
    }

    fn center(&self) -> LatLng {
        self.center.get()
    }

    fn bounds(&self) -> LatLngBounds {
        self.bounds.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::listener;
    use serde_json::json;

    fn engine() -> HeadlessEngine {
        HeadlessEngine::construct(HeadlessContainer::new("map"), &MapViewOptions::default())
            .unwrap()
    }

    #[test]
    fn test_construct_failures() {
        let missing =
            HeadlessEngine::construct(HeadlessContainer::default(), &MapViewOptions::default());
        assert!(matches!(missing, Err(MapError::EngineConstruction(_))));

        let options = MapViewOptions {
            style: "streets".to_string(),
            ..MapViewOptions::default()
        };
        let bad_style = HeadlessEngine::construct(HeadlessContainer::new("map"), &options);
        assert!(matches!(bad_style, Err(MapError::EngineConstruction(_))));
    }

    #[test]
    fn test_on_off_and_dispatch() {
        let mut engine = engine();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = engine.on("click", listener(move |_, _| counter.set(counter.get() + 1)));

        assert_eq!(engine.fire("click", None), 1);
        assert_eq!(hits.get(), 1);

        assert!(engine.off("click", id));
        assert!(!engine.off("click", id));
        assert_eq!(engine.fire("click", None), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(engine.total_listeners(), 0);
    }

    #[test]
    fn test_once_and_load() {
        let mut engine = engine();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        engine.once("load", listener(move |_, _| counter.set(counter.get() + 1)));

        assert!(engine.complete_load());
        assert!(!engine.complete_load());
        assert_eq!(hits.get(), 1);
        assert_eq!(engine.listener_count("load"), 0);
    }

    #[test]
    fn test_sources_and_layers() {
        let mut engine = engine();
        let spec = SourceSpec {
            source_type: "geojson".to_string(),
            data: json!({"type": "FeatureCollection", "features": []}),
        };
        engine.add_source("images", spec.clone()).unwrap();
        assert!(engine.add_source("images", spec).is_err());

        engine.get_source_mut("images").unwrap().set_data(json!(null));
        assert_eq!(engine.get_source("images").unwrap().data(), &json!(null));

        let layer = LayerSpec {
            id: "images-symbols".to_string(),
            layer_type: "symbol".to_string(),
            source: "missing".to_string(),
            paint: json!({}),
            layout: json!({}),
        };
        assert!(engine.add_layer(layer.clone()).is_err());
        engine
            .add_layer(LayerSpec {
                source: "images".to_string(),
                ..layer
            })
            .unwrap();

        let stats = engine.stats();
        assert_eq!(stats.add_source, 1);
        assert_eq!(stats.set_data, 1);
        assert_eq!(stats.add_layer, 1);
        assert_eq!(engine.layer_ids(), vec!["images-symbols".to_string()]);
    }
}
