use crate::{
    engine::{listener, EngineEvent, Listener, ListenerId, MapEngine},
    input::events::{event_table, lookup_semantic, EventBinding},
    prelude::HashMap,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// What a handler receives when its engine event fires
pub enum HandlerArgs<'a, E> {
    /// The engine supplied an event payload
    Event { map: &'a E, event: &'a EngineEvent },
    /// The engine fired without a payload
    Bare,
}

/// Caller-supplied callback for one semantic handler name
pub type Handler<E> = Rc<dyn Fn(HandlerArgs<'_, E>)>;

/// Wraps a closure as a [`Handler`]
pub fn handler<E, F>(f: F) -> Handler<E>
where
    F: Fn(HandlerArgs<'_, E>) + 'static,
{
    Rc::new(f)
}

/// The handler half of a view's props: semantic name -> maybe-present callable
pub struct HandlerProps<E> {
    handlers: HashMap<String, Handler<E>>,
}

impl<E> HandlerProps<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::default(),
        }
    }

    /// Builder-style registration, e.g. `.on("onMoveEnd", |args| ..)`
    pub fn on<F>(mut self, semantic_name: &str, f: F) -> Self
    where
        F: Fn(HandlerArgs<'_, E>) + 'static,
    {
        self.set(semantic_name, Some(Rc::new(f)));
        self
    }

    /// Sets or clears the handler stored under `semantic_name`.
    ///
    /// Names outside the event table are a configuration error: debug builds
    /// panic, release builds log and ignore them.
    pub fn set(&mut self, semantic_name: &str, handler: Option<Handler<E>>) {
        let known = lookup_semantic(semantic_name).is_some();
        debug_assert!(known, "unknown map handler name '{}'", semantic_name);
        if !known {
            log::warn!("ignoring unknown map handler name '{}'", semantic_name);
            return;
        }
        match handler {
            Some(handler) => {
                self.handlers.insert(semantic_name.to_string(), handler);
            }
            None => {
                self.handlers.remove(semantic_name);
            }
        }
    }

    pub fn get(&self, semantic_name: &str) -> Option<&Handler<E>> {
        self.handlers.get(semantic_name)
    }

    pub fn contains(&self, semantic_name: &str) -> bool {
        self.handlers.contains_key(semantic_name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for HandlerProps<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for HandlerProps<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

/// Table rows whose semantic name has a handler in `props`, in table order
pub fn provided_set<E>(props: &HandlerProps<E>) -> Vec<EventBinding> {
    event_table()
        .iter()
        .filter(|b| props.contains(&b.semantic_name))
        .cloned()
        .collect()
}

/// Bindings to attach and detach to move from `previous` to `next`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingDiff {
    pub added: Vec<EventBinding>,
    pub removed: Vec<EventBinding>,
}

impl BindingDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Structural diff of two binding sets
pub fn diff(previous: &[EventBinding], next: &[EventBinding]) -> BindingDiff {
    if previous == next {
        return BindingDiff::default();
    }
    BindingDiff {
        added: next
            .iter()
            .filter(|b| !previous.contains(b))
            .cloned()
            .collect(),
        removed: previous
            .iter()
            .filter(|b| !next.contains(b))
            .cloned()
            .collect(),
    }
}

/// The engine listeners one view has installed for its handler props.
///
/// Each listener looks its handler up by semantic name at dispatch time, so
/// replacing a closure without changing the provided set costs no engine calls.
pub struct EventBindingSet<E> {
    installed: Vec<(EventBinding, ListenerId)>,
    handlers: Rc<RefCell<HandlerProps<E>>>,
}

impl<E: MapEngine> EventBindingSet<E> {
    pub fn new() -> Self {
        Self {
            installed: Vec::new(),
            handlers: Rc::new(RefCell::new(HandlerProps::new())),
        }
    }

    /// Currently installed bindings, in table order
    pub fn installed(&self) -> Vec<EventBinding> {
        self.installed.iter().map(|(b, _)| b.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    /// Converges the engine's listeners onto the handlers present in `props`
    pub fn sync(&mut self, engine: &mut E, props: &HandlerProps<E>) -> BindingDiff {
        *self.handlers.borrow_mut() = props.clone();

        let provided = provided_set(props);
        let delta = diff(&self.installed(), &provided);
        if delta.is_empty() {
            return delta;
        }

        for binding in &delta.removed {
            if let Some(pos) = self.installed.iter().position(|(b, _)| b == binding) {
                let (binding, id) = self.installed.remove(pos);
                engine.off(binding.engine_event, id);
            }
        }

        for binding in &delta.added {
            let id = engine.on(binding.engine_event, self.listener_for(binding));
            self.installed.push((binding.clone(), id));
        }
        self.installed
            .sort_by_key(|(b, _)| provided.iter().position(|p| p == b));

        log::debug!(
            "event bindings: +{} -{} ({} installed)",
            delta.added.len(),
            delta.removed.len(),
            self.installed.len()
        );
        delta
    }

    /// Detaches every installed listener; returns how many were detached
    pub fn detach_all(&mut self, engine: &mut E) -> usize {
        let count = self.installed.len();
        for (binding, id) in self.installed.drain(..) {
            engine.off(binding.engine_event, id);
        }
        self.handlers.borrow_mut().handlers.clear();
        count
    }

    /// Forgets the installed listeners without engine access and empties the
    /// handler map, so any listener left behind dispatches to nothing.
    /// Returns how many listeners were abandoned.
    pub fn disarm(&mut self) -> usize {
        let abandoned = self.installed.len();
        self.installed.clear();
        self.handlers.borrow_mut().handlers.clear();
        abandoned
    }

    fn listener_for(&self, binding: &EventBinding) -> Listener<E> {
        let handlers: Weak<RefCell<HandlerProps<E>>> = Rc::downgrade(&self.handlers);
        let semantic_name = binding.semantic_name.clone();

        listener(move |map: &E, event: Option<&EngineEvent>| {
            let Some(handlers) = handlers.upgrade() else {
                return;
            };
            let current = handlers.borrow().get(&semantic_name).cloned();
            if let Some(handler) = current {
                match event {
                    Some(event) => handler(HandlerArgs::Event { map, event }),
                    None => handler(HandlerArgs::Bare),
                }
            }
        })
    }
}

impl<E: MapEngine> Default for EventBindingSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapViewOptions;
    use crate::engine::{HeadlessContainer, HeadlessEngine};
    use std::cell::Cell;

    fn engine() -> HeadlessEngine {
        HeadlessEngine::construct(HeadlessContainer::new("map"), &MapViewOptions::default())
            .unwrap()
    }

    fn binding(engine_event: &str) -> EventBinding {
        event_table()
            .iter()
            .find(|b| b.engine_event == engine_event)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_provided_set_follows_table_order() {
        let props = HandlerProps::<HeadlessEngine>::new()
            .on("onMoveEnd", |_| {})
            .on("onClick", |_| {});

        let provided = provided_set(&props);
        assert_eq!(provided, vec![binding("click"), binding("moveend")]);
    }

    #[test]
    fn test_diff() {
        let previous = vec![binding("moveend")];
        let next = vec![binding("click"), binding("moveend")];

        let delta = diff(&previous, &next);
        assert_eq!(delta.added, vec![binding("click")]);
        assert!(delta.removed.is_empty());

        assert!(diff(&next, &next).is_empty());
        assert_eq!(diff(&next, &[]).removed.len(), 2);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut engine = engine();
        let mut bindings = EventBindingSet::new();
        let props = HandlerProps::<HeadlessEngine>::new().on("onMoveEnd", |_| {});

        bindings.sync(&mut engine, &props);
        let after_first = engine.stats();
        let delta = bindings.sync(&mut engine, &props.clone());

        assert!(delta.is_empty());
        assert_eq!(engine.stats(), after_first);
        assert_eq!(engine.listener_count("moveend"), 1);
    }

    #[test]
    fn test_listener_uses_latest_handler() {
        let mut engine = engine();
        let mut bindings = EventBindingSet::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&calls);
        bindings.sync(
            &mut engine,
            &HandlerProps::<HeadlessEngine>::new()
                .on("onClick", move |_| first.borrow_mut().push("first")),
        );
        let second = Rc::clone(&calls);
        bindings.sync(
            &mut engine,
            &HandlerProps::<HeadlessEngine>::new()
                .on("onClick", move |_| second.borrow_mut().push("second")),
        );

        engine.fire("click", Some(EngineEvent::new("click")));
        assert_eq!(*calls.borrow(), vec!["second"]);
        assert_eq!(engine.stats().on, 1);
    }

    #[test]
    fn test_handler_args() {
        let mut engine = engine();
        let mut bindings = EventBindingSet::new();
        let with_map = Rc::new(Cell::new(0));
        let bare = Rc::new(Cell::new(0));

        let (w, b) = (Rc::clone(&with_map), Rc::clone(&bare));
        let props = HandlerProps::<HeadlessEngine>::new().on("onResize", move |args| match args {
            HandlerArgs::Event { map, event } => {
                assert_eq!(event.name, "resize");
                assert_eq!(map.container().id, "map");
                w.set(w.get() + 1);
            }
            HandlerArgs::Bare => b.set(b.get() + 1),
        });
        bindings.sync(&mut engine, &props);

        engine.fire("resize", Some(EngineEvent::new("resize")));
        engine.fire("resize", None);
        assert_eq!((with_map.get(), bare.get()), (1, 1));
    }

    #[test]
    fn test_removed_handler_is_detached() {
        let mut engine = engine();
        let mut bindings = EventBindingSet::new();

        bindings.sync(
            &mut engine,
            &HandlerProps::<HeadlessEngine>::new()
                .on("onClick", |_| {})
                .on("onZoomEnd", |_| {}),
        );
        let delta = bindings.sync(
            &mut engine,
            &HandlerProps::<HeadlessEngine>::new().on("onZoomEnd", |_| {}),
        );

        assert_eq!(delta.removed, vec![binding("click")]);
        assert_eq!(engine.listener_count("click"), 0);
        assert_eq!(engine.listener_count("zoomend"), 1);
        assert_eq!(bindings.len(), 1);

        assert_eq!(bindings.detach_all(&mut engine), 1);
        assert_eq!(engine.total_listeners(), 0);
    }

    #[test]
    fn test_disarmed_listeners_are_inert() {
        let mut engine = engine();
        let mut bindings = EventBindingSet::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        bindings.sync(
            &mut engine,
            &HandlerProps::<HeadlessEngine>::new()
                .on("onClick", move |_| counter.set(counter.get() + 1)),
        );

        assert_eq!(bindings.disarm(), 1);
        assert!(bindings.is_empty());
        assert_eq!(engine.listener_count("click"), 1);
        engine.fire("click", None);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_clearing_a_handler() {
        let mut props = HandlerProps::<HeadlessEngine>::new().on("onClick", |_| {});
        props.set("onClick", None);
        assert!(props.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown map handler name")]
    fn test_unknown_handler_name_fails_fast() {
        let _ = HandlerProps::<HeadlessEngine>::new().on("onTeleport", |_| {});
    }
}
