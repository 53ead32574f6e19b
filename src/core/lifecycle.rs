//! Lifecycle of the one engine instance behind a map view
//!
//! A [`MapView`] constructs its engine exactly once, waits for the engine's
//! first `load`, and only then hands the instance to feature reconcilers
//! through its [`FeatureContext`]. Re-renders never replace the instance.

use crate::{
    core::{
        config::MapViewOptions,
        constants::LOAD_EVENT,
        context::{FeatureContext, MapHandle},
    },
    engine::{listener, ListenerId, MapEngine},
    input::handler::{BindingDiff, EventBindingSet, HandlerProps},
    MapError, Result,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Destroyed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::Initializing => write!(f, "initializing"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Result of one render pass over a view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub bindings: BindingDiff,
    pub children_rendered: bool,
}

/// Owns one engine instance for the lifetime of a mounted view
pub struct MapView<E: MapEngine> {
    options: MapViewOptions,
    state: Rc<Cell<LifecycleState>>,
    instance: Option<MapHandle<E>>,
    context: FeatureContext<E>,
    bindings: EventBindingSet<E>,
    load_listener: Option<ListenerId>,
    construction_failed: bool,
}

impl<E: MapEngine> MapView<E> {
    pub fn new(options: MapViewOptions) -> Self {
        Self {
            options,
            state: Rc::new(Cell::new(LifecycleState::Uninitialized)),
            instance: None,
            context: FeatureContext::new(),
            bindings: EventBindingSet::new(),
            load_listener: None,
            construction_failed: false,
        }
    }

    pub fn options(&self) -> &MapViewOptions {
        &self.options
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    /// The feature context, withheld until the engine has loaded
    pub fn context(&self) -> Option<&FeatureContext<E>> {
        self.is_ready().then_some(&self.context)
    }

    /// Constructs the engine instance. Later calls on a mounted view are no-ops.
    ///
    /// A construction failure is fatal: the view stays `Initializing`, never
    /// publishes, and refuses further mount attempts.
    pub fn mount(&mut self, container: E::Container) -> Result<()> {
        match self.state() {
            LifecycleState::Uninitialized => {}
            LifecycleState::Initializing if self.construction_failed => {
                return Err(MapError::NotRetryable(
                    "engine construction already failed for this view".to_string(),
                ));
            }
            LifecycleState::Destroyed => {
                return Err(MapError::NotRetryable(
                    "view has been unmounted".to_string(),
                ));
            }
            LifecycleState::Initializing | LifecycleState::Ready => {
                log::debug!("mount ignored, view is already {}", self.state());
                return Ok(());
            }
        }

        self.state.set(LifecycleState::Initializing);
        let engine = match E::construct(container, &self.options) {
            Ok(engine) => engine,
            Err(e) => {
                self.construction_failed = true;
                log::error!("map engine construction failed: {}", e);
                return Err(match e {
                    MapError::EngineConstruction(_) => e,
                    other => MapError::EngineConstruction(other.to_string()),
                });
            }
        };

        let handle: MapHandle<E> = Rc::new(RefCell::new(engine));
        let state = Rc::clone(&self.state);
        let context = self.context.clone();
        let weak = Rc::downgrade(&handle);

        let id = handle.borrow_mut().once(
            LOAD_EVENT,
            listener(move |_: &E, _| {
                if state.get() != LifecycleState::Initializing {
                    return;
                }
                if let Some(instance) = weak.upgrade() {
                    state.set(LifecycleState::Ready);
                    context.publish(&instance);
                    log::info!("map engine loaded, features can attach");
                }
            }),
        );

        self.load_listener = Some(id);
        self.instance = Some(handle);
        Ok(())
    }

    /// Re-diffs event bindings against `props`, then renders `children` if the
    /// engine has loaded. Before mount this does nothing.
    pub fn render<F>(&mut self, props: &HandlerProps<E>, children: F) -> Result<RenderReport>
    where
        F: FnOnce(&FeatureContext<E>),
    {
        let Some(instance) = &self.instance else {
            return Ok(RenderReport::default());
        };

        let bindings = {
            let mut engine = instance.try_borrow_mut().map_err(|_| {
                MapError::Engine("engine instance is busy, render must not re-enter".to_string())
            })?;
            self.bindings.sync(&mut *engine, props)
        };

        let children_rendered = self.is_ready();
        if children_rendered {
            children(&self.context);
        }

        Ok(RenderReport {
            bindings,
            children_rendered,
        })
    }

    /// Read-only access to the engine instance for the embedding application
    pub fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> Option<R> {
        let instance = self.instance.as_ref()?;
        let engine = instance.try_borrow().ok()?;
        Some(f(&engine))
    }

    /// Number of engine listeners installed for handler props
    pub fn installed_bindings(&self) -> usize {
        self.bindings.len()
    }

    /// Detaches every listener this view installed and gives the engine
    /// instance back for engine-level teardown.
    pub fn unmount(&mut self) -> Option<E> {
        let was_ready = self.is_ready();
        self.state.set(LifecycleState::Destroyed);
        self.context.clear();

        let instance = self.instance.take()?;
        match instance.try_borrow_mut() {
            Ok(mut engine) => {
                let detached = self.bindings.detach_all(&mut *engine);
                if let Some(id) = self.load_listener.take() {
                    if !was_ready {
                        engine.off(LOAD_EVENT, id);
                    }
                }
                log::debug!("map view unmounted, {} listeners detached", detached);
            }
            Err(_) => {
                let abandoned = self.bindings.disarm();
                log::error!(
                    "engine busy during unmount, {} listeners disarmed instead of detached",
                    abandoned
                );
            }
        }

        match Rc::try_unwrap(instance) {
            Ok(cell) => Some(cell.into_inner()),
            Err(_) => {
                log::warn!("engine instance still referenced after unmount");
                None
            }
        }
    }
}

impl<E: MapEngine> Drop for MapView<E> {
    fn drop(&mut self) {
        if self.instance.is_some() {
            let _ = self.unmount();
        }
    }
}
