use crate::{
    core::context::FeatureContext,
    engine::MapEngine,
    layers::base::{LayerDescriptor, ReconcileOutcome},
    MapError, Result,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Create-if-absent of one layer inside `engine`.
///
/// An existing layer is never removed and re-added, since that loses its draw
/// order and flickers. Its paint and layout are left as created; the outcome
/// reports whether the declaration has drifted from them.
pub fn upsert_layer<E: MapEngine>(
    engine: &mut E,
    descriptor: &LayerDescriptor,
) -> Result<ReconcileOutcome> {
    match engine.get_layer(&descriptor.id) {
        None => {
            engine.add_layer(descriptor.to_spec())?;
            log::debug!(
                "layer '{}' ({}) created on source '{}'",
                descriptor.id,
                descriptor.layer_type,
                descriptor.source
            );
            Ok(ReconcileOutcome::Created)
        }
        Some(existing) if existing.layer_type != descriptor.layer_type => {
            let reason = format!(
                "layer '{}' already exists with type '{}', declared '{}'",
                descriptor.id, existing.layer_type, descriptor.layer_type
            );
            log::warn!("{}", reason);
            Ok(ReconcileOutcome::Rejected { reason })
        }
        Some(existing) => {
            let style_pending = existing.paint != descriptor.paint
                || existing.layout != descriptor.layout
                || existing.source != descriptor.source;
            if style_pending {
                log::debug!(
                    "layer '{}' keeps its original paint/layout, declared changes not applied",
                    descriptor.id
                );
            }
            Ok(ReconcileOutcome::Retained { style_pending })
        }
    }
}

/// Keeps one declared layer present across renders.
///
/// A declaration whose paint/layout drifted from the engine keeps reporting
/// `Retained { style_pending: true }` on every render, never `Unchanged`.
pub struct LayerReconciler<E> {
    applied: Option<LayerDescriptor>,
    applied_to: Weak<RefCell<E>>,
    style_pending: bool,
}

impl<E: MapEngine> LayerReconciler<E> {
    pub fn new() -> Self {
        Self {
            applied: None,
            applied_to: Weak::new(),
            style_pending: false,
        }
    }

    /// The last declaration that was created or retained
    pub fn applied(&self) -> Option<&LayerDescriptor> {
        self.applied.as_ref()
    }

    pub fn reconcile(
        &mut self,
        context: &FeatureContext<E>,
        descriptor: &LayerDescriptor,
    ) -> Result<ReconcileOutcome> {
        let Some(instance) = context.current() else {
            return Ok(ReconcileOutcome::Detached);
        };
        let current = Rc::downgrade(&instance);
        if !self.applied_to.ptr_eq(&current) {
            self.applied = None;
            self.style_pending = false;
            self.applied_to = current;
        }
        if !self.style_pending && self.applied.as_ref() == Some(descriptor) {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let outcome = {
            let mut engine = instance.try_borrow_mut().map_err(|_| {
                MapError::Engine(format!(
                    "engine busy while reconciling layer '{}'",
                    descriptor.id
                ))
            })?;
            upsert_layer(&mut *engine, descriptor)?
        };

        match outcome {
            ReconcileOutcome::Rejected { .. } => {}
            ReconcileOutcome::Retained { style_pending } => {
                self.style_pending = style_pending;
                self.applied = Some(descriptor.clone());
            }
            _ => {
                self.style_pending = false;
                self.applied = Some(descriptor.clone());
            }
        }
        Ok(outcome)
    }
}

impl<E: MapEngine> Default for LayerReconciler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapViewOptions;
    use crate::core::context::MapHandle;
    use crate::engine::{HeadlessContainer, HeadlessEngine, SourceSpec};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn published_with_source() -> (MapHandle<HeadlessEngine>, FeatureContext<HeadlessEngine>) {
        let mut engine =
            HeadlessEngine::construct(HeadlessContainer::new("map"), &MapViewOptions::default())
                .unwrap();
        engine
            .add_source(
                "circle",
                SourceSpec {
                    source_type: "geojson".to_string(),
                    data: json!(null),
                },
            )
            .unwrap();
        let handle = Rc::new(RefCell::new(engine));
        let context = FeatureContext::new();
        context.publish(&handle);
        (handle, context)
    }

    fn fill(opacity: f64) -> LayerDescriptor {
        LayerDescriptor::new("circle-fill", "fill", "circle")
            .with_paint(json!({"fill-color": "#088", "fill-opacity": opacity}))
    }

    #[test]
    fn test_created_once_then_retained() {
        let (handle, context) = published_with_source();
        let mut layer = LayerReconciler::new();

        assert_eq!(layer.reconcile(&context, &fill(0.8)).unwrap(), ReconcileOutcome::Created);
        assert_eq!(layer.reconcile(&context, &fill(0.8)).unwrap(), ReconcileOutcome::Unchanged);
        for _ in 0..2 {
            assert_eq!(
                layer.reconcile(&context, &fill(0.5)).unwrap(),
                ReconcileOutcome::Retained {
                    style_pending: true
                }
            );
        }
        // back to what the engine holds
        assert_eq!(
            layer.reconcile(&context, &fill(0.8)).unwrap(),
            ReconcileOutcome::Retained {
                style_pending: false
            }
        );
        assert_eq!(layer.reconcile(&context, &fill(0.8)).unwrap(), ReconcileOutcome::Unchanged);

        let engine = handle.borrow();
        assert_eq!(engine.stats().add_layer, 1);
        assert_eq!(engine.get_layer("circle-fill").unwrap().paint["fill-opacity"], 0.8);
    }

    #[test]
    fn test_fresh_reconciler_retains_existing_layer() {
        let (_handle, context) = published_with_source();
        LayerReconciler::new().reconcile(&context, &fill(0.8)).unwrap();

        let outcome = LayerReconciler::new().reconcile(&context, &fill(0.8)).unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Retained {
                style_pending: false
            }
        );
    }

    #[test]
    fn test_new_instance_gets_the_layer() {
        let (_first, first_context) = published_with_source();
        let mut layer = LayerReconciler::new();
        layer.reconcile(&first_context, &fill(0.8)).unwrap();

        let (second, second_context) = published_with_source();
        assert_eq!(
            layer.reconcile(&second_context, &fill(0.8)).unwrap(),
            ReconcileOutcome::Created
        );
        assert_eq!(second.borrow().layer_ids(), vec!["circle-fill".to_string()]);
    }

    #[test]
    fn test_type_conflict_is_rejected() {
        let (handle, context) = published_with_source();
        LayerReconciler::new().reconcile(&context, &fill(0.8)).unwrap();

        let line = LayerDescriptor::new("circle-fill", "line", "circle");
        let outcome = LayerReconciler::new().reconcile(&context, &line).unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Rejected { .. }));
        assert_eq!(handle.borrow().get_layer("circle-fill").unwrap().layer_type, "fill");
    }

    #[test]
    fn test_missing_source_propagates_engine_error() {
        let (_handle, context) = published_with_source();
        let orphan = LayerDescriptor::new("orphan", "symbol", "nowhere");

        let err = LayerReconciler::new().reconcile(&context, &orphan).unwrap_err();
        assert!(matches!(err, MapError::Engine(_)));
    }

    #[test]
    fn test_detached_without_context() {
        let context = FeatureContext::<HeadlessEngine>::new();
        let outcome = LayerReconciler::new().reconcile(&context, &fill(0.8)).unwrap();
        assert_eq!(outcome, ReconcileOutcome::Detached);
    }
}
