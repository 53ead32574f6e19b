use crate::{
    core::context::FeatureContext,
    engine::MapEngine,
    layers::{
        base::{FeatureDescriptor, FeatureKind, ReconcileOutcome},
        layer::LayerReconciler,
        source::SourceReconciler,
    },
    Result,
};

enum Slot<E> {
    Source(SourceReconciler<E>),
    Layer(LayerReconciler<E>),
}

impl<E: MapEngine> Slot<E> {
    fn for_kind(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Source => Slot::Source(SourceReconciler::new()),
            FeatureKind::Layer => Slot::Layer(LayerReconciler::new()),
        }
    }

    fn kind(&self) -> FeatureKind {
        match self {
            Slot::Source(_) => FeatureKind::Source,
            Slot::Layer(_) => FeatureKind::Layer,
        }
    }
}

/// Reconciles a view's declared children, one reconciler per position.
///
/// Positions are stable across renders, so the same declaration keeps the same
/// reconciler and its short-circuit state. A position whose kind changes gets a
/// fresh reconciler. Declarations that disappear leave their engine objects in
/// place; those belong to the instance until it is torn down.
pub struct FeatureManager<E> {
    slots: Vec<Slot<E>>,
}

impl<E: MapEngine> FeatureManager<E> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Reconciles `declared` in order; sources should precede the layers using them
    pub fn reconcile_all(
        &mut self,
        context: &FeatureContext<E>,
        declared: &[FeatureDescriptor],
    ) -> Result<Vec<ReconcileOutcome>> {
        self.slots.truncate(declared.len());

        let mut outcomes = Vec::with_capacity(declared.len());
        for (index, descriptor) in declared.iter().enumerate() {
            match self.slots.get(index).map(|slot| slot.kind() == descriptor.kind()) {
                Some(true) => {}
                Some(false) => self.slots[index] = Slot::for_kind(descriptor.kind()),
                None => self.slots.push(Slot::for_kind(descriptor.kind())),
            }

            let outcome = match (&mut self.slots[index], descriptor) {
                (Slot::Source(reconciler), FeatureDescriptor::Source(source)) => {
                    reconciler.reconcile(context, source)?
                }
                (Slot::Layer(reconciler), FeatureDescriptor::Layer(layer)) => {
                    reconciler.reconcile(context, layer)?
                }
                _ => unreachable!("slot kind was aligned with the declaration above"),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<E: MapEngine> Default for FeatureManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapViewOptions;
    use crate::engine::{HeadlessContainer, HeadlessEngine};
    use crate::layers::base::{LayerDescriptor, SourceDescriptor};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn declared(data: serde_json::Value) -> Vec<FeatureDescriptor> {
        vec![
            SourceDescriptor::geojson("circle", data).into(),
            LayerDescriptor::new("circle-fill", "fill", "circle")
                .with_paint(json!({"fill-color": "#088"}))
                .into(),
        ]
    }

    #[test]
    fn test_reconcile_all() {
        let engine =
            HeadlessEngine::construct(HeadlessContainer::new("map"), &MapViewOptions::default())
                .unwrap();
        let handle = Rc::new(RefCell::new(engine));
        let context = FeatureContext::new();
        context.publish(&handle);

        let mut manager = FeatureManager::new();
        let first = manager.reconcile_all(&context, &declared(json!(1))).unwrap();
        assert_eq!(first, vec![ReconcileOutcome::Created, ReconcileOutcome::Created]);

        let second = manager.reconcile_all(&context, &declared(json!(2))).unwrap();
        assert_eq!(second, vec![ReconcileOutcome::Updated, ReconcileOutcome::Unchanged]);

        let shrunk = manager.reconcile_all(&context, &declared(json!(2))[..1]).unwrap();
        assert_eq!(shrunk, vec![ReconcileOutcome::Unchanged]);
        assert_eq!(manager.len(), 1);
        assert_eq!(handle.borrow().layer_ids(), vec!["circle-fill".to_string()]);
    }

    #[test]
    fn test_kind_change_replaces_slot() {
        let engine =
            HeadlessEngine::construct(HeadlessContainer::new("map"), &MapViewOptions::default())
                .unwrap();
        let handle = Rc::new(RefCell::new(engine));
        let context = FeatureContext::new();
        context.publish(&handle);

        let mut manager = FeatureManager::new();
        manager.reconcile_all(&context, &declared(json!(1))).unwrap();

        let swapped: Vec<FeatureDescriptor> = vec![
            SourceDescriptor::geojson("circle", json!(1)).into(),
            SourceDescriptor::geojson("images", json!([])).into(),
        ];
        let outcomes = manager.reconcile_all(&context, &swapped).unwrap();
        assert_eq!(outcomes[1], ReconcileOutcome::Created);
        assert_eq!(
            handle.borrow().source_ids(),
            vec!["circle".to_string(), "images".to_string()]
        );
    }
}
