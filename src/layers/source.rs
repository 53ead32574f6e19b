use crate::{
    core::context::FeatureContext,
    engine::{EngineSource, MapEngine},
    layers::base::{ReconcileOutcome, SourceDescriptor},
    MapError, Result,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Create-or-patch of one source inside `engine`.
///
/// A missing source is added; an existing one has its data replaced in place,
/// and only when it differs. The source type is fixed at creation, so a
/// declaration with a different type is rejected.
pub fn upsert_source<E: MapEngine>(
    engine: &mut E,
    descriptor: &SourceDescriptor,
) -> Result<ReconcileOutcome> {
    match engine.get_source_mut(&descriptor.id) {
        None => {
            engine.add_source(&descriptor.id, descriptor.to_spec())?;
            log::debug!("source '{}' created", descriptor.id);
            Ok(ReconcileOutcome::Created)
        }
        Some(existing) => {
            if existing.source_type() != descriptor.source_type {
                let reason = format!(
                    "source '{}' already exists with type '{}', declared '{}'",
                    descriptor.id,
                    existing.source_type(),
                    descriptor.source_type
                );
                log::warn!("{}", reason);
                return Ok(ReconcileOutcome::Rejected { reason });
            }
            if existing.data() == &descriptor.data {
                return Ok(ReconcileOutcome::Unchanged);
            }
            existing.set_data(descriptor.data.clone());
            Ok(ReconcileOutcome::Updated)
        }
    }
}

/// Keeps one declared source in sync across renders.
///
/// The last applied descriptor only counts for the instance it was applied to;
/// a newly published instance starts from scratch.
pub struct SourceReconciler<E> {
    applied: Option<SourceDescriptor>,
    applied_to: Weak<RefCell<E>>,
}

impl<E: MapEngine> SourceReconciler<E> {
    pub fn new() -> Self {
        Self {
            applied: None,
            applied_to: Weak::new(),
        }
    }

    /// The last descriptor the engine accepted
    pub fn applied(&self) -> Option<&SourceDescriptor> {
        self.applied.as_ref()
    }

    pub fn reconcile(
        &mut self,
        context: &FeatureContext<E>,
        descriptor: &SourceDescriptor,
    ) -> Result<ReconcileOutcome> {
        let Some(instance) = context.current() else {
            return Ok(ReconcileOutcome::Detached);
        };
        let current = Rc::downgrade(&instance);
        if !self.applied_to.ptr_eq(&current) {
            self.applied = None;
            self.applied_to = current;
        }
        if self.applied.as_ref() == Some(descriptor) {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let outcome = {
            let mut engine = instance.try_borrow_mut().map_err(|_| {
                MapError::Engine(format!(
                    "engine busy while reconciling source '{}'",
                    descriptor.id
                ))
            })?;
            upsert_source(&mut *engine, descriptor)?
        };

        if !matches!(outcome, ReconcileOutcome::Rejected { .. }) {
            self.applied = Some(descriptor.clone());
        }
        Ok(outcome)
    }
}

impl<E: MapEngine> Default for SourceReconciler<E> {
    fn default() -> Self {
        Self::new()
    }
}
