use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared, exclusively-owned engine instance. Only the owning view holds a strong reference.
pub type MapHandle<E> = Rc<RefCell<E>>;

struct Slot<E> {
    instance: Option<Weak<RefCell<E>>>,
    version: u64,
}

/// Single-slot channel through which a view exposes its engine instance to
/// feature reconcilers.
///
/// Readers only ever get a non-owning reference; once the view drops its
/// instance, [`FeatureContext::current`] yields `None` again.
pub struct FeatureContext<E> {
    slot: Rc<RefCell<Slot<E>>>,
}

impl<E> FeatureContext<E> {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                instance: None,
                version: 0,
            })),
        }
    }

    /// Publishes `instance`; returns false when that same instance is already published
    pub(crate) fn publish(&self, instance: &MapHandle<E>) -> bool {
        let mut slot = self.slot.borrow_mut();
        let unchanged = slot
            .instance
            .as_ref()
            .map(|current| current.ptr_eq(&Rc::downgrade(instance)))
            .unwrap_or(false);
        if unchanged {
            return false;
        }
        slot.instance = Some(Rc::downgrade(instance));
        slot.version += 1;
        true
    }

    pub(crate) fn clear(&self) {
        self.slot.borrow_mut().instance = None;
    }

    /// The published instance, if any and still alive
    pub fn current(&self) -> Option<MapHandle<E>> {
        self.slot
            .borrow()
            .instance
            .as_ref()
            .and_then(Weak::upgrade)
    }

    pub fn is_published(&self) -> bool {
        self.current().is_some()
    }

    /// Number of distinct instances published so far
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }
}

impl<E> Default for FeatureContext<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for FeatureContext<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_only_on_identity_change() {
        let context = FeatureContext::new();
        let first = Rc::new(RefCell::new(1u8));
        let same_value = Rc::new(RefCell::new(1u8));

        assert!(context.publish(&first));
        assert!(!context.publish(&first));
        assert_eq!(context.version(), 1);

        assert!(context.publish(&same_value));
        assert_eq!(context.version(), 2);
    }

    #[test]
    fn test_reference_is_non_owning() {
        let context = FeatureContext::new();
        let reader = context.clone();
        let instance = Rc::new(RefCell::new("engine"));

        context.publish(&instance);
        assert!(reader.is_published());
        assert_eq!(Rc::strong_count(&instance), 1);

        drop(instance);
        assert!(reader.current().is_none());
    }

    #[test]
    fn test_clear() {
        let context = FeatureContext::new();
        let instance = Rc::new(RefCell::new(()));
        context.publish(&instance);
        context.clear();
        assert!(!context.is_published());
        assert_eq!(context.version(), 1);
    }
}
