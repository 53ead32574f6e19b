pub mod base;
pub mod layer;
pub mod manager;
pub mod source;

pub use base::{FeatureDescriptor, FeatureKind, LayerDescriptor, ReconcileOutcome, SourceDescriptor};
pub use layer::{upsert_layer, LayerReconciler};
pub use manager::FeatureManager;
pub use source::{upsert_source, SourceReconciler};
