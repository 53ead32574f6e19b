pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{event_table, lookup_semantic, semantic_name_for, EventBinding};
pub use handler::{BindingDiff, EventBindingSet, Handler, HandlerArgs, HandlerProps};
