//! Cross-aggregate lifecycle services.
//!
//! The [`CascadeCoordinator`] is the sole authority for propagating deletes
//! and deactivations from a root aggregate to its dependents. Write handlers
//! invoke it explicitly; there are no hidden model-level hooks.

pub mod cascade;

pub use cascade::{CascadeCoordinator, CascadeReport};
