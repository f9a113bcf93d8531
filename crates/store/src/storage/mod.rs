//! Storage backend boundary.
//!
//! The event store delegates persistence to an [`EventStorage`]. The backend is
//! the sole authority on concurrency: it must check the expected version and
//! append as one indivisible step.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStorage;
pub use r#trait::{ConcurrencyConflict, EventStorage, StorageError};
