//! `chronicle-store`: the event store and its storage boundary.
//!
//! - [`EventStore`]: stream-scoped commit/load with optimistic concurrency and
//!   post-commit notification
//! - [`storage`]: the backend contract and an in-memory backend
//! - [`EventStream`]: restartable cursor over committed events
//! - [`EventStoreManager`]: picks the store responsible for a stream

pub mod config;
pub mod event_store;
pub mod manager;
pub mod status;
pub mod storage;
pub mod stream;
pub mod writable;

#[cfg(test)]
mod fixtures;

pub use config::{EventStoreConfig, ManagerError, StreamRoute};
pub use event_store::{EventStore, EventStoreError, PostCommitCallback};
pub use manager::{EventStoreManager, EventStoreManagerBuilder};
pub use status::{Severity, StatusMessage, StorageStatus};
pub use storage::{ConcurrencyConflict, EventStorage, InMemoryEventStorage, StorageError};
pub use stream::{EventStream, RawEvent};
pub use writable::{WritableEvent, WritableEvents};
