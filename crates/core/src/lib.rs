//! `chronicle-core`: event-sourcing primitives.
//!
//! This crate contains **pure** value types (no IO): stream names, event
//! identifiers, metadata and optimistic concurrency expectations.

pub mod error;
pub mod id;
pub mod metadata;
pub mod stream;
pub mod version;

pub use error::{CoreError, CoreResult};
pub use id::EventId;
pub use metadata::{Metadata, CAUSATION_IDENTIFIER, CORRELATION_IDENTIFIER};
pub use stream::StreamName;
pub use version::ExpectedVersion;
