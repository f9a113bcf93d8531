//! Event metadata.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// String-keyed metadata stored alongside an event payload.
///
/// Ordered so that encoded metadata is deterministic.
pub type Metadata = BTreeMap<String, JsonValue>;

/// Metadata key holding the identifier of the message that caused an event.
pub const CAUSATION_IDENTIFIER: &str = "causationIdentifier";

/// Metadata key holding the identifier shared by a chain of related messages.
pub const CORRELATION_IDENTIFIER: &str = "correlationIdentifier";
