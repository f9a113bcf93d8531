use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use chronicle_core::{EventId, Metadata};

/// An encoded event ready to be appended to a stream (no sequence number yet).
///
/// Produced by the event store from a domain event during `commit`, one per
/// domain event, in batch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritableEvent {
    pub identifier: EventId,
    pub event_type: String,
    pub payload: JsonValue,
    pub metadata: Metadata,
}

impl WritableEvent {
    pub fn new(
        identifier: EventId,
        event_type: impl Into<String>,
        payload: JsonValue,
        metadata: Metadata,
    ) -> Self {
        Self {
            identifier,
            event_type: event_type.into(),
            payload,
            metadata,
        }
    }
}

/// Ordered, immutable batch of [`WritableEvent`]s; the unit handed to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WritableEvents {
    events: Vec<WritableEvent>,
}

impl WritableEvents {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, WritableEvent> {
        self.events.iter()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = EventId> + '_ {
        self.events.iter().map(|e| e.identifier)
    }
}

impl From<Vec<WritableEvent>> for WritableEvents {
    fn from(events: Vec<WritableEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<WritableEvent> for WritableEvents {
    fn from_iter<I: IntoIterator<Item = WritableEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a WritableEvents {
    type Item = &'a WritableEvent;
    type IntoIter = core::slice::Iter<'a, WritableEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
