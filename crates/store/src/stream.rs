//! Reading committed events back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use chronicle_core::{EventId, Metadata, StreamName};
use chronicle_events::{CodecError, EventCodec};

/// An event as committed to storage (assigned a sequence number).
///
/// Sequence numbers are assigned by the storage backend during commit and are:
/// - **Gapless**: each event gets the previous sequence number + 1
/// - **Stream-scoped**: the first event of every stream gets 0
/// - **Immutable**: once assigned, sequence numbers never change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub sequence_number: u64,
    pub stream_name: StreamName,
    pub identifier: EventId,
    pub event_type: String,
    pub payload: JsonValue,
    pub metadata: Metadata,
    pub recorded_at: DateTime<Utc>,
}

impl RawEvent {
    /// Rebuild the domain event through `codec`.
    pub fn decode<E, C>(&self, codec: &C) -> Result<E, CodecError>
    where
        C: EventCodec<E> + ?Sized,
    {
        codec.decode(&self.event_type, &self.payload)
    }
}

/// Forward-only, restartable cursor over the events of one stream.
///
/// Holds a snapshot taken at load time; later commits are not observed.
/// A stream is *valid* while the cursor is positioned on an event.
#[derive(Debug, Clone)]
pub struct EventStream {
    stream_name: StreamName,
    events: Arc<[RawEvent]>,
    position: usize,
}

impl EventStream {
    pub fn new(stream_name: StreamName, events: Vec<RawEvent>) -> Self {
        Self {
            stream_name,
            events: events.into(),
            position: 0,
        }
    }

    /// A stream with nothing to read; never valid.
    pub fn empty(stream_name: StreamName) -> Self {
        Self::new(stream_name, Vec::new())
    }

    pub fn stream_name(&self) -> &StreamName {
        &self.stream_name
    }

    pub fn is_valid(&self) -> bool {
        self.position < self.events.len()
    }

    /// The event under the cursor, without advancing.
    pub fn current(&self) -> Option<&RawEvent> {
        self.events.get(self.position)
    }

    /// Move the cursor back to the first loaded event.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Number of events not yet read.
    pub fn remaining(&self) -> usize {
        self.events.len().saturating_sub(self.position)
    }
}

impl Iterator for EventStream {
    type Item = RawEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.get(self.position).cloned()?;
        self.position += 1;
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EventStream {}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(stream: &StreamName, sequence_number: u64) -> RawEvent {
        RawEvent {
            sequence_number,
            stream_name: stream.clone(),
            identifier: EventId::new(),
            event_type: "test.event".into(),
            payload: serde_json::json!({ "n": sequence_number }),
            metadata: Metadata::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn empty_streams_are_invalid() {
        let stream = EventStream::empty(StreamName::new("s").unwrap());
        assert!(!stream.is_valid());
        assert!(stream.current().is_none());
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn reads_forward_and_rewinds() {
        let name = StreamName::new("s").unwrap();
        let mut stream = EventStream::new(name.clone(), vec![raw(&name, 0), raw(&name, 1)]);

        assert!(stream.is_valid());
        assert_eq!(stream.current().map(|e| e.sequence_number), Some(0));

        let first_pass: Vec<u64> = stream.by_ref().map(|e| e.sequence_number).collect();
        assert_eq!(first_pass, vec![0, 1]);
        assert!(!stream.is_valid());

        stream.rewind();
        assert!(stream.is_valid());
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.next().map(|e| e.sequence_number), Some(0));
        assert_eq!(stream.remaining(), 1);
    }
}
