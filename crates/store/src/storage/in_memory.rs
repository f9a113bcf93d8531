use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use chronicle_core::{EventId, ExpectedVersion, StreamName};

use super::r#trait::{ConcurrencyConflict, EventStorage, StorageError};
use crate::status::StorageStatus;
use crate::stream::{EventStream, RawEvent};
use crate::writable::WritableEvents;

#[derive(Debug, Default)]
struct Streams {
    events: HashMap<StreamName, Vec<RawEvent>>,
    identifiers: HashSet<EventId>,
}

impl Streams {
    fn current_version(&self, stream_name: &StreamName) -> Option<u64> {
        self.events
            .get(stream_name)
            .and_then(|stream| stream.last())
            .map(|e| e.sequence_number)
    }
}

/// In-memory append-only event storage.
///
/// Intended for tests/dev. Not optimized for performance. All streams sit
/// behind one lock, so the version check and the append cannot interleave
/// with another commit.
///
/// A stream with no events at or above the requested sequence number loads as
/// an invalid (empty) [`EventStream`]; "exists but empty" is not modelled.
#[derive(Debug, Default)]
pub struct InMemoryEventStorage {
    streams: RwLock<Streams>,
}

impl InMemoryEventStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest sequence number of `stream_name`, `None` if it has no events.
    pub fn current_version(&self, stream_name: &StreamName) -> Result<Option<u64>, StorageError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        Ok(streams.current_version(stream_name))
    }
}

impl EventStorage for InMemoryEventStorage {
    fn load(
        &self,
        stream_name: &StreamName,
        minimum_sequence_number: u64,
    ) -> Result<EventStream, StorageError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;

        let events = streams
            .events
            .get(stream_name)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|e| e.sequence_number >= minimum_sequence_number)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(EventStream::new(stream_name.clone(), events))
    }

    fn commit(
        &self,
        stream_name: &StreamName,
        events: &WritableEvents,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<RawEvent>, StorageError> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;

        let current = streams.current_version(stream_name);
        if !expected_version.matches(current) {
            return Err(ConcurrencyConflict {
                stream: stream_name.clone(),
                expected: expected_version,
                actual: current,
            }
            .into());
        }

        // Identifiers are global; reject the whole batch before touching the stream.
        let mut batch_identifiers = HashSet::with_capacity(events.len());
        for identifier in events.identifiers() {
            if streams.identifiers.contains(&identifier) || !batch_identifiers.insert(identifier) {
                return Err(StorageError::DuplicateEventIdentifier(identifier));
            }
        }

        let recorded_at = Utc::now();
        let first = current.map_or(0, |v| v + 1);
        let committed: Vec<RawEvent> = events
            .iter()
            .zip(first..)
            .map(|(e, sequence_number)| RawEvent {
                sequence_number,
                stream_name: stream_name.clone(),
                identifier: e.identifier,
                event_type: e.event_type.clone(),
                payload: e.payload.clone(),
                metadata: e.metadata.clone(),
                recorded_at,
            })
            .collect();

        streams.identifiers.extend(batch_identifiers);
        streams
            .events
            .entry(stream_name.clone())
            .or_default()
            .extend(committed.iter().cloned());

        tracing::trace!(
            stream = %stream_name,
            first,
            count = committed.len(),
            "appended to in-memory stream"
        );
        Ok(committed)
    }

    fn status(&self) -> StorageStatus {
        match self.streams.read() {
            Ok(streams) => StorageStatus::new().notice(
                "In-memory storage",
                format!(
                    "{} streams, {} events",
                    streams.events.len(),
                    streams.identifiers.len()
                ),
            ),
            Err(_) => StorageStatus::new().error("In-memory storage", "lock poisoned"),
        }
    }

    fn setup(&self) -> StorageStatus {
        tracing::info!("in-memory event storage needs no setup");
        StorageStatus::new().notice("In-memory storage", "nothing to set up")
    }
}
