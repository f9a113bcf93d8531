use std::sync::Arc;

use thiserror::Error;

use chronicle_core::{EventId, ExpectedVersion, StreamName};

use crate::status::StorageStatus;
use crate::stream::{EventStream, RawEvent};
use crate::writable::WritableEvents;

/// The expected version of a commit did not match the stream.
///
/// Callers must reload the stream to learn its real version before retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "optimistic concurrency check failed on stream \"{stream}\": expected {expected}, found {}",
    describe_current(.actual)
)]
pub struct ConcurrencyConflict {
    pub stream: StreamName,
    pub expected: ExpectedVersion,
    /// Latest sequence number at the time of the attempt (`None`: no events).
    pub actual: Option<u64>,
}

fn describe_current(actual: &Option<u64>) -> String {
    match actual {
        Some(v) => format!("version {v}"),
        None => "no stream".to_string(),
    }
}

/// Storage backend operation error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Concurrency(#[from] ConcurrencyConflict),

    #[error("event identifier {0} is already in use")]
    DuplicateEventIdentifier(EventId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Append-only, stream-scoped event storage.
///
/// ## Commit Semantics
///
/// `commit()`:
/// - Checks `expected_version` against the stream's latest sequence number
/// - Assigns sequence numbers (0 for the first event of a stream, then +1, no gaps)
/// - Persists the batch atomically (all or nothing)
/// - Fails with [`StorageError::Concurrency`] rather than appending partially
///
/// Two concurrent commits expecting the same version must not both succeed.
///
/// ## Load Semantics
///
/// `load()` returns the events of a stream whose sequence number is at least
/// `minimum_sequence_number`, in sequence order. Backends that have nothing to
/// return give back an invalid (empty) [`EventStream`].
pub trait EventStorage: Send + Sync {
    fn load(
        &self,
        stream_name: &StreamName,
        minimum_sequence_number: u64,
    ) -> Result<EventStream, StorageError>;

    /// Append `events` to `stream_name`, returning them as committed.
    fn commit(
        &self,
        stream_name: &StreamName,
        events: &WritableEvents,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<RawEvent>, StorageError>;

    /// Connection / health report.
    fn status(&self) -> StorageStatus;

    /// Create whatever the backend needs (tables, directories) and report.
    fn setup(&self) -> StorageStatus;
}

impl<S> EventStorage for Arc<S>
where
    S: EventStorage + ?Sized,
{
    fn load(
        &self,
        stream_name: &StreamName,
        minimum_sequence_number: u64,
    ) -> Result<EventStream, StorageError> {
        (**self).load(stream_name, minimum_sequence_number)
    }

    fn commit(
        &self,
        stream_name: &StreamName,
        events: &WritableEvents,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<RawEvent>, StorageError> {
        (**self).commit(stream_name, events, expected_version)
    }

    fn status(&self) -> StorageStatus {
        (**self).status()
    }

    fn setup(&self) -> StorageStatus {
        (**self).setup()
    }
}
