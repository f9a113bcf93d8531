//! The event store: stream-scoped append with optimistic concurrency,
//! followed by synchronous notification.
//!
//! ## Commit Flow
//!
//! ```text
//! DomainEvents
//!   ↓
//! 1. Empty batch? return (no append, no publish, no callbacks)
//!   ↓
//! 2. Encode every event (identifier, metadata, type, payload); any failure aborts
//!   ↓
//! 3. Storage commit (expected-version check + append, atomic in the backend)
//!   ↓
//! 4. Publish the original DomainEvents to the bus
//!   ↓
//! 5. Post-commit callbacks, in registration order
//! ```
//!
//! ## Failure After Append
//!
//! Once step 3 succeeds the events are durable. A dispatch or callback failure
//! in steps 4-5 is returned to the caller but the append stands: the contract
//! is at-least-once appended, at-most-once acknowledged. Callers can tell the
//! two situations apart with [`EventStoreError::events_appended`].

use thiserror::Error;

use chronicle_core::{EventId, ExpectedVersion, StreamName};
use chronicle_events::{CodecError, DispatchFailure, DomainEvent, DomainEvents, Event, EventBus, EventCodec};

use crate::status::StorageStatus;
use crate::storage::{ConcurrencyConflict, EventStorage, StorageError};
use crate::stream::EventStream;
use crate::writable::{WritableEvent, WritableEvents};

/// Invoked after every successful commit with the original domain events and
/// their encoded form.
pub type PostCommitCallback<E> =
    Box<dyn Fn(&DomainEvents<E>, &WritableEvents) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Error)]
pub enum EventStoreError {
    /// `load` addressed a stream with nothing to read.
    #[error("the event stream \"{0}\" does not appear to be valid")]
    StreamNotFound(StreamName),

    /// The expected version did not match; nothing was appended.
    #[error(transparent)]
    Concurrency(ConcurrencyConflict),

    /// An event could not be encoded; nothing was appended.
    #[error("failed to encode event at position {position}")]
    Codec {
        position: usize,
        #[source]
        source: CodecError,
    },

    /// A listener failed; the events were appended.
    #[error("events were committed but publishing them failed: {0}")]
    Dispatch(#[from] DispatchFailure),

    /// A post-commit callback failed; the events were appended and published.
    #[error("events were committed but post-commit callback #{position} failed")]
    PostCommit {
        position: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The storage backend failed for a reason other than concurrency.
    #[error("event storage failed: {0}")]
    Storage(StorageError),
}

impl EventStoreError {
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, EventStoreError::Concurrency(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EventStoreError::StreamNotFound(_))
    }

    /// True when the error happened after the events were durably appended.
    pub fn events_appended(&self) -> bool {
        matches!(
            self,
            EventStoreError::Dispatch(_) | EventStoreError::PostCommit { .. }
        )
    }
}

impl From<StorageError> for EventStoreError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Concurrency(conflict) => EventStoreError::Concurrency(conflict),
            other => EventStoreError::Storage(other),
        }
    }
}

/// Main API to store and fetch events.
///
/// Owns one storage backend, the codec used to encode events, the bus that is
/// notified after each successful commit, and its own ordered list of
/// post-commit callbacks. Instances share no state with each other.
///
/// ## Concurrency
///
/// The store takes no locks. Conflicting commits are detected by the storage
/// backend's atomic expected-version check; the store never retries.
pub struct EventStore<S, C, B, E> {
    storage: S,
    codec: C,
    bus: B,
    post_commit_callbacks: Vec<PostCommitCallback<E>>,
}

impl<S, C, B, E> EventStore<S, C, B, E> {
    pub fn new(storage: S, codec: C, bus: B) -> Self {
        Self {
            storage,
            codec,
            bus,
            post_commit_callbacks: Vec::new(),
        }
    }

    /// Register a callback invoked once per successful commit, after the bus.
    ///
    /// Callbacks run in registration order and live as long as the store.
    pub fn on_post_commit<F>(&mut self, callback: F)
    where
        F: Fn(&DomainEvents<E>, &WritableEvents) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_commit_callbacks.push(Box::new(callback));
    }

    pub fn with_post_commit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DomainEvents<E>, &WritableEvents) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_post_commit(callback);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<S, C, B, E> EventStore<S, C, B, E>
where
    S: EventStorage,
    C: EventCodec<E>,
    B: EventBus<E>,
    E: Event,
{
    /// Load `stream_name` from `minimum_sequence_number` onwards.
    pub fn load(
        &self,
        stream_name: &StreamName,
        minimum_sequence_number: u64,
    ) -> Result<EventStream, EventStoreError> {
        let stream = self.storage.load(stream_name, minimum_sequence_number)?;
        if !stream.is_valid() {
            return Err(EventStoreError::StreamNotFound(stream_name.clone()));
        }
        Ok(stream)
    }

    /// Load the whole of `stream_name`.
    pub fn load_stream(&self, stream_name: &StreamName) -> Result<EventStream, EventStoreError> {
        self.load(stream_name, 0)
    }

    /// Append `events` to `stream_name`, then publish them and run the post-commit callbacks.
    pub fn commit(
        &self,
        stream_name: &StreamName,
        events: DomainEvents<E>,
        expected_version: ExpectedVersion,
    ) -> Result<(), EventStoreError> {
        if events.is_empty() {
            tracing::trace!(stream = %stream_name, "empty commit, nothing to append");
            return Ok(());
        }

        // 1) Encode the whole batch before storage is touched.
        let writable = self.encode(&events)?;

        // 2) Append (durable step; the backend checks the expected version)
        tracing::debug!(
            stream = %stream_name,
            count = writable.len(),
            expected = %expected_version,
            "committing events"
        );
        let committed = self
            .storage
            .commit(stream_name, &writable, expected_version)
            .map_err(|err| {
                if let StorageError::Concurrency(conflict) = &err {
                    tracing::warn!("{conflict}");
                }
                EventStoreError::from(err)
            })?;

        // 3) Publish the original events (after append)
        self.bus.publish(&events)?;

        // 4) Post-commit callbacks
        for (position, callback) in self.post_commit_callbacks.iter().enumerate() {
            callback(&events, &writable)
                .map_err(|source| EventStoreError::PostCommit { position, source })?;
        }

        tracing::debug!(
            stream = %stream_name,
            version = committed.last().map(|e| e.sequence_number),
            "committed events"
        );
        Ok(())
    }

    /// Health of the storage backend.
    pub fn status(&self) -> StorageStatus {
        self.storage.status()
    }

    /// Set up the storage backend.
    pub fn setup(&self) -> StorageStatus {
        self.storage.setup()
    }

    fn encode(&self, events: &DomainEvents<E>) -> Result<WritableEvents, EventStoreError> {
        events
            .iter()
            .enumerate()
            .map(|(position, event)| {
                self.to_writable(event)
                    .map_err(|source| EventStoreError::Codec { position, source })
            })
            .collect()
    }

    fn to_writable(&self, event: &DomainEvent<E>) -> Result<WritableEvent, CodecError> {
        let resolved = event.resolve();
        let identifier = resolved.identifier.unwrap_or_else(EventId::new);
        let event_type = self.codec.resolve_type(resolved.event)?;
        let payload = self.codec.encode(resolved.event)?;
        Ok(WritableEvent::new(
            identifier,
            event_type,
            payload,
            resolved.metadata,
        ))
    }
}

impl<S, C, B, E> core::fmt::Debug for EventStore<S, C, B, E>
where
    S: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventStore")
            .field("storage", &self.storage)
            .field("post_commit_callbacks", &self.post_commit_callbacks.len())
            .finish_non_exhaustive()
    }
}
