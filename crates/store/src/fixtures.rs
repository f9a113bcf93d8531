//! Shared test doubles.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use chronicle_core::{ExpectedVersion, StreamName};
use chronicle_events::{
    CodecError, DispatchFailure, DomainEvents, Event, EventBus, EventCodec, JsonEventCodec,
    ListenerRegistry, SyncEventBus,
};

use crate::event_store::EventStore;
use crate::status::StorageStatus;
use crate::storage::{EventStorage, InMemoryEventStorage, StorageError};
use crate::stream::{EventStream, RawEvent};
use crate::writable::WritableEvents;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AccountEvent {
    Opened { owner: String },
    Deposited { amount: u64 },
    Withdrawn { amount: u64 },
}

impl Event for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Opened { .. } => "account.opened",
            AccountEvent::Deposited { .. } => "account.deposited",
            AccountEvent::Withdrawn { .. } => "account.withdrawn",
        }
    }
}

pub fn opened(owner: &str) -> AccountEvent {
    AccountEvent::Opened {
        owner: owner.to_string(),
    }
}

pub fn deposited(amount: u64) -> AccountEvent {
    AccountEvent::Deposited { amount }
}

pub fn withdrawn(amount: u64) -> AccountEvent {
    AccountEvent::Withdrawn { amount }
}

pub fn stream(name: &str) -> StreamName {
    StreamName::new(name).expect("valid stream name")
}

pub fn batch(events: Vec<AccountEvent>) -> DomainEvents<AccountEvent> {
    DomainEvents::from(events)
}

/// Storage wrapper counting commit calls.
#[derive(Debug, Default)]
pub struct CountingStorage {
    pub inner: InMemoryEventStorage,
    pub commits: AtomicUsize,
}

impl CountingStorage {
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl EventStorage for CountingStorage {
    fn load(&self, stream_name: &StreamName, minimum_sequence_number: u64) -> Result<EventStream, StorageError> {
        self.inner.load(stream_name, minimum_sequence_number)
    }

    fn commit(
        &self,
        stream_name: &StreamName,
        events: &WritableEvents,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<RawEvent>, StorageError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit(stream_name, events, expected_version)
    }

    fn status(&self) -> StorageStatus {
        self.inner.status()
    }

    fn setup(&self) -> StorageStatus {
        self.inner.setup()
    }
}

/// Bus wrapper counting publish calls.
pub struct CountingBus<B> {
    pub inner: B,
    pub publishes: AtomicUsize,
}

impl<B> CountingBus<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            publishes: AtomicUsize::new(0),
        }
    }

    pub fn publishes(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

impl<E, B: EventBus<E>> EventBus<E> for CountingBus<B> {
    fn publish(&self, events: &DomainEvents<E>) -> Result<(), DispatchFailure> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        self.inner.publish(events)
    }
}

/// Codec refusing to encode withdrawals.
#[derive(Debug, Default)]
pub struct NoWithdrawalsCodec {
    pub inner: JsonEventCodec<AccountEvent>,
}

impl EventCodec<AccountEvent> for NoWithdrawalsCodec {
    fn resolve_type(&self, event: &AccountEvent) -> Result<String, CodecError> {
        self.inner.resolve_type(event)
    }

    fn encode(&self, event: &AccountEvent) -> Result<JsonValue, CodecError> {
        if let AccountEvent::Withdrawn { .. } = event {
            return Err(CodecError::UnresolvableType("withdrawals are not encodable".into()));
        }
        self.inner.encode(event)
    }

    fn decode(&self, event_type: &str, payload: &JsonValue) -> Result<AccountEvent, CodecError> {
        self.inner.decode(event_type, payload)
    }
}

pub type TestBus = SyncEventBus<AccountEvent, ListenerRegistry<AccountEvent>>;

pub type TestStore = EventStore<
    Arc<CountingStorage>,
    JsonEventCodec<AccountEvent>,
    Arc<CountingBus<TestBus>>,
    AccountEvent,
>;

/// A store over counting doubles; the handles stay with the caller for assertions.
pub fn store_with(registry: ListenerRegistry<AccountEvent>) -> (TestStore, Arc<CountingStorage>, Arc<CountingBus<TestBus>>) {
    let storage = Arc::new(CountingStorage::default());
    let bus = Arc::new(CountingBus::new(SyncEventBus::new(registry)));
    let store = EventStore::new(Arc::clone(&storage), JsonEventCodec::new(), Arc::clone(&bus));
    (store, storage, bus)
}
