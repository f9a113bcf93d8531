//! Synchronous post-commit dispatch of domain events to their listeners.
//!
//! The bus runs **after** the events are durably appended: the event store is
//! the source of truth and the bus only notifies. Dispatch is a single linear
//! pass per batch with no persisted cursor:
//!
//! ```text
//! for each event (batch order)
//!   for each listener bound to the event's type (registration order)
//!     invoke; on error: log, wrap, stop
//! ```
//!
//! A failing listener aborts the rest of the batch. Listeners already invoked
//! are not rolled back and listeners not yet invoked are not retried here;
//! replay belongs to whoever reads the store.

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::Event;
use crate::domain_event::DomainEvents;
use crate::listener::{EventTransport, ListenerBinding, ListenerError, ListenerLocator, ListenerRegistry};

/// A listener failed while a committed batch was being published.
///
/// Names the listener and handler, the event it choked on, and keeps the
/// listener's error as the source.
#[derive(Debug, Error)]
#[error("event listener {listener}::{handler} failed on {event_type}: {message} ({code})")]
pub struct DispatchFailure {
    pub listener: String,
    pub handler: String,
    pub event_type: String,
    /// Index of the failing event within the published batch.
    pub position: usize,
    pub message: String,
    pub code: i64,
    #[source]
    pub source: ListenerError,
}

impl DispatchFailure {
    fn new<E>(
        binding: &ListenerBinding<E>,
        event_type: &str,
        position: usize,
        source: ListenerError,
    ) -> Self {
        Self {
            listener: binding.listener().to_string(),
            handler: binding.handler().to_string(),
            event_type: event_type.to_string(),
            position,
            message: source.message().to_string(),
            code: source.code(),
            source,
        }
    }
}

/// Publishes committed domain events.
pub trait EventBus<E>: Send + Sync {
    fn publish(&self, events: &DomainEvents<E>) -> Result<(), DispatchFailure>;
}

impl<E, B> EventBus<E> for Arc<B>
where
    B: EventBus<E> + ?Sized,
{
    fn publish(&self, events: &DomainEvents<E>) -> Result<(), DispatchFailure> {
        (**self).publish(events)
    }
}

/// In-process bus that invokes listeners on the publishing thread.
pub struct SyncEventBus<E, L = ListenerRegistry<E>> {
    locator: L,
    _event: PhantomData<fn(E)>,
}

impl<E, L> SyncEventBus<E, L>
where
    L: ListenerLocator<E>,
{
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            _event: PhantomData,
        }
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }
}

impl<E> Default for SyncEventBus<E, ListenerRegistry<E>> {
    fn default() -> Self {
        Self {
            locator: ListenerRegistry::new(),
            _event: PhantomData,
        }
    }
}

impl<E, L> core::fmt::Debug for SyncEventBus<E, L>
where
    L: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncEventBus")
            .field("locator", &self.locator)
            .finish()
    }
}

impl<E, L> EventBus<E> for SyncEventBus<E, L>
where
    E: Event,
    L: ListenerLocator<E>,
{
    fn publish(&self, events: &DomainEvents<E>) -> Result<(), DispatchFailure> {
        for (position, domain_event) in events.iter().enumerate() {
            let event_type = domain_event.event().event_type();
            let Some(bindings) = self.locator.listeners_for(event_type) else {
                continue;
            };

            let transport = EventTransport::new(domain_event, position);
            for binding in bindings {
                tracing::trace!(
                    listener = binding.listener(),
                    handler = binding.handler(),
                    event_type,
                    position,
                    "dispatching event"
                );
                if let Err(err) = binding.invoke(&transport) {
                    tracing::error!(
                        listener = binding.listener(),
                        handler = binding.handler(),
                        event_type,
                        position,
                        code = err.code(),
                        error = ?err,
                        "event listener failed"
                    );
                    return Err(DispatchFailure::new(binding, event_type, position, err));
                }
            }
        }
        Ok(())
    }
}
