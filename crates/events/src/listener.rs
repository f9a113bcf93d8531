//! Listener bindings and the type-tag registry that locates them.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use chronicle_core::{EventId, Metadata};

use crate::domain_event::{DomainEvent, ResolvedEvent};

/// What a listener receives for one published event.
#[derive(Debug)]
pub struct EventTransport<'a, E> {
    domain_event: &'a DomainEvent<E>,
    resolved: ResolvedEvent<'a, E>,
    position: usize,
}

impl<'a, E> EventTransport<'a, E> {
    pub fn new(domain_event: &'a DomainEvent<E>, position: usize) -> Self {
        Self {
            domain_event,
            resolved: domain_event.resolve(),
            position,
        }
    }

    /// The underlying event, decorators removed.
    pub fn event(&self) -> &'a E {
        self.resolved.event
    }

    /// Explicit identifier supplied by a decorator, if any.
    pub fn identifier(&self) -> Option<EventId> {
        self.resolved.identifier
    }

    pub fn metadata(&self) -> &Metadata {
        &self.resolved.metadata
    }

    /// The event exactly as it was handed to `commit`.
    pub fn domain_event(&self) -> &'a DomainEvent<E> {
        self.domain_event
    }

    /// Index of the event within the published batch.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Error raised by a listener.
///
/// Carries a message, a numeric code and, optionally, the error that caused it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
    code: i64,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 0,
            source: None,
        }
    }

    /// Wrap an arbitrary error, taking its display form as the message.
    pub fn from_error<Err>(err: Err) -> Self
    where
        Err: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            code: 0,
            source: Some(Box::new(err)),
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }
}

impl From<anyhow::Error> for ListenerError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: format!("{err:#}"),
            code: 0,
            source: Some(err.into()),
        }
    }
}

/// Reacts to committed events.
///
/// Listeners run synchronously on the committing thread, in registration order.
pub trait EventListener<E>: Send + Sync {
    fn when(&self, transport: &EventTransport<'_, E>) -> Result<(), ListenerError>;
}

struct FnListener<F>(F);

impl<E, F> EventListener<E> for FnListener<F>
where
    F: Fn(&EventTransport<'_, E>) -> Result<(), ListenerError> + Send + Sync,
{
    fn when(&self, transport: &EventTransport<'_, E>) -> Result<(), ListenerError> {
        (self.0)(transport)
    }
}

/// A listener together with the names it is reported under.
pub struct ListenerBinding<E> {
    listener: String,
    handler: String,
    target: Arc<dyn EventListener<E>>,
}

impl<E> ListenerBinding<E> {
    pub fn new(
        listener: impl Into<String>,
        handler: impl Into<String>,
        target: Arc<dyn EventListener<E>>,
    ) -> Self {
        Self {
            listener: listener.into(),
            handler: handler.into(),
            target,
        }
    }

    pub fn from_fn<F>(listener: impl Into<String>, handler: impl Into<String>, f: F) -> Self
    where
        E: 'static,
        F: Fn(&EventTransport<'_, E>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self::new(listener, handler, Arc::new(FnListener(f)))
    }

    /// Identity of the listener (usually its type name).
    pub fn listener(&self) -> &str {
        &self.listener
    }

    /// Identity of the handler within the listener.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn invoke(&self, transport: &EventTransport<'_, E>) -> Result<(), ListenerError> {
        self.target.when(transport)
    }
}

impl<E> Clone for ListenerBinding<E> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            handler: self.handler.clone(),
            target: Arc::clone(&self.target),
        }
    }
}

impl<E> core::fmt::Debug for ListenerBinding<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerBinding")
            .field("listener", &self.listener)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

/// Finds the listeners interested in an event type.
pub trait ListenerLocator<E>: Send + Sync {
    /// Bindings for `event_type` in dispatch order, or `None` if nothing listens.
    fn listeners_for(&self, event_type: &str) -> Option<&[ListenerBinding<E>]>;
}

impl<E, L> ListenerLocator<E> for Arc<L>
where
    L: ListenerLocator<E> + ?Sized,
{
    fn listeners_for(&self, event_type: &str) -> Option<&[ListenerBinding<E>]> {
        (**self).listeners_for(event_type)
    }
}

/// Explicit event type -> listeners map, built at configuration time.
pub struct ListenerRegistry<E> {
    bindings: HashMap<String, Vec<ListenerBinding<E>>>,
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Append `binding` to the listeners of `event_type`.
    pub fn bind(&mut self, event_type: impl Into<String>, binding: ListenerBinding<E>) -> &mut Self {
        self.bindings
            .entry(event_type.into())
            .or_default()
            .push(binding);
        self
    }

    pub fn register(
        &mut self,
        event_type: impl Into<String>,
        listener: impl Into<String>,
        handler: impl Into<String>,
        target: Arc<dyn EventListener<E>>,
    ) -> &mut Self {
        self.bind(event_type, ListenerBinding::new(listener, handler, target))
    }

    pub fn register_fn<F>(
        &mut self,
        event_type: impl Into<String>,
        listener: impl Into<String>,
        handler: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        E: 'static,
        F: Fn(&EventTransport<'_, E>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.bind(event_type, ListenerBinding::from_fn(listener, handler, f))
    }

    /// Event types with at least one listener.
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Total number of bindings across all event types.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> core::fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.bindings.iter()).finish()
    }
}

impl<E> ListenerLocator<E> for ListenerRegistry<E> {
    fn listeners_for(&self, event_type: &str) -> Option<&[ListenerBinding<E>]> {
        self.bindings
            .get(event_type)
            .map(Vec::as_slice)
            .filter(|bindings| !bindings.is_empty())
    }
}
