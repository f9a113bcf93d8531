//! Domain events as handed to the event store.
//!
//! A [`DomainEvent`] is either a plain application event or a decorator that
//! adds an explicit identifier and/or metadata around another domain event.
//! The decorator chain is resolved once, at commit time, by [`DomainEvent::resolve`].

use serde_json::Value as JsonValue;

use chronicle_core::{CAUSATION_IDENTIFIER, CORRELATION_IDENTIFIER, EventId, Metadata};

/// A domain event, optionally decorated.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent<E> {
    /// The application event as-is: identifier generated, metadata empty.
    Plain(E),
    /// A decorator layer around another domain event.
    Decorated(DecoratedEvent<E>),
}

/// Decorator adding capabilities to a wrapped domain event without touching its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedEvent<E> {
    inner: Box<DomainEvent<E>>,
    identifier: Option<EventId>,
    metadata: Metadata,
}

impl<E> DecoratedEvent<E> {
    pub fn new(inner: DomainEvent<E>, identifier: Option<EventId>, metadata: Metadata) -> Self {
        Self {
            inner: Box::new(inner),
            identifier,
            metadata,
        }
    }

    pub fn inner(&self) -> &DomainEvent<E> {
        &self.inner
    }

    pub fn identifier(&self) -> Option<EventId> {
        self.identifier
    }

    /// Metadata contributed by this layer only.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// The outcome of unwrapping a decorator chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEvent<'a, E> {
    /// The underlying application event.
    pub event: &'a E,
    /// Explicit identifier of the outermost layer that supplies one.
    pub identifier: Option<EventId>,
    /// Metadata of all layers; outer layers override inner keys.
    pub metadata: Metadata,
}

impl<E> DomainEvent<E> {
    pub fn new(event: E) -> Self {
        DomainEvent::Plain(event)
    }

    /// The underlying application event, with every decorator layer removed.
    pub fn event(&self) -> &E {
        match self {
            DomainEvent::Plain(event) => event,
            DomainEvent::Decorated(decorated) => decorated.inner.event(),
        }
    }

    pub fn is_decorated(&self) -> bool {
        matches!(self, DomainEvent::Decorated(_))
    }

    /// Unwrap the decorator chain into the event, its explicit identifier and merged metadata.
    pub fn resolve(&self) -> ResolvedEvent<'_, E> {
        match self {
            DomainEvent::Plain(event) => ResolvedEvent {
                event,
                identifier: None,
                metadata: Metadata::new(),
            },
            DomainEvent::Decorated(decorated) => {
                let mut resolved = decorated.inner.resolve();
                if decorated.identifier.is_some() {
                    resolved.identifier = decorated.identifier;
                }
                resolved.metadata.extend(
                    decorated
                        .metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                );
                resolved
            }
        }
    }

    /// Explicit identifier, if any layer supplies one.
    pub fn identifier(&self) -> Option<EventId> {
        self.resolve().identifier
    }

    /// Merged metadata of every layer.
    pub fn metadata(&self) -> Metadata {
        self.resolve().metadata
    }

    /// Wrap in a decorator supplying an explicit identifier.
    pub fn with_identifier(self, identifier: EventId) -> Self {
        DomainEvent::Decorated(DecoratedEvent::new(self, Some(identifier), Metadata::new()))
    }

    /// Wrap in a decorator supplying metadata.
    pub fn with_metadata(self, metadata: Metadata) -> Self {
        DomainEvent::Decorated(DecoratedEvent::new(self, None, metadata))
    }

    pub fn with_metadata_entry(self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(key.into(), value.into());
        self.with_metadata(metadata)
    }

    /// Record the identifier of the message that caused this event.
    pub fn with_causation_identifier(self, identifier: impl Into<String>) -> Self {
        self.with_metadata_entry(CAUSATION_IDENTIFIER, identifier.into())
    }

    /// Record the identifier correlating this event with related messages.
    pub fn with_correlation_identifier(self, identifier: impl Into<String>) -> Self {
        self.with_metadata_entry(CORRELATION_IDENTIFIER, identifier.into())
    }
}

impl<E> From<E> for DomainEvent<E> {
    fn from(event: E) -> Self {
        DomainEvent::Plain(event)
    }
}

/// An ordered, immutable batch of domain events, committed as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvents<E> {
    events: Vec<DomainEvent<E>>,
}

impl<E> DomainEvents<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn single(event: impl Into<DomainEvent<E>>) -> Self {
        Self {
            events: vec![event.into()],
        }
    }

    pub fn from_events(events: impl IntoIterator<Item = DomainEvent<E>>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// A new batch with `event` appended.
    pub fn with_event(mut self, event: impl Into<DomainEvent<E>>) -> Self {
        self.events.push(event.into());
        self
    }

    /// A new batch holding `self` followed by `other`.
    pub fn append(mut self, other: DomainEvents<E>) -> Self {
        self.events.extend(other.events);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn first(&self) -> Option<&DomainEvent<E>> {
        self.events.first()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, DomainEvent<E>> {
        self.events.iter()
    }
}

impl<E> Default for DomainEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> FromIterator<DomainEvent<E>> for DomainEvents<E> {
    fn from_iter<I: IntoIterator<Item = DomainEvent<E>>>(iter: I) -> Self {
        Self::from_events(iter)
    }
}

impl<E> From<Vec<E>> for DomainEvents<E> {
    fn from(events: Vec<E>) -> Self {
        events.into_iter().map(DomainEvent::Plain).collect()
    }
}

impl<E> IntoIterator for DomainEvents<E> {
    type Item = DomainEvent<E>;
    type IntoIter = std::vec::IntoIter<DomainEvent<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a DomainEvents<E> {
    type Item = &'a DomainEvent<E>;
    type IntoIter = core::slice::Iter<'a, DomainEvent<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
