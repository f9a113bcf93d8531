//! Conversion between domain events and their wire form (type tag + payload map).

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::Event;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot resolve event type: {0}")]
    UnresolvableType(String),

    #[error("failed to encode {event_type} payload")]
    Encode {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {event_type} payload")]
    Decode {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{event_type} payload must encode to a JSON object")]
    NotAMap { event_type: String },

    #[error("decoded event has type {found}, stored type is {expected}")]
    TypeMismatch { expected: String, found: String },
}

/// Encodes and decodes domain events.
///
/// Implementations must be deterministic: the same event always yields the same
/// type tag and payload.
pub trait EventCodec<E>: Send + Sync {
    /// Stable wire type tag for `event`.
    fn resolve_type(&self, event: &E) -> Result<String, CodecError>;

    /// Payload for `event`.
    fn encode(&self, event: &E) -> Result<JsonValue, CodecError>;

    /// Rebuild an event from a stored type tag and payload.
    fn decode(&self, event_type: &str, payload: &JsonValue) -> Result<E, CodecError>;
}

impl<E, C> EventCodec<E> for Arc<C>
where
    C: EventCodec<E> + ?Sized,
{
    fn resolve_type(&self, event: &E) -> Result<String, CodecError> {
        (**self).resolve_type(event)
    }

    fn encode(&self, event: &E) -> Result<JsonValue, CodecError> {
        (**self).encode(event)
    }

    fn decode(&self, event_type: &str, payload: &JsonValue) -> Result<E, CodecError> {
        (**self).decode(event_type, payload)
    }
}

/// serde_json codec using [`Event::event_type`] as the wire type tag.
pub struct JsonEventCodec<E> {
    _event: PhantomData<fn() -> E>,
}

impl<E> JsonEventCodec<E> {
    pub fn new() -> Self {
        Self {
            _event: PhantomData,
        }
    }
}

impl<E> Default for JsonEventCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for JsonEventCodec<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E> core::fmt::Debug for JsonEventCodec<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonEventCodec")
            .field("event", &core::any::type_name::<E>())
            .finish()
    }
}

impl<E> EventCodec<E> for JsonEventCodec<E>
where
    E: Event + Serialize + DeserializeOwned,
{
    fn resolve_type(&self, event: &E) -> Result<String, CodecError> {
        let event_type = event.event_type();
        if event_type.is_empty() {
            return Err(CodecError::UnresolvableType(format!(
                "{} returned an empty event type",
                core::any::type_name::<E>()
            )));
        }
        Ok(event_type.to_string())
    }

    fn encode(&self, event: &E) -> Result<JsonValue, CodecError> {
        let payload = serde_json::to_value(event).map_err(|source| CodecError::Encode {
            event_type: event.event_type().to_string(),
            source,
        })?;
        if !payload.is_object() {
            return Err(CodecError::NotAMap {
                event_type: event.event_type().to_string(),
            });
        }
        Ok(payload)
    }

    fn decode(&self, event_type: &str, payload: &JsonValue) -> Result<E, CodecError> {
        let event: E =
            serde_json::from_value(payload.clone()).map_err(|source| CodecError::Decode {
                event_type: event_type.to_string(),
                source,
            })?;
        if event.event_type() != event_type {
            return Err(CodecError::TypeMismatch {
                expected: event_type.to_string(),
                found: event.event_type().to_string(),
            });
        }
        Ok(event)
    }
}
