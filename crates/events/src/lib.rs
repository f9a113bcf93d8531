//! `chronicle-events`: domain events, codecs, listeners and the event bus.

pub mod bus;
pub mod codec;
pub mod domain_event;
pub mod event;
pub mod listener;

pub use bus::{DispatchFailure, EventBus, SyncEventBus};
pub use codec::{CodecError, EventCodec, JsonEventCodec};
pub use domain_event::{DecoratedEvent, DomainEvent, DomainEvents, ResolvedEvent};
pub use event::Event;
pub use listener::{
    EventListener, EventTransport, ListenerBinding, ListenerError, ListenerLocator,
    ListenerRegistry,
};
