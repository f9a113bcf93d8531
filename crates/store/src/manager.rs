//! Hands out the event store responsible for a stream.

use std::collections::HashMap;
use std::sync::Arc;

use chronicle_core::StreamName;

use crate::config::{EventStoreConfig, ManagerError};
use crate::event_store::EventStore;

/// Registry of named event stores plus the routing that picks one per stream.
pub struct EventStoreManager<S, C, B, E> {
    config: EventStoreConfig,
    stores: HashMap<String, Arc<EventStore<S, C, B, E>>>,
}

pub struct EventStoreManagerBuilder<S, C, B, E> {
    config: EventStoreConfig,
    stores: HashMap<String, Arc<EventStore<S, C, B, E>>>,
}

impl<S, C, B, E> EventStoreManager<S, C, B, E> {
    pub fn builder(config: EventStoreConfig) -> EventStoreManagerBuilder<S, C, B, E> {
        EventStoreManagerBuilder {
            config,
            stores: HashMap::new(),
        }
    }

    /// The store registered under `identifier`.
    pub fn event_store(&self, identifier: &str) -> Result<Arc<EventStore<S, C, B, E>>, ManagerError> {
        self.stores
            .get(identifier)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownStore(identifier.to_string()))
    }

    /// Identifier of the store responsible for `stream_name`.
    pub fn store_identifier_for(&self, stream_name: &StreamName) -> Result<&str, ManagerError> {
        self.config
            .store_for(stream_name)
            .ok_or_else(|| ManagerError::NoStoreForStream(stream_name.clone()))
    }

    /// The store responsible for `stream_name`.
    pub fn event_store_for(
        &self,
        stream_name: &StreamName,
    ) -> Result<Arc<EventStore<S, C, B, E>>, ManagerError> {
        let identifier = self.store_identifier_for(stream_name)?;
        self.event_store(identifier)
    }

    pub fn store_identifiers(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }
}

impl<S, C, B, E> EventStoreManagerBuilder<S, C, B, E> {
    /// Register `store` under `identifier`, replacing any previous registration.
    pub fn with_store(mut self, identifier: impl Into<String>, store: EventStore<S, C, B, E>) -> Self {
        self.stores.insert(identifier.into(), Arc::new(store));
        self
    }

    /// Fails if the configuration names a store that was never registered.
    pub fn build(self) -> Result<EventStoreManager<S, C, B, E>, ManagerError> {
        if let Some(missing) = self
            .config
            .referenced_stores()
            .find(|id| !self.stores.contains_key(*id))
        {
            return Err(ManagerError::UnknownStore(missing.to_string()));
        }
        tracing::debug!(stores = self.stores.len(), routes = self.config.routes.len(), "event store manager ready");
        Ok(EventStoreManager {
            config: self.config,
            stores: self.stores,
        })
    }
}
