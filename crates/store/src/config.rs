//! Routing configuration: which event store serves which streams.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chronicle_core::StreamName;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unknown event store \"{0}\"")]
    UnknownStore(String),

    #[error("no event store configured for stream \"{0}\"")]
    NoStoreForStream(StreamName),

    #[error("invalid event store configuration")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("failed to read event store configuration from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Streams whose name starts with any of `stream_prefixes` live in `store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamRoute {
    pub store: String,
    pub stream_prefixes: Vec<String>,
}

/// Maps stream names to event store identifiers.
///
/// ```json
/// {
///   "default_store": "main",
///   "routes": [
///     { "store": "audit", "stream_prefixes": ["audit-", "security-"] }
///   ]
/// }
/// ```
///
/// The longest matching prefix wins; streams matching no route go to
/// `default_store`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventStoreConfig {
    #[serde(default)]
    pub default_store: Option<String>,
    #[serde(default)]
    pub routes: Vec<StreamRoute>,
}

impl EventStoreConfig {
    /// Every stream in one store.
    pub fn single_store(identifier: impl Into<String>) -> Self {
        Self {
            default_store: Some(identifier.into()),
            routes: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ManagerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ManagerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Store identifiers named anywhere in this configuration.
    pub fn referenced_stores(&self) -> impl Iterator<Item = &str> {
        self.default_store
            .iter()
            .map(String::as_str)
            .chain(self.routes.iter().map(|r| r.store.as_str()))
    }

    /// Identifier of the store responsible for `stream_name`.
    pub fn store_for(&self, stream_name: &StreamName) -> Option<&str> {
        self.routes
            .iter()
            .flat_map(|route| {
                route
                    .stream_prefixes
                    .iter()
                    .map(move |prefix| (prefix.as_str(), route.store.as_str()))
            })
            .filter(|(prefix, _)| stream_name.has_prefix(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, store)| store)
            .or(self.default_store.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(name: &str) -> StreamName {
        StreamName::new(name).unwrap()
    }

    const CONFIG: &str = r#"{
        "default_store": "main",
        "routes": [
            { "store": "audit", "stream_prefixes": ["audit-"] },
            { "store": "security", "stream_prefixes": ["audit-login-"] }
        ]
    }"#;

    #[test]
    fn longest_prefix_wins() {
        let config = EventStoreConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.store_for(&stream("audit-export-1")), Some("audit"));
        assert_eq!(config.store_for(&stream("audit-login-7")), Some("security"));
        assert_eq!(config.store_for(&stream("orders-1")), Some("main"));
    }

    #[test]
    fn without_default_unrouted_streams_have_no_store() {
        let config = EventStoreConfig {
            default_store: None,
            routes: vec![StreamRoute {
                store: "audit".into(),
                stream_prefixes: vec!["audit-".into()],
            }],
        };
        assert_eq!(config.store_for(&stream("orders-1")), None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = EventStoreConfig::from_json_str(r#"{ "default": "main" }"#).unwrap_err();
        assert!(matches!(err, ManagerError::InvalidConfig(_)));
    }

    #[test]
    fn missing_files_report_their_path() {
        let err = EventStoreConfig::from_json_file("/nonexistent/chronicle.json").unwrap_err();
        match err {
            ManagerError::Io { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/chronicle.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn referenced_stores_include_default_and_routes() {
        let config = EventStoreConfig::from_json_str(CONFIG).unwrap();
        let stores: Vec<&str> = config.referenced_stores().collect();
        assert_eq!(stores, vec!["main", "audit", "security"]);
    }
}
