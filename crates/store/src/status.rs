//! Health and setup reports of a storage backend.

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Ordered collection of notices, warnings and errors.
///
/// A status without errors is considered healthy; warnings do not change that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StorageStatus {
    messages: Vec<StatusMessage>,
}

impl StorageStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.with(Severity::Notice, title, message)
    }

    pub fn warning(self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.with(Severity::Warning, title, message)
    }

    pub fn error(self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.with(Severity::Error, title, message)
    }

    fn with(mut self, severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.push(StatusMessage {
            severity,
            title: title.into(),
            message: message.into(),
        });
        self
    }

    /// Append all messages of `other`, keeping order.
    pub fn merge(mut self, other: StorageStatus) -> Self {
        self.messages.extend(other.messages);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.by_severity(Severity::Error).next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.by_severity(Severity::Warning).next().is_some()
    }

    pub fn is_ok(&self) -> bool {
        !self.has_errors()
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &StatusMessage> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StatusMessage> {
        self.by_severity(Severity::Warning)
    }

    pub fn notices(&self) -> impl Iterator<Item = &StatusMessage> {
        self.by_severity(Severity::Notice)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &StatusMessage> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }
}
