/// An application-defined domain event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **tagged** with a stable type name used for listener routing
/// - designed to be **append-only**
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "account.opened").
    fn event_type(&self) -> &'static str;
}
