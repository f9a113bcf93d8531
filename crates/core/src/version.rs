//! Optimistic concurrency expectations.

use crate::error::CoreError;

/// What a committer believes the target stream's version to be.
///
/// The version of a stream is the sequence number of its latest committed
/// event. Sequence numbers start at 0, so a stream holding one event is at
/// version 0 and a stream without events has no version at all.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ExpectedVersion {
    /// Skip version checking.
    #[default]
    Any,
    /// Require the stream to have no events yet.
    NoStream,
    /// Require the stream to be at exactly this version.
    Exact(u64),
}

impl ExpectedVersion {
    /// Integer sentinel for [`ExpectedVersion::Any`].
    pub const RAW_ANY: i64 = -2;
    /// Integer sentinel for [`ExpectedVersion::NoStream`].
    pub const RAW_NO_STREAM: i64 = -1;

    /// Does a stream whose latest sequence number is `current` satisfy this expectation?
    ///
    /// `current` is `None` when the stream has no committed events.
    pub fn matches(self, current: Option<u64>) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::NoStream => current.is_none(),
            ExpectedVersion::Exact(v) => current == Some(v),
        }
    }

    /// Parse the integer representation (`-2` any, `-1` no stream, `n >= 0` exact).
    pub fn from_raw(raw: i64) -> Result<Self, CoreError> {
        match raw {
            Self::RAW_ANY => Ok(ExpectedVersion::Any),
            Self::RAW_NO_STREAM => Ok(ExpectedVersion::NoStream),
            v if v >= 0 => Ok(ExpectedVersion::Exact(v as u64)),
            other => Err(CoreError::InvalidExpectedVersion(other)),
        }
    }

    /// Integer representation, the inverse of [`ExpectedVersion::from_raw`].
    ///
    /// Exact versions above `i64::MAX` saturate.
    pub fn as_raw(self) -> i64 {
        match self {
            ExpectedVersion::Any => Self::RAW_ANY,
            ExpectedVersion::NoStream => Self::RAW_NO_STREAM,
            ExpectedVersion::Exact(v) => i64::try_from(v).unwrap_or(i64::MAX),
        }
    }

    /// The expectation that matches a stream currently at `current`.
    pub fn for_current(current: Option<u64>) -> Self {
        match current {
            Some(v) => ExpectedVersion::Exact(v),
            None => ExpectedVersion::NoStream,
        }
    }
}

impl core::fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExpectedVersion::Any => f.write_str("any"),
            ExpectedVersion::NoStream => f.write_str("no stream"),
            ExpectedVersion::Exact(v) => write!(f, "version {v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn any_matches_everything() {
        assert!(ExpectedVersion::Any.matches(None));
        assert!(ExpectedVersion::Any.matches(Some(0)));
        assert!(ExpectedVersion::Any.matches(Some(99)));
    }

    #[test]
    fn no_stream_only_matches_missing_streams() {
        assert!(ExpectedVersion::NoStream.matches(None));
        assert!(!ExpectedVersion::NoStream.matches(Some(0)));
    }

    #[test]
    fn exact_requires_the_same_version() {
        assert!(ExpectedVersion::Exact(0).matches(Some(0)));
        assert!(!ExpectedVersion::Exact(0).matches(None));
        assert!(!ExpectedVersion::Exact(3).matches(Some(4)));
    }

    #[test]
    fn sentinels() {
        assert_eq!(ExpectedVersion::from_raw(-2), Ok(ExpectedVersion::Any));
        assert_eq!(ExpectedVersion::from_raw(-1), Ok(ExpectedVersion::NoStream));
        assert_eq!(ExpectedVersion::from_raw(7), Ok(ExpectedVersion::Exact(7)));
        assert_eq!(
            ExpectedVersion::from_raw(-3),
            Err(CoreError::InvalidExpectedVersion(-3))
        );
        assert_eq!(ExpectedVersion::default(), ExpectedVersion::Any);
    }

    proptest! {
        /// Property: the expectation derived from a version matches exactly that version.
        #[test]
        fn for_current_matches_only_itself(
            current in proptest::option::of(0u64..10_000),
            other in proptest::option::of(0u64..10_000),
        ) {
            let expected = ExpectedVersion::for_current(current);
            prop_assert!(expected.matches(current));
            prop_assert_eq!(expected.matches(other), current == other);
        }

        /// Property: raw values in range survive a trip through the enum.
        #[test]
        fn raw_representation_is_stable(raw in -2i64..i64::MAX) {
            let parsed = ExpectedVersion::from_raw(raw).unwrap();
            prop_assert_eq!(parsed.as_raw(), raw);
        }
    }
}
