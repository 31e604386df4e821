use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a trip participant.
///
/// Names are case-sensitive: "alice" and "Alice" are different people.
/// The roster is responsible for rejecting empty names; this type only
/// wraps the string.
///
/// # Examples
///
/// ```
/// use trip_settle::core::participant::ParticipantName;
///
/// let alice = ParticipantName::new("Alice");
/// let bob = ParticipantName::new("Bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for ParticipantName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
