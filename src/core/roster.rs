use crate::core::participant::ParticipantName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from roster edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("participant name must not be empty")]
    EmptyName,
    #[error("participant {0} is already on the roster")]
    DuplicateName(ParticipantName),
}

/// Ordered set of trip participants.
///
/// Insertion order is significant: it fixes the row/column order of the
/// settlement matrix and the tie-break order of the settlement reducer.
///
/// # Examples
///
/// ```
/// use trip_settle::core::roster::ParticipantRoster;
///
/// let mut roster = ParticipantRoster::new();
/// roster.add("Alice").unwrap();
/// roster.add(" Bob ").unwrap();
/// assert!(roster.add("Alice").is_err());
/// assert_eq!(roster.len(), 2);
/// assert_eq!(roster.names()[1].as_str(), "Bob");
/// ```
///
/// Deserializing goes through the same checks as [`ParticipantRoster::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ParticipantRoster {
    names: Vec<ParticipantName>,
}

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from a list of names, rejecting empties and duplicates.
    pub fn from_names<I, S>(names: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::new();
        for name in names {
            roster.add(name.as_ref())?;
        }
        Ok(roster)
    }

    /// Append a participant. The name is trimmed before it is checked.
    pub fn add(&mut self, name: &str) -> Result<&ParticipantName, RosterError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.contains(trimmed) {
            return Err(RosterError::DuplicateName(ParticipantName::new(trimmed)));
        }
        self.names.push(ParticipantName::new(trimmed));
        Ok(&self.names[self.names.len() - 1])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str() == name)
    }

    /// Position of a participant in roster order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }

    pub fn names(&self) -> &[ParticipantName] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParticipantRoster {
    type Item = &'a ParticipantName;
    type IntoIter = std::slice::Iter<'a, ParticipantName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

impl TryFrom<Vec<String>> for ParticipantRoster {
    type Error = RosterError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(names)
    }
}

impl From<ParticipantRoster> for Vec<String> {
    fn from(roster: ParticipantRoster) -> Self {
        roster.names.into_iter().map(|n| n.as_str().to_string()).collect()
    }
}
