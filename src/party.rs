//! Named participants of a program, either contributing inputs or receiving outputs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A computation participant, identified by its name.
///
/// Two parties with the same name are the same party. A [`Party`] does not own anything, it is
/// only referenced by the inputs and outputs declared for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party(String);

impl Party {
    /// Creates a party with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name of the party.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Party {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
