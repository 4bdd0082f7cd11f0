//! Places: the states a subject can occupy

use serde::{Deserialize, Serialize};

/// A named state in a workflow graph.
///
/// Places carry no structure beyond their identity; two places are the same
/// place iff their names are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Place(pub String);

impl Place {
    /// Create a place from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The place name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Place {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Place {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Place {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
