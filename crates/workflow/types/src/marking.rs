//! Markings: the places currently active for one subject
//!
//! A marking may hold several places at once (after a fork). It knows
//! nothing about the definition it is used with; nothing stops a marking
//! from naming a place the definition never declared.

use crate::Place;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of active places of a single subject
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marking {
    places: BTreeSet<Place>,
}

impl Marking {
    /// Create a marking with the given places already marked
    pub fn new<I>(places: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Place>,
    {
        places.into_iter().collect()
    }

    /// Mark a place as active. Marking an active place is a no-op.
    pub fn mark(&mut self, place: impl Into<Place>) {
        self.places.insert(place.into());
    }

    /// Remove a place from the active set. Unmarking an inactive place is a no-op.
    pub fn unmark(&mut self, place: &Place) {
        self.places.remove(place);
    }

    /// Whether `place` is active
    pub fn has(&self, place: &Place) -> bool {
        self.places.contains(place)
    }

    /// Whether no place is active; an empty marking is uninitialised
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Number of active places
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Snapshot of the active places. Mutating the returned vector does not
    /// touch the marking.
    pub fn places(&self) -> Vec<Place> {
        self.places.iter().cloned().collect()
    }

    /// Active places in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }
}

impl<P: Into<Place>> FromIterator<P> for Marking {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            places: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for Marking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, place) in self.places.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", place)?;
        }
        write!(f, "}}")
    }
}
