//! Transitions: named edges between sets of places
//!
//! A transition consumes its source places and produces its destination
//! places. Both lists keep the order they were declared in, which is also
//! the order per-place callbacks fire in.

use crate::Place;
use serde::{Deserialize, Serialize};

/// A named transition of a workflow graph
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Unique name within the owning definition
    pub name: String,
    /// Source places, left when the transition fires
    pub from: Vec<Place>,
    /// Destination places, entered when the transition fires
    pub to: Vec<Place>,
}

impl Transition {
    pub fn new<F, T>(name: impl Into<String>, from: F, to: T) -> Self
    where
        F: IntoIterator,
        F::Item: Into<Place>,
        T: IntoIterator,
        T::Item: Into<Place>,
    {
        Self {
            name: name.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// All places this transition references, sources first
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.from.iter().chain(self.to.iter())
    }

    /// Whether `place` is one of the source places
    pub fn leaves(&self, place: &Place) -> bool {
        self.from.contains(place)
    }

    /// Whether `place` is one of the destination places
    pub fn enters(&self, place: &Place) -> bool {
        self.to.contains(place)
    }
}
