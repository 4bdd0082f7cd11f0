//! Workflow definitions: the immutable graph of places and transitions
//!
//! A Definition is validated once, when it is built. After that every
//! transition is known to reference only declared places and the initial
//! places are known to be declared, so nothing re-checks this at runtime.
//!
//! Definitions are immutable once built. To change a graph, build a new one.

use crate::{Marking, Place, Transition, WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ── Workflow Definition ──────────────────────────────────────────────

/// The declared graph of one workflow kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DefinitionSpec", into = "DefinitionSpec")]
pub struct Definition {
    /// Every declared place
    places: BTreeSet<Place>,
    /// Places a fresh marking starts in
    initial_places: Vec<Place>,
    /// Transitions in declaration order
    transitions: Vec<Transition>,
    /// Name → position in `transitions`
    index: HashMap<String, usize>,
}

impl Definition {
    /// Build and validate a definition.
    ///
    /// Places are registered first, duplicates collapse. Transitions are
    /// then checked one at a time in the order given and the first one that
    /// references an undeclared place aborts construction. Initial places
    /// are checked last.
    ///
    /// A transition name declared twice is rejected with
    /// [`WorkflowError::DuplicateTransition`]; the later declaration never
    /// silently replaces the earlier one.
    pub fn new<P, I, T>(places: P, initial_places: I, transitions: T) -> WorkflowResult<Self>
    where
        P: IntoIterator,
        P::Item: Into<Place>,
        I: IntoIterator,
        I::Item: Into<Place>,
        T: IntoIterator<Item = Transition>,
    {
        let mut definition = Self {
            places: BTreeSet::new(),
            initial_places: Vec::new(),
            transitions: Vec::new(),
            index: HashMap::new(),
        };

        for place in places {
            definition.places.insert(place.into());
        }
        for transition in transitions {
            definition.add_transition(transition)?;
        }
        definition.set_initial_places(initial_places)?;

        tracing::debug!(
            places = definition.places.len(),
            transitions = definition.transitions.len(),
            "Workflow definition built"
        );
        Ok(definition)
    }

    /// Build a definition, panicking if it is invalid.
    ///
    /// Meant for definitions written in code, where an invalid graph is a
    /// programming error.
    pub fn must_new<P, I, T>(places: P, initial_places: I, transitions: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<Place>,
        I: IntoIterator,
        I::Item: Into<Place>,
        T: IntoIterator<Item = Transition>,
    {
        match Self::new(places, initial_places, transitions) {
            Ok(definition) => definition,
            Err(e) => panic!("invalid workflow definition: {}", e),
        }
    }

    /// Decode and validate a definition from its JSON form
    pub fn from_json(json: &str) -> WorkflowResult<Self> {
        let spec: DefinitionSpec = serde_json::from_str(json)?;
        Self::try_from(spec)
    }

    fn add_transition(&mut self, transition: Transition) -> WorkflowResult<()> {
        for place in transition.places() {
            if !self.places.contains(place) {
                return Err(WorkflowError::UnknownTransitionPlace {
                    place: place.clone(),
                    transition: transition.name.clone(),
                });
            }
        }
        if self.index.contains_key(&transition.name) {
            return Err(WorkflowError::DuplicateTransition(transition.name));
        }
        self.index
            .insert(transition.name.clone(), self.transitions.len());
        self.transitions.push(transition);
        Ok(())
    }

    fn set_initial_places<I>(&mut self, places: I) -> WorkflowResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Place>,
    {
        for place in places {
            let place = place.into();
            if !self.places.contains(&place) {
                return Err(WorkflowError::UnknownInitialPlace(place));
            }
            if !self.initial_places.contains(&place) {
                self.initial_places.push(place);
            }
        }
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All declared places
    pub fn places(&self) -> &BTreeSet<Place> {
        &self.places
    }

    pub fn has_place(&self, place: &Place) -> bool {
        self.places.contains(place)
    }

    /// Places a fresh marking is seeded with
    pub fn initial_places(&self) -> &[Place] {
        &self.initial_places
    }

    /// A fresh marking holding exactly the initial places
    pub fn initial_marking(&self) -> Marking {
        Marking::new(self.initial_places.iter().cloned())
    }

    /// All transitions, in declaration order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Look up a transition by name
    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.index.get(name).map(|&i| &self.transitions[i])
    }

    pub fn has_transition(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Whether `transition` may fire from `marking`.
    ///
    /// The rule is an OR-join: the marking must hold at least one of the
    /// source places, not all of them.
    pub fn is_enabled(&self, marking: &Marking, transition: &Transition) -> bool {
        transition.from.iter().any(|place| marking.has(place))
    }

    /// Transitions enabled by `marking`, in declaration order
    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|t| self.is_enabled(marking, t))
            .collect()
    }

    /// Total number of declared places
    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    /// Total number of transitions
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

// ── Serialized Form ──────────────────────────────────────────────────

/// The serialized form of a [`Definition`].
///
/// Decoding goes through [`Definition::new`], so a definition read from
/// configuration is validated exactly like one built in code.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DefinitionSpec {
    pub places: Vec<Place>,
    #[serde(default)]
    pub initial_places: Vec<Place>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl TryFrom<DefinitionSpec> for Definition {
    type Error = WorkflowError;

    fn try_from(spec: DefinitionSpec) -> WorkflowResult<Self> {
        Definition::new(spec.places, spec.initial_places, spec.transitions)
    }
}

impl From<Definition> for DefinitionSpec {
    fn from(definition: Definition) -> Self {
        Self {
            places: definition.places.into_iter().collect(),
            initial_places: definition.initial_places,
            transitions: definition.transitions,
        }
    }
}
