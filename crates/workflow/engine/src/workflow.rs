//! Workflow: applies transitions to subjects
//!
//! A [`Workflow`] binds a name, a [`Definition`], a [`MarkingStore`] and a
//! [`CallbackRegistry`]. It holds no per-subject state and is read-only
//! after construction, so one instance serves every subject of its kind.
//!
//! Applying a transition runs these phases, in this order:
//!
//! 1. **leave**: callbacks, then every source place is unmarked
//! 2. **transition**: callbacks
//! 3. **enter**: callbacks, then every destination place is marked
//! 4. the marking is persisted through the store
//! 5. **entered**: callbacks
//! 6. **completed**: callbacks
//! 7. **announce**: callbacks, including one per transition the stored
//!    marking enables
//!
//! Each phase fires `workflow.<event>`, then `workflow.<name>.<event>`,
//! then the qualified keys for that phase.
//!
//! **CRITICAL**: the engine does not lock subjects. Two concurrent `apply`
//! calls on the same subject race on the store's read-modify-write.
//! Serialise per subject in the store or in the caller.

use crate::callbacks::{CallbackRegistry, TransitionEvent};
use crate::store::MarkingStore;
use workflow_types::{
    CallbackKey, Definition, EventKind, Marking, Place, Transition, WorkflowError, WorkflowResult,
};

/// The transition engine for one workflow kind
pub struct Workflow<S, M> {
    /// Name used in callback keys
    name: String,
    /// The graph this workflow runs on
    definition: Definition,
    /// Where subject markings live
    store: M,
    /// Lifecycle callbacks
    callbacks: CallbackRegistry<S>,
}

impl<S, M: MarkingStore<S>> Workflow<S, M> {
    /// Create a workflow.
    ///
    /// The name must be non-empty and free of dots. Every callback key
    /// scoped to a workflow must name this one, and a qualifier must name a
    /// declared place (leave, enter, entered) or transition (transition,
    /// completed, announce).
    pub fn new(
        name: impl Into<String>,
        definition: Definition,
        store: M,
        callbacks: CallbackRegistry<S>,
    ) -> WorkflowResult<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('.') {
            return Err(WorkflowError::InvalidWorkflowName(name));
        }
        for key in callbacks.keys() {
            validate_key(&name, &definition, key)?;
        }

        tracing::info!(
            workflow = %name,
            places = definition.place_count(),
            transitions = definition.transition_count(),
            callbacks = callbacks.len(),
            "Workflow created"
        );

        Ok(Self {
            name,
            definition,
            store,
            callbacks,
        })
    }

    /// Create a workflow, panicking on misconfiguration
    pub fn must_new(
        name: impl Into<String>,
        definition: Definition,
        store: M,
        callbacks: CallbackRegistry<S>,
    ) -> Self {
        match Self::new(name, definition, store, callbacks) {
            Ok(workflow) => workflow,
            Err(e) => panic!("invalid workflow: {}", e),
        }
    }

    /// Name used in callback keys
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graph this workflow runs on
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// The injected marking store
    pub fn store(&self) -> &M {
        &self.store
    }

    // ── Marking ──────────────────────────────────────────────────────

    /// The subject's current marking.
    ///
    /// An empty marking counts as uninitialised: it is replaced by the
    /// definition's initial places and persisted before being returned.
    /// This happens on every call while the marking stays empty.
    pub fn get_marking(&self, subject: &mut S) -> WorkflowResult<Marking> {
        let marking = self.store.get_marking(subject)?;
        if !marking.is_empty() {
            return Ok(marking);
        }

        let marking = self.definition.initial_marking();
        self.store.set_marking(subject, marking.clone())?;
        tracing::debug!(
            workflow = %self.name,
            marking = %marking,
            "Seeded initial marking"
        );
        Ok(marking)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Whether the named transition may fire for `subject`.
    ///
    /// Returns false for unknown transitions and when the marking cannot be
    /// read; use [`Workflow::apply`] to tell those cases apart.
    pub fn can(&self, subject: &mut S, transition_name: &str) -> bool {
        let Some(transition) = self.definition.transition(transition_name) else {
            return false;
        };
        match self.get_marking(subject) {
            Ok(marking) => self.definition.is_enabled(&marking, transition),
            Err(e) => {
                tracing::debug!(
                    workflow = %self.name,
                    transition = transition_name,
                    error = %e,
                    "Marking unavailable, transition reported as disabled"
                );
                false
            }
        }
    }

    /// Transitions currently enabled for `subject`, in declaration order
    pub fn enabled_transitions(&self, subject: &mut S) -> WorkflowResult<Vec<&Transition>> {
        let marking = self.get_marking(subject)?;
        Ok(self.definition.enabled_transitions(&marking))
    }

    // ── Apply ────────────────────────────────────────────────────────

    /// Fire the named transition for `subject`.
    ///
    /// Fails before touching the marking if the transition is undefined,
    /// the marking cannot be read, or the transition is not enabled. If
    /// persisting fails the error is returned and nothing after the enter
    /// phase runs; no rollback is attempted.
    ///
    /// Callers must not apply transitions concurrently to the same subject.
    pub fn apply(&self, subject: &mut S, transition_name: &str) -> WorkflowResult<()> {
        let transition = self
            .definition
            .transition(transition_name)
            .ok_or_else(|| WorkflowError::UndefinedTransition(transition_name.to_string()))?;

        let mut marking = self.get_marking(subject)?;
        if !self.definition.is_enabled(&marking, transition) {
            return Err(WorkflowError::TransitionNotEnabled {
                transition: transition.name.clone(),
                marking: marking.places(),
            });
        }

        tracing::debug!(
            workflow = %self.name,
            transition = %transition.name,
            marking = %marking,
            "Applying transition"
        );

        self.leave(subject, transition, &mut marking);
        self.transition(subject, transition, &marking);
        self.enter(subject, transition, &mut marking);

        if let Err(e) = self.store.set_marking(subject, marking.clone()) {
            tracing::warn!(
                workflow = %self.name,
                transition = %transition.name,
                error = %e,
                "Failed to persist marking"
            );
            return Err(e);
        }

        self.entered(subject, transition, &marking);
        self.completed(subject, transition, &marking);
        self.announce(subject, transition, &marking);

        tracing::info!(
            workflow = %self.name,
            transition = %transition.name,
            marking = %marking,
            "Transition applied"
        );
        Ok(())
    }

    fn leave(&self, subject: &mut S, transition: &Transition, marking: &mut Marking) {
        self.dispatch(
            subject,
            EventKind::Leave,
            transition,
            marking,
            transition.from.iter().map(Place::as_str),
        );
        for place in &transition.from {
            marking.unmark(place);
        }
    }

    fn transition(&self, subject: &mut S, transition: &Transition, marking: &Marking) {
        self.dispatch(
            subject,
            EventKind::Transition,
            transition,
            marking,
            [transition.name.as_str()],
        );
    }

    fn enter(&self, subject: &mut S, transition: &Transition, marking: &mut Marking) {
        self.dispatch(
            subject,
            EventKind::Enter,
            transition,
            marking,
            transition.to.iter().map(Place::as_str),
        );
        for place in &transition.to {
            marking.mark(place.clone());
        }
    }

    fn entered(&self, subject: &mut S, transition: &Transition, marking: &Marking) {
        self.dispatch(
            subject,
            EventKind::Entered,
            transition,
            marking,
            transition.to.iter().map(Place::as_str),
        );
    }

    fn completed(&self, subject: &mut S, transition: &Transition, marking: &Marking) {
        self.dispatch(
            subject,
            EventKind::Completed,
            transition,
            marking,
            [transition.name.as_str()],
        );
    }

    /// Announce against the stored marking, which `entered` and
    /// `completed` callbacks may have changed since it was persisted.
    fn announce(&self, subject: &mut S, transition: &Transition, marking: &Marking) {
        let current = match self.get_marking(subject) {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!(
                    workflow = %self.name,
                    transition = %transition.name,
                    error = %e,
                    "Marking unavailable for announce, using applied marking"
                );
                marking.clone()
            }
        };
        let enabled = self.definition.enabled_transitions(&current);
        self.dispatch(
            subject,
            EventKind::Announce,
            transition,
            &current,
            enabled.iter().map(|t| t.name.as_str()),
        );
    }

    /// Fire the global key, the workflow key, then one qualified key per
    /// qualifier.
    fn dispatch<'q>(
        &self,
        subject: &mut S,
        kind: EventKind,
        transition: &Transition,
        marking: &Marking,
        qualifiers: impl IntoIterator<Item = &'q str>,
    ) {
        if self.callbacks.is_empty() {
            return;
        }

        let event = TransitionEvent {
            workflow: &self.name,
            kind,
            transition,
            marking,
            qualifier: None,
        };
        self.callbacks
            .fire(&CallbackKey::global(kind), subject, &event);
        self.callbacks
            .fire(&CallbackKey::workflow(self.name.as_str(), kind), subject, &event);

        for qualifier in qualifiers {
            let event = TransitionEvent {
                qualifier: Some(qualifier),
                ..event
            };
            self.callbacks.fire(
                &CallbackKey::qualified(self.name.as_str(), kind, qualifier),
                subject,
                &event,
            );
        }
    }
}

fn validate_key(name: &str, definition: &Definition, key: &CallbackKey) -> WorkflowResult<()> {
    let Some(workflow) = key.workflow_name() else {
        return Ok(());
    };
    if workflow != name {
        return Err(WorkflowError::UnknownCallbackTarget(key.to_string()));
    }
    let Some(qualifier) = key.qualifier() else {
        return Ok(());
    };
    let known = if key.kind().qualifies_places() {
        definition.has_place(&Place::from(qualifier))
    } else {
        definition.has_transition(qualifier)
    };
    if !known {
        return Err(WorkflowError::UnknownCallbackTarget(key.to_string()));
    }
    Ok(())
}

impl<S, M> std::fmt::Debug for Workflow<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
