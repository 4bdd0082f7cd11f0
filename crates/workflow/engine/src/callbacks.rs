//! Callback registry: host code listening to the transition lifecycle
//!
//! Callbacks are synchronous notifications. They run on the caller's thread
//! while `apply` is in progress, return nothing, and cannot veto or fail a
//! transition. They may mutate the subject.

use std::collections::HashMap;
use workflow_types::{CallbackKey, EventKind, Marking, Transition, WorkflowResult};

/// What a callback is told about the transition in progress
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent<'a> {
    /// Name of the workflow applying the transition
    pub workflow: &'a str,
    /// The lifecycle phase being dispatched
    pub kind: EventKind,
    /// The transition being applied
    pub transition: &'a Transition,
    /// The marking as it stands at this phase (not yet persisted before `entered`)
    pub marking: &'a Marking,
    /// The place or transition name for qualified keys
    pub qualifier: Option<&'a str>,
}

/// A host-supplied lifecycle callback
pub type Callback<S> = Box<dyn Fn(&mut S, &TransitionEvent<'_>) + Send + Sync>;

/// Exact-match map from callback key to callback
pub struct CallbackRegistry<S> {
    callbacks: HashMap<CallbackKey, Callback<S>>,
}

impl<S> CallbackRegistry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Register a callback, replacing any previous one for the same key
    pub fn on<F>(&mut self, key: impl Into<CallbackKey>, callback: F)
    where
        F: Fn(&mut S, &TransitionEvent<'_>) + Send + Sync + 'static,
    {
        self.callbacks.insert(key.into(), Box::new(callback));
    }

    /// Register a callback under a dotted key such as
    /// `workflow.review.transition.publish`
    pub fn on_str<F>(&mut self, key: &str, callback: F) -> WorkflowResult<()>
    where
        F: Fn(&mut S, &TransitionEvent<'_>) + Send + Sync + 'static,
    {
        let key: CallbackKey = key.parse()?;
        self.on(key, callback);
        Ok(())
    }

    /// Builder form of [`CallbackRegistry::on`]
    pub fn with<F>(mut self, key: impl Into<CallbackKey>, callback: F) -> Self
    where
        F: Fn(&mut S, &TransitionEvent<'_>) + Send + Sync + 'static,
    {
        self.on(key, callback);
        self
    }

    /// Whether a callback is registered under `key`
    pub fn contains(&self, key: &CallbackKey) -> bool {
        self.callbacks.contains_key(key)
    }

    /// Unregister and return the callback under `key`
    pub fn remove(&mut self, key: &CallbackKey) -> Option<Callback<S>> {
        self.callbacks.remove(key)
    }

    /// Every registered key, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &CallbackKey> {
        self.callbacks.keys()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke the callback registered under `key`, if any.
    /// Returns whether one was found.
    pub fn fire(&self, key: &CallbackKey, subject: &mut S, event: &TransitionEvent<'_>) -> bool {
        match self.callbacks.get(key) {
            Some(callback) => {
                tracing::trace!(key = %key, "Dispatching workflow callback");
                callback(subject, event);
                true
            }
            None => false,
        }
    }
}

impl<S> Default for CallbackRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for CallbackRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.callbacks.keys().map(|k| k.to_string()).collect();
        keys.sort();
        f.debug_struct("CallbackRegistry")
            .field("keys", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event<'a>(transition: &'a Transition, marking: &'a Marking) -> TransitionEvent<'a> {
        TransitionEvent {
            workflow: "merging",
            kind: EventKind::Transition,
            transition,
            marking,
            qualifier: Some("submit"),
        }
    }

    #[test]
    fn test_fire_registered_callback() {
        let registry = CallbackRegistry::<Vec<String>>::new().with(
            CallbackKey::qualified("merging", EventKind::Transition, "submit"),
            |log: &mut Vec<String>, e: &TransitionEvent<'_>| {
                log.push(format!("{}:{}", e.kind, e.transition.name))
            },
        );

        let transition = Transition::new("submit", ["start"], ["test"]);
        let marking = Marking::new(["start"]);
        let mut log = Vec::new();

        let key = CallbackKey::qualified("merging", EventKind::Transition, "submit");
        assert!(registry.fire(&key, &mut log, &event(&transition, &marking)));
        assert_eq!(log, vec!["transition:submit".to_string()]);
    }

    #[test]
    fn test_missing_key_is_noop() {
        let registry = CallbackRegistry::<Vec<String>>::new();
        let transition = Transition::new("submit", ["start"], ["test"]);
        let marking = Marking::default();
        let mut log = Vec::new();

        let fired = registry.fire(
            &CallbackKey::global(EventKind::Leave),
            &mut log,
            &event(&transition, &marking),
        );
        assert!(!fired);
        assert!(log.is_empty());
    }

    #[test]
    fn test_on_replaces_previous_callback() {
        let mut registry = CallbackRegistry::<u32>::new();
        registry.on(EventKind::Leave, |n: &mut u32, _: &TransitionEvent<'_>| *n += 1);
        registry.on(EventKind::Leave, |n: &mut u32, _: &TransitionEvent<'_>| *n += 10);
        assert_eq!(registry.len(), 1);

        let transition = Transition::new("submit", ["start"], ["test"]);
        let marking = Marking::default();
        let mut count = 0;
        registry.fire(
            &CallbackKey::global(EventKind::Leave),
            &mut count,
            &event(&transition, &marking),
        );
        assert_eq!(count, 10);
    }

    #[test]
    fn test_on_str_parses_dotted_keys() {
        let mut registry = CallbackRegistry::<()>::new();
        registry
            .on_str("workflow.review.transition.publish", |_: &mut (), _: &TransitionEvent<'_>| {})
            .unwrap();
        assert!(registry.contains(&CallbackKey::qualified(
            "review",
            EventKind::Transition,
            "publish"
        )));

        let result = registry.on_str("review.publish", |_: &mut (), _: &TransitionEvent<'_>| {});
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_debug_lists_sorted_keys() {
        let registry = CallbackRegistry::<()>::new()
            .with(EventKind::Enter, |_: &mut (), _: &TransitionEvent<'_>| {})
            .with(EventKind::Announce, |_: &mut (), _: &TransitionEvent<'_>| {});
        let debug = format!("{:?}", registry);
        assert!(debug.contains(r#"["workflow.announce", "workflow.enter"]"#));
    }
}
