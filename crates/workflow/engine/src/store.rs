//! Marking stores: how the engine reads and writes a subject's marking
//!
//! The engine never owns subjects. A [`MarkingStore`] owns the relationship
//! between a subject and its marking and is the single source of truth for
//! it. Two strategies ship with the engine:
//!
//! - [`InMemoryMarkingStore`] keeps markings in a map keyed by the
//!   subject's identity, for subject types that cannot carry a marking.
//! - [`SubjectMarkingStore`] delegates to subjects implementing
//!   [`MarkedSubject`].
//!
//! Both satisfy read-your-writes: a `get_marking` right after a
//! `set_marking` for the same subject sees exactly the marking just set.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use workflow_types::{Marking, WorkflowError, WorkflowResult};

/// Reads and persists the marking of a subject.
///
/// An empty marking means "not initialised yet"; the workflow seeds it with
/// the definition's initial places.
pub trait MarkingStore<S> {
    fn get_marking(&self, subject: &S) -> WorkflowResult<Marking>;

    fn set_marking(&self, subject: &mut S, marking: Marking) -> WorkflowResult<()>;
}

impl<S, M: MarkingStore<S> + ?Sized> MarkingStore<S> for &M {
    fn get_marking(&self, subject: &S) -> WorkflowResult<Marking> {
        (**self).get_marking(subject)
    }

    fn set_marking(&self, subject: &mut S, marking: Marking) -> WorkflowResult<()> {
        (**self).set_marking(subject, marking)
    }
}

impl<S, M: MarkingStore<S> + ?Sized> MarkingStore<S> for Arc<M> {
    fn get_marking(&self, subject: &S) -> WorkflowResult<Marking> {
        (**self).get_marking(subject)
    }

    fn set_marking(&self, subject: &mut S, marking: Marking) -> WorkflowResult<()> {
        (**self).set_marking(subject, marking)
    }
}

impl<S, M: MarkingStore<S> + ?Sized> MarkingStore<S> for Box<M> {
    fn get_marking(&self, subject: &S) -> WorkflowResult<Marking> {
        (**self).get_marking(subject)
    }

    fn set_marking(&self, subject: &mut S, marking: Marking) -> WorkflowResult<()> {
        (**self).set_marking(subject, marking)
    }
}

// ── In-memory store ──────────────────────────────────────────────────

/// Keeps markings in memory, keyed by the subject value itself.
///
/// Subjects that compare equal share one marking: two distinct orders
/// represented by the same value overwrite each other's state. Use a
/// value that is unique per subject (an order id, a document handle),
/// never a field that several subjects may hold. A subject that was
/// never stored reads as an empty marking.
/// Each call locks on its own; a read-modify-write across calls is not
/// atomic.
#[derive(Debug)]
pub struct InMemoryMarkingStore<S> {
    markings: RwLock<HashMap<S, Marking>>,
}

impl<S: Eq + Hash + Clone> InMemoryMarkingStore<S> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            markings: RwLock::new(HashMap::new()),
        }
    }

    /// Whether a marking has been stored for `subject`
    pub fn contains(&self, subject: &S) -> WorkflowResult<bool> {
        let markings = self
            .markings
            .read()
            .map_err(|_| WorkflowError::LockPoisoned)?;
        Ok(markings.contains_key(subject))
    }

    /// Drop the marking of a discarded subject
    pub fn forget(&self, subject: &S) -> WorkflowResult<Option<Marking>> {
        let mut markings = self
            .markings
            .write()
            .map_err(|_| WorkflowError::LockPoisoned)?;
        Ok(markings.remove(subject))
    }

    /// Number of subjects with a stored marking
    pub fn len(&self) -> WorkflowResult<usize> {
        let markings = self
            .markings
            .read()
            .map_err(|_| WorkflowError::LockPoisoned)?;
        Ok(markings.len())
    }
}

impl<S: Eq + Hash + Clone> Default for InMemoryMarkingStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Eq + Hash + Clone> MarkingStore<S> for InMemoryMarkingStore<S> {
    fn get_marking(&self, subject: &S) -> WorkflowResult<Marking> {
        let markings = self
            .markings
            .read()
            .map_err(|_| WorkflowError::LockPoisoned)?;
        Ok(markings.get(subject).cloned().unwrap_or_default())
    }

    fn set_marking(&self, subject: &mut S, marking: Marking) -> WorkflowResult<()> {
        let mut markings = self
            .markings
            .write()
            .map_err(|_| WorkflowError::LockPoisoned)?;
        markings.insert(subject.clone(), marking);
        Ok(())
    }
}

// ── Delegating store ─────────────────────────────────────────────────

/// A subject that carries its own marking
pub trait MarkedSubject {
    /// The subject's current marking; empty if it has none yet
    fn marking(&self) -> WorkflowResult<Marking>;

    /// Replace the subject's marking
    fn set_marking(&mut self, marking: Marking) -> WorkflowResult<()>;
}

/// Forwards to the subject's own [`MarkedSubject`] implementation
#[derive(Clone, Copy, Debug, Default)]
pub struct SubjectMarkingStore;

impl SubjectMarkingStore {
    pub fn new() -> Self {
        Self
    }
}

impl<S: MarkedSubject> MarkingStore<S> for SubjectMarkingStore {
    fn get_marking(&self, subject: &S) -> WorkflowResult<Marking> {
        subject.marking()
    }

    fn set_marking(&self, subject: &mut S, marking: Marking) -> WorkflowResult<()> {
        subject.set_marking(marking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::Place;

    #[derive(Debug, Default)]
    struct Document {
        marking: Option<Marking>,
    }

    impl MarkedSubject for Document {
        fn marking(&self) -> WorkflowResult<Marking> {
            Ok(self.marking.clone().unwrap_or_default())
        }

        fn set_marking(&mut self, marking: Marking) -> WorkflowResult<()> {
            self.marking = Some(marking);
            Ok(())
        }
    }

    struct Detached;

    impl MarkedSubject for Detached {
        fn marking(&self) -> WorkflowResult<Marking> {
            Err(WorkflowError::MarkingNotFound("detached subject".into()))
        }

        fn set_marking(&mut self, _marking: Marking) -> WorkflowResult<()> {
            Err(WorkflowError::MarkingNotFound("detached subject".into()))
        }
    }

    #[test]
    fn test_in_memory_absent_subject_is_empty() {
        let store = InMemoryMarkingStore::<u64>::new();
        assert!(store.get_marking(&7).unwrap().is_empty());
        assert!(!store.contains(&7).unwrap());
    }

    #[test]
    fn test_in_memory_read_your_writes() {
        let store = InMemoryMarkingStore::<String>::new();
        let mut order = "order-1".to_string();

        store
            .set_marking(&mut order, Marking::new(["start"]))
            .unwrap();
        assert_eq!(store.get_marking(&order).unwrap(), Marking::new(["start"]));

        store.set_marking(&mut order, Marking::new(["test"])).unwrap();
        assert_eq!(store.get_marking(&order).unwrap(), Marking::new(["test"]));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_in_memory_subjects_are_isolated() {
        let store = InMemoryMarkingStore::<u32>::new();
        let (mut a, mut b) = (1u32, 2u32);

        store.set_marking(&mut a, Marking::new(["start"])).unwrap();
        store.set_marking(&mut b, Marking::new(["closed"])).unwrap();

        let mut marking_a = store.get_marking(&a).unwrap();
        marking_a.mark("merged");

        assert!(!store.get_marking(&a).unwrap().has(&Place::from("merged")));
        assert_eq!(store.get_marking(&b).unwrap(), Marking::new(["closed"]));
    }

    #[test]
    fn test_in_memory_equal_subjects_share_marking() {
        let store = InMemoryMarkingStore::<String>::new();
        let (mut first, mut second) = ("order-9".to_string(), "order-9".to_string());

        store.set_marking(&mut first, Marking::new(["start"])).unwrap();
        store.set_marking(&mut second, Marking::new(["closed"])).unwrap();

        assert_eq!(store.get_marking(&first).unwrap(), Marking::new(["closed"]));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_in_memory_poisoned_lock() {
        let store = Arc::new(InMemoryMarkingStore::<u32>::new());
        let writer = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = writer.markings.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.get_marking(&1), Err(WorkflowError::LockPoisoned)));
        assert!(matches!(
            store.set_marking(&mut 1, Marking::new(["start"])),
            Err(WorkflowError::LockPoisoned)
        ));
        assert!(matches!(store.len(), Err(WorkflowError::LockPoisoned)));
    }

    #[test]
    fn test_in_memory_forget() {
        let store = InMemoryMarkingStore::<u8>::new();
        let mut id = 3u8;
        store.set_marking(&mut id, Marking::new(["draft"])).unwrap();

        assert_eq!(store.forget(&id).unwrap(), Some(Marking::new(["draft"])));
        assert!(store.get_marking(&id).unwrap().is_empty());
        assert_eq!(store.forget(&id).unwrap(), None);
    }

    #[test]
    fn test_shared_store_through_arc() {
        let store = Arc::new(InMemoryMarkingStore::<i64>::new());
        let shared = Arc::clone(&store);
        let mut id = 9i64;

        shared.set_marking(&mut id, Marking::new(["review"])).unwrap();
        assert_eq!(
            MarkingStore::get_marking(&store, &id).unwrap(),
            Marking::new(["review"])
        );
    }

    #[test]
    fn test_subject_store_delegates() {
        let store = SubjectMarkingStore::new();
        let mut doc = Document::default();

        assert!(MarkingStore::get_marking(&store, &doc).unwrap().is_empty());
        MarkingStore::set_marking(&store, &mut doc, Marking::new(["draft"])).unwrap();
        assert_eq!(doc.marking, Some(Marking::new(["draft"])));
        assert_eq!(
            MarkingStore::get_marking(&store, &doc).unwrap(),
            Marking::new(["draft"])
        );
    }

    #[test]
    fn test_subject_store_not_found() {
        let store = SubjectMarkingStore;
        let result = MarkingStore::get_marking(&store, &Detached);
        assert!(matches!(result, Err(WorkflowError::MarkingNotFound(_))));
    }
}
