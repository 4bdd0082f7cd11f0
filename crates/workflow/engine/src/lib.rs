//! Workflow transition engine
//!
//! The engine answers two questions for a subject: may this transition
//! fire now (`can`), and fire it (`apply`). It never owns subjects; a
//! [`MarkingStore`] reads and writes their markings, and callbacks let
//! host code observe each phase of a transition.
//!
//! # Architecture
//!
//! - [`Workflow`]: binds a definition, a store and callbacks; runs the
//!   transition protocol
//! - [`MarkingStore`]: how markings are read and persisted
//!   ([`InMemoryMarkingStore`], [`SubjectMarkingStore`])
//! - [`CallbackRegistry`]: exact-match map from [`CallbackKey`] to callback
//!
//! # Example
//!
//! ```rust
//! use workflow_engine::{CallbackRegistry, InMemoryMarkingStore, Workflow};
//! use workflow_types::{Definition, Marking, Transition};
//!
//! let definition = Definition::must_new(
//!     ["start", "test", "review"],
//!     ["start"],
//!     vec![
//!         Transition::new("submit", ["start"], ["test"]),
//!         Transition::new("wait_for_review", ["test"], ["review"]),
//!     ],
//! );
//! let workflow = Workflow::new(
//!     "merging",
//!     definition,
//!     InMemoryMarkingStore::<u64>::new(),
//!     CallbackRegistry::new(),
//! )
//! .unwrap();
//!
//! let mut pull_request = 42u64;
//! assert!(workflow.can(&mut pull_request, "submit"));
//! workflow.apply(&mut pull_request, "submit").unwrap();
//! assert_eq!(workflow.get_marking(&mut pull_request).unwrap(), Marking::new(["test"]));
//! ```
//!
//! [`CallbackKey`]: workflow_types::CallbackKey

#![deny(unsafe_code)]

pub mod callbacks;
pub mod store;
pub mod workflow;

// Re-export main types
pub use callbacks::{Callback, CallbackRegistry, TransitionEvent};
pub use store::{InMemoryMarkingStore, MarkedSubject, MarkingStore, SubjectMarkingStore};
pub use workflow::Workflow;
