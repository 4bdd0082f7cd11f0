//! Workflow Domain Types
//!
//! Workflows here are marking-based state machines: a subject occupies a
//! set of places, and named transitions move it between them.
//!
//! # Key Concepts
//!
//! - **Place**: a named state a subject can occupy.
//! - **Transition**: a named move from a list of source places to a list
//!   of destination places.
//! - **Definition**: the immutable, validated graph of places, initial
//!   places and transitions for one workflow kind.
//! - **Marking**: the set of places currently active for one subject.
//!   Several places may be active at once after a fork.
//! - **CallbackKey**: a structured key naming a point of the transition
//!   lifecycle a host can listen to.
//!
//! # Enabling Rule
//!
//! A transition is enabled when the marking holds **at least one** of its
//! source places. This is an OR-join, not the AND-join of a strict Petri
//! net.

#![deny(unsafe_code)]

mod callback_key;
mod definition;
mod errors;
mod marking;
mod place;
mod transition;

pub use callback_key::*;
pub use definition::*;
pub use errors::*;
pub use marking::*;
pub use place::*;
pub use transition::*;
