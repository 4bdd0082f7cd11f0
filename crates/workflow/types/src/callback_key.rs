//! Callback keys: where in the transition lifecycle a callback listens
//!
//! Keys form a small hierarchy:
//!
//! ```text
//! workflow.<event>                         every workflow
//! workflow.<name>.<event>                  one workflow
//! workflow.<name>.<event>.<qualifier>      one place or transition of it
//! ```
//!
//! The qualifier is a place for `leave`, `enter` and `entered`, and a
//! transition name for `transition`, `completed` and `announce`. Keys are
//! matched exactly; there are no wildcards.

use crate::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const ROOT: &str = "workflow";

/// The lifecycle phases a transition goes through, in firing order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Source places are about to be left
    Leave,
    /// The transition is firing
    Transition,
    /// Destination places are about to be entered
    Enter,
    /// Destination places were entered and the marking persisted
    Entered,
    /// The transition finished
    Completed,
    /// Transitions enabled by the new marking are announced
    Announce,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Leave,
        EventKind::Transition,
        EventKind::Enter,
        EventKind::Entered,
        EventKind::Completed,
        EventKind::Announce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Leave => "leave",
            EventKind::Transition => "transition",
            EventKind::Enter => "enter",
            EventKind::Entered => "entered",
            EventKind::Completed => "completed",
            EventKind::Announce => "announce",
        }
    }

    /// Whether qualifiers of this kind name places (as opposed to transitions)
    pub fn qualifies_places(&self) -> bool {
        matches!(
            self,
            EventKind::Leave | EventKind::Enter | EventKind::Entered
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> WorkflowResult<Self> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| WorkflowError::InvalidCallbackKey(format!("unknown event {:?}", s)))
    }
}

// ── Callback Key ─────────────────────────────────────────────────────

/// A structured callback key.
///
/// A qualifier is only ever present together with a workflow name; the
/// constructors are the only way to build a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackKey {
    workflow: Option<String>,
    kind: EventKind,
    qualifier: Option<String>,
}

impl CallbackKey {
    /// `workflow.<event>`: fires for every workflow
    pub fn global(kind: EventKind) -> Self {
        Self {
            workflow: None,
            kind,
            qualifier: None,
        }
    }

    /// `workflow.<name>.<event>`
    pub fn workflow(workflow: impl Into<String>, kind: EventKind) -> Self {
        Self {
            workflow: Some(workflow.into()),
            kind,
            qualifier: None,
        }
    }

    /// `workflow.<name>.<event>.<qualifier>`
    pub fn qualified(
        workflow: impl Into<String>,
        kind: EventKind,
        qualifier: impl Into<String>,
    ) -> Self {
        Self {
            workflow: Some(workflow.into()),
            kind,
            qualifier: Some(qualifier.into()),
        }
    }

    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow.as_deref()
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_global(&self) -> bool {
        self.workflow.is_none()
    }
}

impl std::fmt::Display for CallbackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(ROOT)?;
        if let Some(workflow) = &self.workflow {
            write!(f, ".{}", workflow)?;
        }
        write!(f, ".{}", self.kind)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, ".{}", qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for CallbackKey {
    type Err = WorkflowError;

    /// Parse the dotted form. Qualifiers may themselves contain dots;
    /// workflow names may not.
    fn from_str(s: &str) -> WorkflowResult<Self> {
        let invalid = || WorkflowError::InvalidCallbackKey(s.to_string());

        let mut parts = s.splitn(4, '.');
        if parts.next() != Some(ROOT) {
            return Err(invalid());
        }
        let second = parts.next().ok_or_else(invalid)?;
        let Some(third) = parts.next() else {
            return Ok(Self::global(second.parse()?));
        };
        if second.is_empty() {
            return Err(invalid());
        }
        let kind: EventKind = third.parse()?;
        match parts.next() {
            None => Ok(Self::workflow(second, kind)),
            Some("") => Err(invalid()),
            Some(qualifier) => Ok(Self::qualified(second, kind, qualifier)),
        }
    }
}

impl From<EventKind> for CallbackKey {
    fn from(kind: EventKind) -> Self {
        Self::global(kind)
    }
}
