//! Error types for the Workflow layer

use crate::Place;

/// Errors that can occur in Workflow operations
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Place {place} referenced in transition {transition} does not exist")]
    UnknownTransitionPlace { place: Place, transition: String },

    #[error("Place {0} cannot be an initial place as it does not exist")]
    UnknownInitialPlace(Place),

    #[error("Duplicate transition: {0}")]
    DuplicateTransition(String),

    #[error("Invalid workflow name: {0:?}")]
    InvalidWorkflowName(String),

    #[error("Callback key does not match this workflow: {0}")]
    UnknownCallbackTarget(String),

    #[error("Invalid callback key: {0}")]
    InvalidCallbackKey(String),

    #[error("Definition could not be decoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transition not defined: {0}")]
    UndefinedTransition(String),

    #[error("Transition {transition} not enabled from marking {marking:?}")]
    TransitionNotEnabled {
        transition: String,
        marking: Vec<Place>,
    },

    #[error("Marking not found: {0}")]
    MarkingNotFound(String),

    #[error("Marking store lock poisoned")]
    LockPoisoned,
}

impl WorkflowError {
    /// Whether this error was raised while building a definition or workflow
    /// rather than while running a transition.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::UnknownTransitionPlace { .. }
                | WorkflowError::UnknownInitialPlace(_)
                | WorkflowError::DuplicateTransition(_)
                | WorkflowError::InvalidWorkflowName(_)
                | WorkflowError::UnknownCallbackTarget(_)
                | WorkflowError::InvalidCallbackKey(_)
                | WorkflowError::Serialization(_)
        )
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = WorkflowError::UnknownTransitionPlace {
            place: Place::from("nowhere"),
            transition: "submit".into(),
        };
        assert_eq!(
            err.to_string(),
            "Place nowhere referenced in transition submit does not exist"
        );
        assert_eq!(
            WorkflowError::UndefinedTransition("publish".into()).to_string(),
            "Transition not defined: publish"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(WorkflowError::DuplicateTransition("submit".into()).is_validation());
        assert!(WorkflowError::InvalidCallbackKey("workflow.nope".into()).is_validation());
        assert!(!WorkflowError::LockPoisoned.is_validation());
        assert!(!WorkflowError::TransitionNotEnabled {
            transition: "accept".into(),
            marking: vec![Place::from("start")],
        }
        .is_validation());
    }
}
