use thiserror::Error;

/// Closed error taxonomy for the engine.
///
/// Partial evidence is preferred over failure: collaborator timeouts degrade
/// the affected tier to inconclusive/Info instead of surfacing here. Only
/// context validation and total collaborator unavailability fail a request.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or unknown case facts. Client error, never retried.
    #[error("invalid case context: {field}: {reason}")]
    InvalidCaseContext { field: String, reason: String },

    /// Malformed feedback submission (missing session or precedent id).
    #[error("invalid feedback: {field}: {reason}")]
    InvalidFeedback { field: String, reason: String },

    /// A single collaborator call exceeded its deadline. Transient.
    #[error("collaborator timed out: {collaborator}")]
    CollaboratorTimeout { collaborator: String },

    /// Every collaborator failed; no partial result was computable.
    #[error("all collaborators unavailable")]
    CollaboratorUnavailable,

    /// Feedback storage reported a write conflict after the retry budget.
    #[error("feedback write conflict")]
    FeedbackConflict,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    pub fn invalid_context(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCaseContext {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_feedback(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFeedback {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
