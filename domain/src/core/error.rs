//! Domain error types

use thiserror::Error;

/// Errors raised by council operations.
///
/// The variants follow the council's error taxonomy:
///
/// | Variant | Raised when |
/// |---------|-------------|
/// | `Validation` | Input is missing or malformed (empty question, empty team, unset first speaker, wrong mode) |
/// | `Authorization` | An agent attempts something reserved for another role |
/// | `NotFound` | A referenced agent does not resolve to an active participant |
/// | `Conflict` | The operation collides with current state (vote already open, session running) |
/// | `Precondition` | The target state machine is not in a state that accepts the operation |
/// | `Transient` | An external call (agent response, persistence) failed |
/// | `Shutdown` | The council actor is no longer processing commands |
///
/// `Validation` and `Conflict` are always returned before any state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouncilError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Council is shut down")]
    Shutdown,
}

impl CouncilError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Whether this error pauses a running session rather than rejecting a command.
    pub fn pauses_session(&self) -> bool {
        matches!(self, CouncilError::NotFound(_) | CouncilError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CouncilError::validation("vote question is empty").to_string(),
            "Validation error: vote question is empty"
        );
        assert_eq!(CouncilError::Shutdown.to_string(), "Council is shut down");
    }

    #[test]
    fn test_pauses_session() {
        assert!(CouncilError::not_found("no valid next speaker").pauses_session());
        assert!(CouncilError::transient("timeout").pauses_session());
        assert!(!CouncilError::conflict("vote open").pauses_session());
        assert!(!CouncilError::validation("empty").pauses_session());
    }
}
