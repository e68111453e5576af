//! Error types for the planner library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The request could not be sent or no response was received
    #[error("Network unavailable: {message}")]
    NetworkUnavailable { message: String },
    /// The record store answered with a non-2xx status
    #[error("Server rejected request with status {status}: {body}")]
    ServerRejected { status: u16, body: String },
    /// No local "me" user id is registered for the plan
    #[error("No local identity registered for plan {plan_id}")]
    MissingIdentity { plan_id: String },
    /// A task or plan title was empty
    #[error("Title must not be empty")]
    InvalidTitle,
    /// The task was written but its parent could not be linked to it
    #[error("Task {task_id} was created but linking it to parent {parent_id} failed: {source}")]
    PartialWrite {
        task_id: String,
        parent_id: String,
        #[source]
        source: Box<PlannerError>,
    },
    /// The operation target is absent from the local tree
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: String },
    /// Local persistent store errors
    #[error("Local store error: {message}")]
    LocalStore {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating local store errors with optional context.
pub struct LocalStoreErrorBuilder {
    message: String,
}

impl LocalStoreErrorBuilder {
    /// Create a new local store error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> PlannerError {
        PlannerError::LocalStore {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlannerError {
        PlannerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlannerError {
    /// Creates a builder for local store errors.
    pub fn local_store(message: impl Into<String>) -> LocalStoreErrorBuilder {
        LocalStoreErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Not-found error for a plan id.
    pub fn plan_not_found(id: impl Into<String>) -> Self {
        PlannerError::NotFound {
            kind: "Plan",
            id: id.into(),
        }
    }

    /// Not-found error for a task id.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        PlannerError::NotFound {
            kind: "Task",
            id: id.into(),
        }
    }

    /// Not-found error for a plan user id.
    pub fn user_not_found(id: impl Into<String>) -> Self {
        PlannerError::NotFound {
            kind: "User",
            id: id.into(),
        }
    }

    /// Whether the caller may treat this error as a warning.
    ///
    /// Partial writes leave local state consistent with what was attempted,
    /// and transport failures never corrupt prior state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlannerError::PartialWrite { .. }
                | PlannerError::NetworkUnavailable { .. }
                | PlannerError::ServerRejected { .. }
        )
    }

    /// Whether the server answered that the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlannerError::ServerRejected { status: 404, .. })
    }
}

/// Extension trait for Result to provide concise error mapping with
/// anyhow-style context.
pub trait ResultExt<T, E> {
    /// Add context to any error type, converting to PlannerError.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

/// Specialized extension trait for local store Results.
pub trait LocalStoreResultExt<T> {
    /// Map SQLite errors with a message.
    fn store_context(self, message: &str) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| PlannerError::Configuration {
            message: format!("{}: {}", context, e),
        })
    }
}

impl<T> LocalStoreResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn store_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlannerError::local_store(message).with_source(e))
    }
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let partial = PlannerError::PartialWrite {
            task_id: "t1".to_string(),
            parent_id: "p1".to_string(),
            source: Box::new(PlannerError::NetworkUnavailable {
                message: "connection refused".to_string(),
            }),
        };
        assert!(partial.is_recoverable());
        assert!(PlannerError::ServerRejected {
            status: 500,
            body: "boom".to_string()
        }
        .is_recoverable());
        assert!(!PlannerError::InvalidTitle.is_recoverable());
        assert!(!PlannerError::task_not_found("x").is_recoverable());
    }

    #[test]
    fn test_server_not_found() {
        let gone = PlannerError::ServerRejected {
            status: 404,
            body: "Not found".to_string(),
        };
        assert!(gone.is_not_found());
        assert!(!PlannerError::ServerRejected {
            status: 500,
            body: "boom".to_string()
        }
        .is_not_found());
        assert!(!PlannerError::task_not_found("x").is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = PlannerError::ServerRejected {
            status: 404,
            body: "Not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server rejected request with status 404: Not found"
        );

        let err = PlannerError::plan_not_found("abc");
        assert_eq!(err.to_string(), "Plan with ID abc not found");

        let err = PlannerError::invalid_input("email").with_reason("not an address");
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'email': not an address"
        );
    }

    #[test]
    fn test_with_context_maps_to_configuration() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk on fire",
        ));
        match io.with_context("Failed to prepare") {
            Err(PlannerError::Configuration { message }) => {
                assert_eq!(message, "Failed to prepare: disk on fire");
            }
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }
}
