//! Status and confirmation message types for operation feedback.

use std::fmt;

/// Outcome severity of an [`OperationStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Warning,
    Failure,
}

/// Wrapper type for displaying one-line operation feedback.
///
/// Warnings are used for work that happened locally but was not fully
/// confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatus {
    pub message: String,
    pub kind: StatusKind,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Warning,
        }
    }

    /// Create a new failure status.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            StatusKind::Success => "Success:",
            StatusKind::Warning => "Warning:",
            StatusKind::Failure => "Error:",
        };
        writeln!(f, "{label} {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        let success = OperationStatus::success("Operation completed");
        assert!(format!("{success}").contains("Success:"));
        assert!(success.is_success());

        let warning = OperationStatus::warning("Using offline data");
        assert_eq!(format!("{warning}"), "Warning: Using offline data\n");

        let failure = OperationStatus::failure("Operation failed");
        assert!(format!("{failure}").contains("Error:"));
        assert!(!failure.is_success());
    }
}
