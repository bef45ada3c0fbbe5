//! Status messages for operation feedback.

use std::fmt;

/// One-line confirmation for store operations (save, delete).
pub struct OperationStatus {
    pub message: String,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success: {}", self.message)
    }
}
