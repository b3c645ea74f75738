//! Error types for the roadmap services
//!
//! Validation and not-found failures surface before any persistence happens;
//! store failures mean the enclosing transaction rolled back. Malformed
//! tracker configuration is deliberately NOT here; it is logged and swallowed
//! so a student completing a task never sees an admin's typo.

use compass_store::StoreError;

/// Main error type for roadmap application, task transitions, and scheduling
#[derive(Debug, thiserror::Error)]
pub enum RoadmapError {
    /// Malformed selection payload, duplicate application, or other
    /// caller-correctable problem
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind
        kind: &'static str,
        /// Looked-up id
        id: String,
    },

    /// Meeting scheduling misuse (scheduling twice, cancelling the cancelled)
    #[error("scheduling error: {0}")]
    Scheduling(String),

    /// The store rejected a write; the transaction was rolled back
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RoadmapError {
    /// Shorthand for a not-found error
    #[inline]
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether the caller can fix this by changing their request
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Scheduling(_)
        )
    }
}
