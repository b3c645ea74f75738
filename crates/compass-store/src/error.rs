//! Store error types

/// Errors raised by the record store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with this id already exists
    #[error("duplicate {kind} record: {id}")]
    Duplicate {
        /// Record kind
        kind: &'static str,
        /// Offending id
        id: String,
    },

    /// Record does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind
        kind: &'static str,
        /// Looked-up id
        id: String,
    },

    /// A record references another record that does not exist
    #[error("missing {kind} reference: {id}")]
    MissingReference {
        /// Referenced record kind
        kind: &'static str,
        /// Referenced id
        id: String,
    },

    /// A cross-record invariant does not hold
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// Simulated persistence failure (test fault injection)
    #[error("injected storage fault")]
    FaultInjected,
}
