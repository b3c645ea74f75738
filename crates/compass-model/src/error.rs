//! Model-level error types
//!
//! Tracker rule maps are admin-entered configuration, so a malformed map is an
//! operator problem rather than an end-user one. The service layer logs these
//! and lets the triggering action succeed.

/// Errors compiling the raw tracker rule maps on a task template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerConfigError {
    /// Filter or update map references a field that does not exist on
    /// [`StudentUniversityDecision`](crate::tracker::StudentUniversityDecision)
    #[error("unknown tracker field: {0}")]
    UnknownField(String),

    /// Value is not a member of the closed status set for the field
    #[error("unknown tracker status `{value}` for field {field}")]
    UnknownStatus {
        /// Field the value was configured for
        field: String,
        /// The unrecognized value
        value: String,
    },

    /// `school_id` filter value is not a valid school identifier
    #[error("invalid school id in tracker filter: {0}")]
    InvalidSchoolId(String),
}
