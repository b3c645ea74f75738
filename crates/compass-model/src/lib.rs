//! Compass domain model
//!
//! Records for the counseling roadmap system, split into two families:
//! - Templates ([`Roadmap`], [`CounselorMeetingTemplate`], [`AgendaItemTemplate`],
//!   [`TaskTemplate`]): immutable administrative configuration.
//! - Instances ([`CounselorMeeting`], [`AgendaItem`], [`Task`],
//!   [`StudentUniversityDecision`]): mutable per-student records, optionally
//!   linked back to the template they were instantiated from.
//!
//! The link is informational only: editing a template never retroactively
//! changes instances. Tracker rule maps on task templates compile into typed
//! predicate/assignment objects before evaluation.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod actor;
pub mod error;
pub mod ids;
pub mod instance;
pub mod template;
pub mod tracker;

// Re-exports for convenience
pub use actor::{Actor, Counselor, Student};
pub use error::TrackerConfigError;
pub use ids::{
    AgendaItemId, AgendaItemTemplateId, CounselorId, DecisionId, MeetingId, MeetingTemplateId,
    RoadmapId, SchoolId, StudentId, TaskId, TaskTemplateId,
};
pub use instance::{AgendaItem, CounselorMeeting, Task, TaskStatus};
pub use template::{
    AgendaItemTemplate, CounselorMeetingTemplate, Roadmap, TaskTemplate, TaskTiming,
};
pub use tracker::{
    DecisionPredicate, PredicateClause, RawRuleMap, StudentUniversityDecision, TrackerAssignment,
    TrackerField, TrackerRules, TrackerStatus, SCHOOL_ID_KEY,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Compass model
    pub use crate::{
        Actor, AgendaItem, AgendaItemTemplate, Counselor, CounselorMeeting,
        CounselorMeetingTemplate, Roadmap, Student, StudentUniversityDecision, Task, TaskStatus,
        TaskTemplate, TaskTiming, TrackerField, TrackerStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
