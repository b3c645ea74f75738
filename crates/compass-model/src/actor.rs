//! Students and counselors
//!
//! Only the slice of the user model this workspace needs: identity, the
//! student-counselor pairing, and the record of which roadmaps have been
//! applied (drives the duplicate-application check).

use crate::ids::{CounselorId, RoadmapId, StudentId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A student receiving counseling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student identifier
    pub id: StudentId,
    /// Display name
    pub name: String,
    /// Assigned counselor, if any
    pub counselor: Option<CounselorId>,
    /// Roadmaps currently applied to this student
    pub applied_roadmaps: IndexSet<RoadmapId>,
}

impl Student {
    /// Create a student with no counselor
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StudentId::new(),
            name: name.into(),
            counselor: None,
            applied_roadmaps: IndexSet::new(),
        }
    }

    /// With an assigned counselor
    #[inline]
    #[must_use]
    pub fn with_counselor(mut self, counselor: CounselorId) -> Self {
        self.counselor = Some(counselor);
        self
    }

    /// Whether a roadmap is currently applied
    #[inline]
    #[must_use]
    pub fn has_applied(&self, roadmap: RoadmapId) -> bool {
        self.applied_roadmaps.contains(&roadmap)
    }
}

/// A counselor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counselor {
    /// Counselor identifier
    pub id: CounselorId,
    /// Display name
    pub name: String,
}

impl Counselor {
    /// Create a counselor
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CounselorId::new(),
            name: name.into(),
        }
    }
}

/// Who performed an action; affects due-date defaulting and who gets notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// The student themselves
    Student(StudentId),
    /// A counselor
    Counselor(CounselorId),
}

impl Actor {
    /// Whether the actor is a student
    #[inline]
    #[must_use]
    pub fn is_student(&self) -> bool {
        matches!(self, Actor::Student(_))
    }
}
