//! Instance records: concrete per-student meetings, agenda items, and tasks
//!
//! Instances are created by roadmap application (template-derived) or ad hoc
//! by a counselor (template ref absent). The template reference is
//! informational only; instances own their copied content.

use crate::ids::{
    AgendaItemId, AgendaItemTemplateId, CounselorId, MeetingId, MeetingTemplateId, SchoolId,
    StudentId, TaskId, TaskTemplateId,
};
use crate::template::{AgendaItemTemplate, CounselorMeetingTemplate, TaskTemplate, TaskTiming};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Created, not yet assigned to anyone
    #[default]
    Open,
    /// Assigned and in progress
    Assigned,
    /// Done
    Completed,
}

impl TaskStatus {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Assigned => "assigned",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete scheduled (or not yet scheduled) meeting between a student and
/// their counselor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounselorMeeting {
    /// Meeting identifier
    pub id: MeetingId,
    /// Student the meeting is with
    pub student: StudentId,
    /// Counselor holding the meeting
    pub counselor: CounselorId,
    /// Template this meeting was instantiated from, if any
    pub template: Option<MeetingTemplateId>,
    /// Meeting title
    pub title: String,
    /// Meeting description
    pub description: String,
    /// Scheduled start; unset until the counselor schedules it
    pub start: Option<DateTime<Utc>>,
    /// Scheduled end
    pub end: Option<DateTime<Utc>>,
    /// When the meeting was cancelled, if it was
    pub cancelled: Option<DateTime<Utc>>,
}

impl CounselorMeeting {
    /// Create an ad-hoc meeting with no template
    #[inline]
    #[must_use]
    pub fn new(student: StudentId, counselor: CounselorId, title: impl Into<String>) -> Self {
        Self {
            id: MeetingId::new(),
            student,
            counselor,
            template: None,
            title: title.into(),
            description: String::new(),
            start: None,
            end: None,
            cancelled: None,
        }
    }

    /// Instantiate a meeting from a template, copying title and description
    ///
    /// Scheduling metadata stays unset; the actual date is picked later by the
    /// counselor, never derived from the template.
    #[must_use]
    pub fn from_template(
        student: StudentId,
        counselor: CounselorId,
        template: &CounselorMeetingTemplate,
    ) -> Self {
        Self {
            id: MeetingId::new(),
            student,
            counselor,
            template: Some(template.id),
            title: template.title.clone(),
            description: template.description.clone(),
            start: None,
            end: None,
            cancelled: None,
        }
    }

    /// Override the copied title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether a start time has been set
    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.start.is_some()
    }

    /// Whether the meeting was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }
}

/// Concrete agenda line on one meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    /// Agenda item identifier
    pub id: AgendaItemId,
    /// Meeting this line belongs to
    pub meeting: MeetingId,
    /// Template this line was instantiated from, if any
    pub template: Option<AgendaItemTemplateId>,
    /// Line title
    pub title: String,
    /// Line description
    pub description: String,
    /// Position within the meeting agenda
    pub order: u32,
}

impl AgendaItem {
    /// Create a custom agenda item with no template
    #[inline]
    #[must_use]
    pub fn custom(meeting: MeetingId, title: impl Into<String>, order: u32) -> Self {
        Self {
            id: AgendaItemId::new(),
            meeting,
            template: None,
            title: title.into(),
            description: String::new(),
            order,
        }
    }

    /// Instantiate an agenda item from a template
    #[must_use]
    pub fn from_template(meeting: MeetingId, template: &AgendaItemTemplate) -> Self {
        Self {
            id: AgendaItemId::new(),
            meeting,
            template: Some(template.id),
            title: template.title.clone(),
            description: template.description.clone(),
            order: template.order,
        }
    }

    /// Override the copied title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Concrete actionable item for a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Student the task is for
    pub student: StudentId,
    /// Template this task was instantiated from, if any
    pub template: Option<TaskTemplateId>,
    /// Agenda items referencing this task (several, when a shared task
    /// template appears on more than one applied agenda item)
    pub agenda_items: Vec<AgendaItemId>,
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
    /// Pre/post meeting flag copied from the template
    pub timing: Option<TaskTiming>,
    /// Lifecycle status
    pub status: TaskStatus,
    /// Schools this task explicitly relates to; narrows tracker propagation
    pub schools: Vec<SchoolId>,
    /// Due date
    pub due: Option<DateTime<Utc>>,
    /// When the task was first assigned
    pub assigned_at: Option<DateTime<Utc>>,
    /// When the task was completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create an ad-hoc task with no template
    #[inline]
    #[must_use]
    pub fn new(student: StudentId, title: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            student,
            template: None,
            agenda_items: Vec::new(),
            title: title.into(),
            description: String::new(),
            timing: None,
            status: TaskStatus::Open,
            schools: Vec::new(),
            due: None,
            assigned_at: None,
            completed_at: None,
        }
    }

    /// Instantiate a task from a template, copying content and timing
    #[must_use]
    pub fn from_template(student: StudentId, template: &TaskTemplate) -> Self {
        Self {
            id: TaskId::new(),
            student,
            template: Some(template.id),
            agenda_items: Vec::new(),
            title: template.title.clone(),
            description: template.description.clone(),
            timing: Some(template.timing),
            status: TaskStatus::Open,
            schools: Vec::new(),
            due: None,
            assigned_at: None,
            completed_at: None,
        }
    }

    /// Relate the task to specific schools
    #[inline]
    #[must_use]
    pub fn with_schools(mut self, schools: Vec<SchoolId>) -> Self {
        self.schools = schools;
        self
    }

    /// Link the task to an agenda item (no-op if already linked)
    pub fn link_agenda_item(&mut self, agenda_item: AgendaItemId) {
        if !self.agenda_items.contains(&agenda_item) {
            self.agenda_items.push(agenda_item);
        }
    }

    /// Move the task to a new status, stamping lifecycle timestamps
    ///
    /// Timestamps are first-write-only: reopening and re-assigning does not
    /// clear or overwrite when the task was originally assigned or completed.
    pub fn set_status(&mut self, status: TaskStatus, at: DateTime<Utc>) {
        self.status = status;
        match status {
            TaskStatus::Assigned if self.assigned_at.is_none() => self.assigned_at = Some(at),
            TaskStatus::Completed if self.completed_at.is_none() => self.completed_at = Some(at),
            _ => {}
        }
    }

    /// Whether the task has been completed
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
