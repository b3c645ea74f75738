//! Template records: reusable counseling configuration
//!
//! Templates are administrative configuration, created independently of any
//! student. Applying a roadmap copies template content into per-student
//! instance records; editing a template afterwards never touches instances.

use crate::error::TrackerConfigError;
use crate::ids::{AgendaItemTemplateId, MeetingTemplateId, RoadmapId, TaskTemplateId};
use crate::tracker::{DecisionPredicate, RawRuleMap, TrackerAssignment, TrackerRules, TrackerStatus};
use serde::{Deserialize, Serialize};

/// Whether a task is meant to happen before or after its meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskTiming {
    /// Done in preparation for the meeting
    PreMeeting,
    /// Follow-up after the meeting
    PostMeeting,
}

/// Reusable task definition
///
/// The three rule maps are raw string maps exactly as configured by an admin;
/// they compile into typed rule objects via [`TaskTemplate::compile_rules`].
/// An empty map means the rule is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Template identifier
    pub id: TaskTemplateId,
    /// Task title, copied onto created tasks
    pub title: String,
    /// Task description, copied onto created tasks
    pub description: String,
    /// Pre- or post-meeting task
    pub timing: TaskTiming,
    /// Filter selecting which tracker rows the task relates to
    #[serde(default)]
    pub include_school_sud_values: RawRuleMap,
    /// Tracker fields to set when a task from this template is assigned
    #[serde(default)]
    pub on_assign_sud_update: RawRuleMap,
    /// Tracker fields to set when a task from this template is completed
    #[serde(default)]
    pub on_complete_sud_update: RawRuleMap,
    /// Current tracker values that may be overwritten (empty = any)
    #[serde(default)]
    pub only_alter_tracker_values: Vec<String>,
}

impl TaskTemplate {
    /// Create a template with no tracker rules
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, timing: TaskTiming) -> Self {
        Self {
            id: TaskTemplateId::new(),
            title: title.into(),
            description: String::new(),
            timing,
            include_school_sud_values: RawRuleMap::new(),
            on_assign_sud_update: RawRuleMap::new(),
            on_complete_sud_update: RawRuleMap::new(),
            only_alter_tracker_values: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With one filter clause
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.include_school_sud_values.insert(key.into(), value.into());
        self
    }

    /// With one on-assign update
    #[inline]
    #[must_use]
    pub fn with_on_assign(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.on_assign_sud_update.insert(key.into(), value.into());
        self
    }

    /// With one on-complete update
    #[inline]
    #[must_use]
    pub fn with_on_complete(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.on_complete_sud_update.insert(key.into(), value.into());
        self
    }

    /// Restrict writes to rows whose current value is in the given set
    #[inline]
    #[must_use]
    pub fn with_only_alter(mut self, values: Vec<String>) -> Self {
        self.only_alter_tracker_values = values;
        self
    }

    /// Whether the template declares a tracker filter at all
    #[inline]
    #[must_use]
    pub fn has_tracker_filter(&self) -> bool {
        !self.include_school_sud_values.is_empty()
    }

    /// Compile the raw rule maps into typed rule objects
    ///
    /// # Errors
    /// Returns [`TrackerConfigError`] when any map references an unknown
    /// field, an unknown status value, or a malformed school id.
    pub fn compile_rules(&self) -> Result<TrackerRules, TrackerConfigError> {
        let predicate = if self.include_school_sud_values.is_empty() {
            None
        } else {
            Some(DecisionPredicate::compile(&self.include_school_sud_values)?)
        };
        let on_assign = if self.on_assign_sud_update.is_empty() {
            None
        } else {
            Some(TrackerAssignment::compile(&self.on_assign_sud_update)?)
        };
        let on_complete = if self.on_complete_sud_update.is_empty() {
            None
        } else {
            Some(TrackerAssignment::compile(&self.on_complete_sud_update)?)
        };
        let only_alter = self
            .only_alter_tracker_values
            .iter()
            .map(|v| TrackerStatus::parse_for("only_alter_tracker_values", v))
            .collect::<Result<Vec<TrackerStatus>, _>>()?;

        Ok(TrackerRules {
            predicate,
            on_assign,
            on_complete,
            only_alter,
        })
    }
}

/// Reusable agenda line under a meeting template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItemTemplate {
    /// Template identifier
    pub id: AgendaItemTemplateId,
    /// Agenda line title
    pub title: String,
    /// Longer description shown with the line
    pub description: String,
    /// Position within the meeting agenda
    pub order: u32,
    /// Task templates attached to this agenda line (pre and post mixed,
    /// distinguished by each template's timing flag)
    pub task_templates: Vec<TaskTemplateId>,
}

impl AgendaItemTemplate {
    /// Create an agenda item template with no tasks
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, order: u32) -> Self {
        Self {
            id: AgendaItemTemplateId::new(),
            title: title.into(),
            description: String::new(),
            order,
            task_templates: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a task template
    #[inline]
    #[must_use]
    pub fn with_task_template(mut self, id: TaskTemplateId) -> Self {
        self.task_templates.push(id);
        self
    }
}

/// Reusable meeting definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounselorMeetingTemplate {
    /// Template identifier
    pub id: MeetingTemplateId,
    /// Meeting title, copied onto created meetings
    pub title: String,
    /// Meeting description
    pub description: String,
    /// Position within the roadmap sequence
    pub order: u32,
    /// Agenda item templates for this meeting, in agenda order
    pub agenda_item_templates: Vec<AgendaItemTemplateId>,
}

impl CounselorMeetingTemplate {
    /// Create a meeting template with an empty agenda
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, order: u32) -> Self {
        Self {
            id: MeetingTemplateId::new(),
            title: title.into(),
            description: String::new(),
            order,
            agenda_item_templates: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach an agenda item template
    #[inline]
    #[must_use]
    pub fn with_agenda_item_template(mut self, id: AgendaItemTemplateId) -> Self {
        self.agenda_item_templates.push(id);
        self
    }
}

/// Named, ordered bundle of meeting templates applied to a student together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    /// Roadmap identifier
    pub id: RoadmapId,
    /// Roadmap name, e.g. "Late Start Senior"
    pub title: String,
    /// Meeting templates in application order
    pub meeting_templates: Vec<MeetingTemplateId>,
}

impl Roadmap {
    /// Create an empty roadmap
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: RoadmapId::new(),
            title: title.into(),
            meeting_templates: Vec::new(),
        }
    }

    /// Append a meeting template to the sequence
    #[inline]
    #[must_use]
    pub fn with_meeting_template(mut self, id: MeetingTemplateId) -> Self {
        self.meeting_templates.push(id);
        self
    }
}
