//! Caller-supplied selection payload for roadmap application
//!
//! A counselor applying a roadmap may tailor it: skip meetings, skip agenda
//! lines, override copied titles, and append custom agenda lines. Omitting
//! the payload (or omitting an entry) means "include with template defaults";
//! exclusions are always explicit.

use compass_model::{AgendaItemTemplateId, CounselorMeetingTemplate, MeetingTemplateId, Roadmap};
use crate::error::RoadmapError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-meeting, per-agenda-item choices for one roadmap application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapSelection {
    /// Choices keyed by meeting template; templates not listed are included
    /// with defaults
    #[serde(default)]
    pub meetings: IndexMap<MeetingTemplateId, MeetingSelection>,
}

/// Choices for one meeting template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSelection {
    /// Create this meeting at all
    #[serde(default = "default_include")]
    pub include: bool,
    /// Replace the template title on the created meeting
    #[serde(default)]
    pub title_override: Option<String>,
    /// Choices keyed by agenda item template; items not listed are included
    #[serde(default)]
    pub agenda_items: IndexMap<AgendaItemTemplateId, AgendaItemSelection>,
    /// Extra template-less agenda lines appended after the template ones
    #[serde(default)]
    pub custom_agenda_items: Vec<String>,
}

impl Default for MeetingSelection {
    fn default() -> Self {
        Self {
            include: true,
            title_override: None,
            agenda_items: IndexMap::new(),
            custom_agenda_items: Vec::new(),
        }
    }
}

/// Choices for one agenda item template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItemSelection {
    /// Create this agenda item at all
    #[serde(default = "default_include")]
    pub include: bool,
    /// Replace the template title on the created agenda item
    #[serde(default)]
    pub title_override: Option<String>,
}

impl Default for AgendaItemSelection {
    fn default() -> Self {
        Self {
            include: true,
            title_override: None,
        }
    }
}

fn default_include() -> bool {
    true
}

impl RoadmapSelection {
    /// Empty selection: everything included with template defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip a meeting template entirely
    #[must_use]
    pub fn exclude_meeting(mut self, meeting: MeetingTemplateId) -> Self {
        self.meetings.entry(meeting).or_default().include = false;
        self
    }

    /// Override the created meeting's title
    #[must_use]
    pub fn with_meeting_title(
        mut self,
        meeting: MeetingTemplateId,
        title: impl Into<String>,
    ) -> Self {
        self.meetings.entry(meeting).or_default().title_override = Some(title.into());
        self
    }

    /// Skip one agenda item template under a meeting
    #[must_use]
    pub fn exclude_agenda_item(
        mut self,
        meeting: MeetingTemplateId,
        item: AgendaItemTemplateId,
    ) -> Self {
        self.meetings
            .entry(meeting)
            .or_default()
            .agenda_items
            .entry(item)
            .or_default()
            .include = false;
        self
    }

    /// Override one created agenda item's title
    #[must_use]
    pub fn with_agenda_item_title(
        mut self,
        meeting: MeetingTemplateId,
        item: AgendaItemTemplateId,
        title: impl Into<String>,
    ) -> Self {
        self.meetings
            .entry(meeting)
            .or_default()
            .agenda_items
            .entry(item)
            .or_default()
            .title_override = Some(title.into());
        self
    }

    /// Append a custom agenda line to a meeting
    #[must_use]
    pub fn with_custom_agenda_item(
        mut self,
        meeting: MeetingTemplateId,
        title: impl Into<String>,
    ) -> Self {
        self.meetings
            .entry(meeting)
            .or_default()
            .custom_agenda_items
            .push(title.into());
        self
    }

    /// Whether a meeting template should be instantiated
    #[inline]
    #[must_use]
    pub fn includes_meeting(&self, meeting: MeetingTemplateId) -> bool {
        self.meetings.get(&meeting).map_or(true, |m| m.include)
    }

    /// Title override for a meeting, if any
    #[must_use]
    pub fn meeting_title(&self, meeting: MeetingTemplateId) -> Option<&str> {
        self.meetings
            .get(&meeting)
            .and_then(|m| m.title_override.as_deref())
    }

    /// Whether an agenda item template should be instantiated
    #[must_use]
    pub fn includes_agenda_item(
        &self,
        meeting: MeetingTemplateId,
        item: AgendaItemTemplateId,
    ) -> bool {
        self.meetings
            .get(&meeting)
            .and_then(|m| m.agenda_items.get(&item))
            .map_or(true, |a| a.include)
    }

    /// Title override for an agenda item, if any
    #[must_use]
    pub fn agenda_item_title(
        &self,
        meeting: MeetingTemplateId,
        item: AgendaItemTemplateId,
    ) -> Option<&str> {
        self.meetings
            .get(&meeting)
            .and_then(|m| m.agenda_items.get(&item))
            .and_then(|a| a.title_override.as_deref())
    }

    /// Custom agenda lines for a meeting
    #[must_use]
    pub fn custom_agenda_items(&self, meeting: MeetingTemplateId) -> &[String] {
        self.meetings
            .get(&meeting)
            .map_or(&[], |m| m.custom_agenda_items.as_slice())
    }

    /// Check every referenced template belongs to the roadmap
    ///
    /// # Errors
    /// [`RoadmapError::Validation`] on a meeting template not in the roadmap
    /// or an agenda item template not under the meeting it is keyed by.
    pub fn validate(
        &self,
        roadmap: &Roadmap,
        meeting_template: impl Fn(MeetingTemplateId) -> Option<CounselorMeetingTemplate>,
    ) -> Result<(), RoadmapError> {
        for (meeting_id, meeting_sel) in &self.meetings {
            if !roadmap.meeting_templates.contains(meeting_id) {
                return Err(RoadmapError::Validation(format!(
                    "selection references meeting template {meeting_id} not on roadmap {}",
                    roadmap.id
                )));
            }
            let template = meeting_template(*meeting_id).ok_or_else(|| {
                RoadmapError::not_found("meeting template", meeting_id)
            })?;
            for item_id in meeting_sel.agenda_items.keys() {
                if !template.agenda_item_templates.contains(item_id) {
                    return Err(RoadmapError::Validation(format!(
                        "selection references agenda item template {item_id} not under meeting template {meeting_id}"
                    )));
                }
            }
        }
        Ok(())
    }
}
