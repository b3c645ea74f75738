//! Roadmap application: instantiating template records for one student
//!
//! The applier is the sole creation path for template-derived instances.
//! It builds every record up front (validation errors surface before any
//! persistence) and commits the whole subtree in a single store transaction.

use crate::error::RoadmapError;
use crate::selection::RoadmapSelection;
use compass_model::{
    AgendaItem, CounselorId, CounselorMeeting, RoadmapId, StudentId, Task, TaskTemplateId,
};
use compass_store::MemoryStore;
use indexmap::IndexMap;
use std::sync::Arc;

/// Everything created by one roadmap application
#[derive(Debug, Clone)]
pub struct AppliedRoadmap {
    /// The applied roadmap
    pub roadmap: RoadmapId,
    /// The student it was applied to
    pub student: StudentId,
    /// Created meetings, in roadmap order
    pub meetings: Vec<CounselorMeeting>,
    /// Created agenda items, in meeting/agenda order
    pub agenda_items: Vec<AgendaItem>,
    /// Created tasks; one per distinct task template
    pub tasks: Vec<Task>,
}

/// What an unapply removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnappliedRoadmap {
    /// Meetings deleted (unscheduled or not yet ended)
    pub meetings_removed: usize,
    /// Incomplete tasks deleted
    pub tasks_removed: usize,
}

/// Applies and unapplies roadmaps for students
#[derive(Debug, Clone)]
pub struct RoadmapApplier {
    store: Arc<MemoryStore>,
}

impl RoadmapApplier {
    /// Create an applier over a store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Instantiate a roadmap's templates for a student
    ///
    /// Walks the roadmap's meeting templates in order, creating a meeting,
    /// its selected agenda items, and their tasks. A task template shared by
    /// several applied agenda items produces exactly one task (first
    /// occurrence wins); later agenda items are linked to the existing task.
    ///
    /// All created records are committed in one transaction together with the
    /// applied-roadmap mark; a failure partway persists nothing.
    ///
    /// # Errors
    /// - [`RoadmapError::NotFound`] for a missing roadmap, student, counselor,
    ///   or referenced template
    /// - [`RoadmapError::Validation`] for a selection referencing templates
    ///   outside the roadmap, or a roadmap already applied to the student
    /// - [`RoadmapError::Store`] when the commit itself fails
    pub fn apply(
        &self,
        roadmap_id: RoadmapId,
        student_id: StudentId,
        counselor_id: CounselorId,
        selection: Option<&RoadmapSelection>,
    ) -> Result<AppliedRoadmap, RoadmapError> {
        let roadmap = self
            .store
            .roadmap(roadmap_id)
            .ok_or_else(|| RoadmapError::not_found("roadmap", roadmap_id))?;
        let student = self
            .store
            .student(student_id)
            .ok_or_else(|| RoadmapError::not_found("student", student_id))?;
        self.store
            .counselor(counselor_id)
            .ok_or_else(|| RoadmapError::not_found("counselor", counselor_id))?;

        if student.has_applied(roadmap_id) {
            return Err(RoadmapError::Validation(format!(
                "roadmap {roadmap_id} is already applied to student {student_id}"
            )));
        }

        let default_selection = RoadmapSelection::new();
        let selection = selection.unwrap_or(&default_selection);
        selection.validate(&roadmap, |id| self.store.meeting_template(id))?;

        // Build the full subtree before touching the store
        let mut meetings = Vec::new();
        let mut agenda_items = Vec::new();
        let mut tasks_by_template: IndexMap<TaskTemplateId, Task> = IndexMap::new();

        for meeting_template_id in &roadmap.meeting_templates {
            if !selection.includes_meeting(*meeting_template_id) {
                continue;
            }
            let meeting_template = self
                .store
                .meeting_template(*meeting_template_id)
                .ok_or_else(|| RoadmapError::not_found("meeting template", meeting_template_id))?;

            let mut meeting =
                CounselorMeeting::from_template(student_id, counselor_id, &meeting_template);
            if let Some(title) = selection.meeting_title(*meeting_template_id) {
                meeting = meeting.with_title(title);
            }

            let mut next_order = 1;
            for item_template_id in &meeting_template.agenda_item_templates {
                if !selection.includes_agenda_item(*meeting_template_id, *item_template_id) {
                    continue;
                }
                let item_template =
                    self.store.agenda_item_template(*item_template_id).ok_or_else(|| {
                        RoadmapError::not_found("agenda item template", item_template_id)
                    })?;

                let mut item = AgendaItem::from_template(meeting.id, &item_template);
                if let Some(title) =
                    selection.agenda_item_title(*meeting_template_id, *item_template_id)
                {
                    item = item.with_title(title);
                }
                next_order = next_order.max(item.order + 1);

                for task_template_id in &item_template.task_templates {
                    if let Some(existing) = tasks_by_template.get_mut(task_template_id) {
                        // Shared template: first occurrence already created
                        // the task, just link this agenda item to it
                        existing.link_agenda_item(item.id);
                        continue;
                    }
                    let task_template =
                        self.store.task_template(*task_template_id).ok_or_else(|| {
                            RoadmapError::not_found("task template", task_template_id)
                        })?;
                    let mut task = Task::from_template(student_id, &task_template);
                    task.link_agenda_item(item.id);
                    tasks_by_template.insert(*task_template_id, task);
                }
                agenda_items.push(item);
            }

            for title in selection.custom_agenda_items(*meeting_template_id) {
                agenda_items.push(AgendaItem::custom(meeting.id, title.clone(), next_order));
                next_order += 1;
            }

            meetings.push(meeting);
        }

        let tasks: Vec<Task> = tasks_by_template.into_values().collect();

        // Atomic commit: meetings, then agenda items, then tasks, then the
        // applied mark. Any failure rolls the whole application back.
        {
            let meetings = meetings.clone();
            let agenda_items = agenda_items.clone();
            let tasks = tasks.clone();
            self.store.transaction(move |inner| {
                for meeting in meetings {
                    inner.insert_meeting(meeting)?;
                }
                for item in agenda_items {
                    inner.insert_agenda_item(item)?;
                }
                for task in tasks {
                    inner.insert_task(task)?;
                }
                inner.mark_roadmap_applied(student_id, roadmap_id)
            })?;
        }

        tracing::info!(
            roadmap = %roadmap_id,
            student = %student_id,
            meetings = meetings.len(),
            agenda_items = agenda_items.len(),
            tasks = tasks.len(),
            "applied roadmap"
        );

        Ok(AppliedRoadmap {
            roadmap: roadmap_id,
            student: student_id,
            meetings,
            agenda_items,
            tasks,
        })
    }

    /// Remove a roadmap from a student
    ///
    /// Deletes the student's meetings derived from the roadmap that are
    /// unscheduled or not yet over, deletes their incomplete tasks derived
    /// from the roadmap's task templates, and clears the applied mark.
    /// Completed tasks and past meetings are history and stay.
    ///
    /// # Errors
    /// [`RoadmapError::Validation`] when the roadmap was never applied to the
    /// student; [`RoadmapError::NotFound`] for a missing roadmap or student.
    pub fn unapply(
        &self,
        roadmap_id: RoadmapId,
        student_id: StudentId,
    ) -> Result<UnappliedRoadmap, RoadmapError> {
        let roadmap = self
            .store
            .roadmap(roadmap_id)
            .ok_or_else(|| RoadmapError::not_found("roadmap", roadmap_id))?;
        let student = self
            .store
            .student(student_id)
            .ok_or_else(|| RoadmapError::not_found("student", student_id))?;
        if !student.has_applied(roadmap_id) {
            return Err(RoadmapError::Validation(format!(
                "roadmap {roadmap_id} has not been applied to student {student_id}"
            )));
        }

        // Task templates reachable through the roadmap's agenda item templates
        let mut roadmap_task_templates: Vec<TaskTemplateId> = Vec::new();
        for meeting_template_id in &roadmap.meeting_templates {
            let Some(meeting_template) = self.store.meeting_template(*meeting_template_id) else {
                continue;
            };
            for item_template_id in &meeting_template.agenda_item_templates {
                let Some(item_template) = self.store.agenda_item_template(*item_template_id)
                else {
                    continue;
                };
                for task_template_id in &item_template.task_templates {
                    if !roadmap_task_templates.contains(task_template_id) {
                        roadmap_task_templates.push(*task_template_id);
                    }
                }
            }
        }
        let meeting_template_ids = roadmap.meeting_templates.clone();

        let now = chrono::Utc::now();
        let removed = self.store.transaction(move |inner| {
            let mut meetings_removed = 0;
            for meeting in inner.meetings_for_student(student_id) {
                let from_roadmap = meeting
                    .template
                    .is_some_and(|t| meeting_template_ids.contains(&t));
                let still_ahead = meeting.end.map_or(true, |end| end > now);
                if from_roadmap && still_ahead {
                    inner.remove_meeting(meeting.id)?;
                    meetings_removed += 1;
                }
            }
            let mut tasks_removed = 0;
            for task in inner.tasks_for_student(student_id) {
                let from_roadmap = task
                    .template
                    .is_some_and(|t| roadmap_task_templates.contains(&t));
                if from_roadmap && !task.is_completed() {
                    inner.remove_task(task.id)?;
                    tasks_removed += 1;
                }
            }
            inner.clear_roadmap_applied(student_id, roadmap_id)?;
            Ok(UnappliedRoadmap {
                meetings_removed,
                tasks_removed,
            })
        })?;

        tracing::info!(
            roadmap = %roadmap_id,
            student = %student_id,
            meetings_removed = removed.meetings_removed,
            tasks_removed = removed.tasks_removed,
            "unapplied roadmap"
        );

        Ok(removed)
    }
}
