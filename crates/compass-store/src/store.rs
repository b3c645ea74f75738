//! In-memory record store with snapshot transactions
//!
//! [`MemoryStore`] keeps every collection behind one `parking_lot` lock.
//! Multi-record operations run through [`MemoryStore::transaction`]: the
//! closure mutates a staged clone of the state, which replaces the committed
//! state only if the closure succeeds. A failure anywhere leaves the store
//! exactly as it was, which is the all-or-nothing guarantee roadmap
//! application and task transitions rely on.
//!
//! Write helpers on [`StoreInner`] validate duplicate ids and referential
//! integrity before mutating, and consume the fault budget armed by
//! [`MemoryStore::fail_after_writes`] so tests can simulate a persistence
//! failure partway through a commit.

use crate::error::StoreError;
use compass_model::{
    AgendaItem, AgendaItemId, AgendaItemTemplate, AgendaItemTemplateId, Counselor, CounselorId,
    CounselorMeeting, CounselorMeetingTemplate, DecisionId, MeetingId, MeetingTemplateId, Roadmap,
    RoadmapId, Student, StudentId, StudentUniversityDecision, Task, TaskId, TaskTemplate,
    TaskTemplateId,
};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
    /// One-shot fault plan consumed by the next transaction
    fault: Mutex<Option<usize>>,
}

/// The store's record collections
///
/// Public so transaction closures can use the validating write helpers. Only
/// the staged copy handed out by [`MemoryStore::transaction`] is ever
/// committed; a free-standing value never affects a store.
#[derive(Debug, Clone, Default)]
pub struct StoreInner {
    roadmaps: IndexMap<RoadmapId, Roadmap>,
    meeting_templates: IndexMap<MeetingTemplateId, CounselorMeetingTemplate>,
    agenda_item_templates: IndexMap<AgendaItemTemplateId, AgendaItemTemplate>,
    task_templates: IndexMap<TaskTemplateId, TaskTemplate>,
    students: IndexMap<StudentId, Student>,
    counselors: IndexMap<CounselorId, Counselor>,
    meetings: IndexMap<MeetingId, CounselorMeeting>,
    agenda_items: IndexMap<AgendaItemId, AgendaItem>,
    tasks: IndexMap<TaskId, Task>,
    decisions: IndexMap<DecisionId, StudentUniversityDecision>,
    /// Remaining writes allowed before the injected fault fires; staged only
    fault_budget: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot fault: the next transaction's write number `n + 1`
    /// fails with [`StoreError::FaultInjected`]
    pub fn fail_after_writes(&self, n: usize) {
        *self.fault.lock() = Some(n);
    }

    /// Run a closure against a staged copy of the store state
    ///
    /// The staged copy replaces the committed state only when the closure
    /// returns `Ok`; on `Err` every staged write is discarded.
    ///
    /// # Errors
    /// Propagates the closure's error unchanged.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreInner) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.write();
        let mut staged = guard.clone();
        staged.fault_budget = self.fault.lock().take();

        match f(&mut staged) {
            Ok(out) => {
                staged.fault_budget = None;
                *guard = staged;
                Ok(out)
            }
            Err(e) => {
                tracing::debug!(error = %e, "transaction rolled back");
                Err(e)
            }
        }
    }
}

// Seeding helpers for configuration and actor records. These are the
// admin/setup write path; they share the validating helpers but each one is
// its own tiny transaction.
impl MemoryStore {
    /// Insert a roadmap definition
    pub fn seed_roadmap(&self, roadmap: Roadmap) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_roadmap(roadmap))
    }

    /// Insert a meeting template
    pub fn seed_meeting_template(
        &self,
        template: CounselorMeetingTemplate,
    ) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_meeting_template(template))
    }

    /// Insert an agenda item template
    pub fn seed_agenda_item_template(
        &self,
        template: AgendaItemTemplate,
    ) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_agenda_item_template(template))
    }

    /// Insert a task template
    pub fn seed_task_template(&self, template: TaskTemplate) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_task_template(template))
    }

    /// Insert a student
    pub fn seed_student(&self, student: Student) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_student(student))
    }

    /// Insert a counselor
    pub fn seed_counselor(&self, counselor: Counselor) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_counselor(counselor))
    }

    /// Insert a tracker row
    pub fn seed_decision(&self, decision: StudentUniversityDecision) -> Result<(), StoreError> {
        self.transaction(|inner| inner.insert_decision(decision))
    }
}

// Read API: lock-scoped clones
impl MemoryStore {
    /// Look up a roadmap
    #[must_use]
    pub fn roadmap(&self, id: RoadmapId) -> Option<Roadmap> {
        self.inner.read().roadmaps.get(&id).cloned()
    }

    /// Look up a meeting template
    #[must_use]
    pub fn meeting_template(&self, id: MeetingTemplateId) -> Option<CounselorMeetingTemplate> {
        self.inner.read().meeting_templates.get(&id).cloned()
    }

    /// Look up an agenda item template
    #[must_use]
    pub fn agenda_item_template(&self, id: AgendaItemTemplateId) -> Option<AgendaItemTemplate> {
        self.inner.read().agenda_item_templates.get(&id).cloned()
    }

    /// Look up a task template
    #[must_use]
    pub fn task_template(&self, id: TaskTemplateId) -> Option<TaskTemplate> {
        self.inner.read().task_templates.get(&id).cloned()
    }

    /// Look up a student
    #[must_use]
    pub fn student(&self, id: StudentId) -> Option<Student> {
        self.inner.read().students.get(&id).cloned()
    }

    /// Look up a counselor
    #[must_use]
    pub fn counselor(&self, id: CounselorId) -> Option<Counselor> {
        self.inner.read().counselors.get(&id).cloned()
    }

    /// Look up a meeting
    #[must_use]
    pub fn meeting(&self, id: MeetingId) -> Option<CounselorMeeting> {
        self.inner.read().meetings.get(&id).cloned()
    }

    /// Look up an agenda item
    #[must_use]
    pub fn agenda_item(&self, id: AgendaItemId) -> Option<AgendaItem> {
        self.inner.read().agenda_items.get(&id).cloned()
    }

    /// Look up a task
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.inner.read().tasks.get(&id).cloned()
    }

    /// Look up a tracker row
    #[must_use]
    pub fn decision(&self, id: DecisionId) -> Option<StudentUniversityDecision> {
        self.inner.read().decisions.get(&id).cloned()
    }

    /// All meetings for a student, in insertion order
    #[must_use]
    pub fn meetings_for_student(&self, student: StudentId) -> Vec<CounselorMeeting> {
        self.inner
            .read()
            .meetings
            .values()
            .filter(|m| m.student == student)
            .cloned()
            .collect()
    }

    /// All agenda items on a meeting, in insertion order
    #[must_use]
    pub fn agenda_items_for_meeting(&self, meeting: MeetingId) -> Vec<AgendaItem> {
        self.inner
            .read()
            .agenda_items
            .values()
            .filter(|a| a.meeting == meeting)
            .cloned()
            .collect()
    }

    /// All tasks for a student, in insertion order
    #[must_use]
    pub fn tasks_for_student(&self, student: StudentId) -> Vec<Task> {
        self.inner
            .read()
            .tasks
            .values()
            .filter(|t| t.student == student)
            .cloned()
            .collect()
    }

    /// Tasks linked (through agenda items) to a meeting
    #[must_use]
    pub fn tasks_for_meeting(&self, meeting: MeetingId) -> Vec<Task> {
        let inner = self.inner.read();
        let items: Vec<AgendaItemId> = inner
            .agenda_items
            .values()
            .filter(|a| a.meeting == meeting)
            .map(|a| a.id)
            .collect();
        inner
            .tasks
            .values()
            .filter(|t| t.agenda_items.iter().any(|a| items.contains(a)))
            .cloned()
            .collect()
    }

    /// All tracker rows for a student, in insertion order
    #[must_use]
    pub fn decisions_for_student(&self, student: StudentId) -> Vec<StudentUniversityDecision> {
        self.inner
            .read()
            .decisions
            .values()
            .filter(|d| d.student == student)
            .cloned()
            .collect()
    }
}

impl StoreInner {
    fn consume_write(&mut self) -> Result<(), StoreError> {
        if let Some(remaining) = self.fault_budget.as_mut() {
            if *remaining == 0 {
                return Err(StoreError::FaultInjected);
            }
            *remaining -= 1;
        }
        Ok(())
    }

    fn require_student(&self, id: StudentId) -> Result<(), StoreError> {
        if self.students.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference {
                kind: "student",
                id: id.to_string(),
            })
        }
    }

    fn require_counselor(&self, id: CounselorId) -> Result<(), StoreError> {
        if self.counselors.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference {
                kind: "counselor",
                id: id.to_string(),
            })
        }
    }

    /// Insert a roadmap definition
    pub fn insert_roadmap(&mut self, roadmap: Roadmap) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.roadmaps.contains_key(&roadmap.id) {
            return Err(StoreError::Duplicate {
                kind: "roadmap",
                id: roadmap.id.to_string(),
            });
        }
        self.roadmaps.insert(roadmap.id, roadmap);
        Ok(())
    }

    /// Insert a meeting template
    pub fn insert_meeting_template(
        &mut self,
        template: CounselorMeetingTemplate,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.meeting_templates.contains_key(&template.id) {
            return Err(StoreError::Duplicate {
                kind: "meeting template",
                id: template.id.to_string(),
            });
        }
        self.meeting_templates.insert(template.id, template);
        Ok(())
    }

    /// Insert an agenda item template
    pub fn insert_agenda_item_template(
        &mut self,
        template: AgendaItemTemplate,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.agenda_item_templates.contains_key(&template.id) {
            return Err(StoreError::Duplicate {
                kind: "agenda item template",
                id: template.id.to_string(),
            });
        }
        self.agenda_item_templates.insert(template.id, template);
        Ok(())
    }

    /// Insert a task template
    pub fn insert_task_template(&mut self, template: TaskTemplate) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.task_templates.contains_key(&template.id) {
            return Err(StoreError::Duplicate {
                kind: "task template",
                id: template.id.to_string(),
            });
        }
        self.task_templates.insert(template.id, template);
        Ok(())
    }

    /// Insert a student
    pub fn insert_student(&mut self, student: Student) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.students.contains_key(&student.id) {
            return Err(StoreError::Duplicate {
                kind: "student",
                id: student.id.to_string(),
            });
        }
        self.students.insert(student.id, student);
        Ok(())
    }

    /// Insert a counselor
    pub fn insert_counselor(&mut self, counselor: Counselor) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.counselors.contains_key(&counselor.id) {
            return Err(StoreError::Duplicate {
                kind: "counselor",
                id: counselor.id.to_string(),
            });
        }
        self.counselors.insert(counselor.id, counselor);
        Ok(())
    }

    /// Insert a meeting instance
    ///
    /// # Errors
    /// Duplicate id, or a dangling student/counselor/template reference.
    pub fn insert_meeting(&mut self, meeting: CounselorMeeting) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.meetings.contains_key(&meeting.id) {
            return Err(StoreError::Duplicate {
                kind: "meeting",
                id: meeting.id.to_string(),
            });
        }
        self.require_student(meeting.student)?;
        self.require_counselor(meeting.counselor)?;
        if let Some(template) = meeting.template {
            if !self.meeting_templates.contains_key(&template) {
                return Err(StoreError::MissingReference {
                    kind: "meeting template",
                    id: template.to_string(),
                });
            }
        }
        self.meetings.insert(meeting.id, meeting);
        Ok(())
    }

    /// Insert an agenda item instance
    pub fn insert_agenda_item(&mut self, item: AgendaItem) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.agenda_items.contains_key(&item.id) {
            return Err(StoreError::Duplicate {
                kind: "agenda item",
                id: item.id.to_string(),
            });
        }
        if !self.meetings.contains_key(&item.meeting) {
            return Err(StoreError::MissingReference {
                kind: "meeting",
                id: item.meeting.to_string(),
            });
        }
        if let Some(template) = item.template {
            if !self.agenda_item_templates.contains_key(&template) {
                return Err(StoreError::MissingReference {
                    kind: "agenda item template",
                    id: template.to_string(),
                });
            }
        }
        self.agenda_items.insert(item.id, item);
        Ok(())
    }

    /// Insert a task instance
    ///
    /// # Errors
    /// Duplicate id, dangling references, or an agenda item whose meeting
    /// belongs to a different student than the task.
    pub fn insert_task(&mut self, task: Task) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.tasks.contains_key(&task.id) {
            return Err(StoreError::Duplicate {
                kind: "task",
                id: task.id.to_string(),
            });
        }
        self.require_student(task.student)?;
        if let Some(template) = task.template {
            if !self.task_templates.contains_key(&template) {
                return Err(StoreError::MissingReference {
                    kind: "task template",
                    id: template.to_string(),
                });
            }
        }
        for item_id in &task.agenda_items {
            let item = self.agenda_items.get(item_id).ok_or(StoreError::MissingReference {
                kind: "agenda item",
                id: item_id.to_string(),
            })?;
            let meeting = self.meetings.get(&item.meeting).ok_or(StoreError::MissingReference {
                kind: "meeting",
                id: item.meeting.to_string(),
            })?;
            if meeting.student != task.student {
                return Err(StoreError::IntegrityViolation(format!(
                    "task {} for student {} links agenda item {} of student {}",
                    task.id, task.student, item_id, meeting.student
                )));
            }
        }
        self.tasks.insert(task.id, task);
        Ok(())
    }

    /// Insert a tracker row
    pub fn insert_decision(
        &mut self,
        decision: StudentUniversityDecision,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.decisions.contains_key(&decision.id) {
            return Err(StoreError::Duplicate {
                kind: "decision",
                id: decision.id.to_string(),
            });
        }
        self.require_student(decision.student)?;
        self.decisions.insert(decision.id, decision);
        Ok(())
    }

    /// Replace an existing meeting
    pub fn update_meeting(&mut self, meeting: CounselorMeeting) -> Result<(), StoreError> {
        self.consume_write()?;
        if !self.meetings.contains_key(&meeting.id) {
            return Err(StoreError::NotFound {
                kind: "meeting",
                id: meeting.id.to_string(),
            });
        }
        self.meetings.insert(meeting.id, meeting);
        Ok(())
    }

    /// Replace an existing task
    pub fn update_task(&mut self, task: Task) -> Result<(), StoreError> {
        self.consume_write()?;
        if !self.tasks.contains_key(&task.id) {
            return Err(StoreError::NotFound {
                kind: "task",
                id: task.id.to_string(),
            });
        }
        self.tasks.insert(task.id, task);
        Ok(())
    }

    /// Replace an existing tracker row
    pub fn update_decision(
        &mut self,
        decision: StudentUniversityDecision,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        if !self.decisions.contains_key(&decision.id) {
            return Err(StoreError::NotFound {
                kind: "decision",
                id: decision.id.to_string(),
            });
        }
        self.decisions.insert(decision.id, decision);
        Ok(())
    }

    /// Replace an existing student
    pub fn update_student(&mut self, student: Student) -> Result<(), StoreError> {
        self.consume_write()?;
        if !self.students.contains_key(&student.id) {
            return Err(StoreError::NotFound {
                kind: "student",
                id: student.id.to_string(),
            });
        }
        self.students.insert(student.id, student);
        Ok(())
    }

    /// Delete a meeting and its agenda items
    pub fn remove_meeting(&mut self, id: MeetingId) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.meetings.shift_remove(&id).is_none() {
            return Err(StoreError::NotFound {
                kind: "meeting",
                id: id.to_string(),
            });
        }
        let removed: Vec<AgendaItemId> = self
            .agenda_items
            .values()
            .filter(|a| a.meeting == id)
            .map(|a| a.id)
            .collect();
        for item in &removed {
            self.agenda_items.shift_remove(item);
        }
        // Drop dangling agenda item links from tasks
        for task in self.tasks.values_mut() {
            task.agenda_items.retain(|a| !removed.contains(a));
        }
        Ok(())
    }

    /// Delete a task
    pub fn remove_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.consume_write()?;
        if self.tasks.shift_remove(&id).is_none() {
            return Err(StoreError::NotFound {
                kind: "task",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Look up a student
    #[must_use]
    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.get(&id)
    }

    /// Look up a task
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Look up a task template
    #[must_use]
    pub fn task_template(&self, id: TaskTemplateId) -> Option<&TaskTemplate> {
        self.task_templates.get(&id)
    }

    /// Look up a meeting
    #[must_use]
    pub fn meeting(&self, id: MeetingId) -> Option<&CounselorMeeting> {
        self.meetings.get(&id)
    }

    /// Tracker rows for a student (cloned, so the caller can mutate and write
    /// back through [`StoreInner::update_decision`])
    #[must_use]
    pub fn decisions_for_student(&self, student: StudentId) -> Vec<StudentUniversityDecision> {
        self.decisions
            .values()
            .filter(|d| d.student == student)
            .cloned()
            .collect()
    }

    /// Meetings for a student
    #[must_use]
    pub fn meetings_for_student(&self, student: StudentId) -> Vec<CounselorMeeting> {
        self.meetings
            .values()
            .filter(|m| m.student == student)
            .cloned()
            .collect()
    }

    /// Tasks for a student
    #[must_use]
    pub fn tasks_for_student(&self, student: StudentId) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.student == student)
            .cloned()
            .collect()
    }

    /// Tasks linked to a meeting through its agenda items
    #[must_use]
    pub fn tasks_for_meeting(&self, meeting: MeetingId) -> Vec<Task> {
        let items: Vec<AgendaItemId> = self
            .agenda_items
            .values()
            .filter(|a| a.meeting == meeting)
            .map(|a| a.id)
            .collect();
        self.tasks
            .values()
            .filter(|t| t.agenda_items.iter().any(|a| items.contains(a)))
            .cloned()
            .collect()
    }

    /// Record that a roadmap has been applied to a student
    pub fn mark_roadmap_applied(
        &mut self,
        student: StudentId,
        roadmap: RoadmapId,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        if !self.roadmaps.contains_key(&roadmap) {
            return Err(StoreError::MissingReference {
                kind: "roadmap",
                id: roadmap.to_string(),
            });
        }
        let record = self.students.get_mut(&student).ok_or(StoreError::NotFound {
            kind: "student",
            id: student.to_string(),
        })?;
        if !record.applied_roadmaps.insert(roadmap) {
            return Err(StoreError::IntegrityViolation(format!(
                "roadmap {roadmap} already applied to student {student}"
            )));
        }
        Ok(())
    }

    /// Clear an applied-roadmap mark
    pub fn clear_roadmap_applied(
        &mut self,
        student: StudentId,
        roadmap: RoadmapId,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        let record = self.students.get_mut(&student).ok_or(StoreError::NotFound {
            kind: "student",
            id: student.to_string(),
        })?;
        if !record.applied_roadmaps.shift_remove(&roadmap) {
            return Err(StoreError::IntegrityViolation(format!(
                "roadmap {roadmap} is not applied to student {student}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with_actors() -> (MemoryStore, StudentId, CounselorId) {
        let store = MemoryStore::new();
        let counselor = Counselor::new("Dana");
        let counselor_id = counselor.id;
        let student = Student::new("Avery").with_counselor(counselor_id);
        let student_id = student.id;
        store.seed_counselor(counselor).unwrap();
        store.seed_student(student).unwrap();
        (store, student_id, counselor_id)
    }

    #[test]
    fn transaction_commits_on_success() {
        let (store, student, counselor) = store_with_actors();
        let meeting = CounselorMeeting::new(student, counselor, "Kickoff");
        let id = meeting.id;

        store.transaction(|inner| inner.insert_meeting(meeting)).unwrap();
        assert!(store.meeting(id).is_some());
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let (store, student, counselor) = store_with_actors();
        let good = CounselorMeeting::new(student, counselor, "Kickoff");
        let dangling = CounselorMeeting::new(StudentId::new(), counselor, "Ghost");
        let good_id = good.id;

        let result = store.transaction(|inner| {
            inner.insert_meeting(good)?;
            inner.insert_meeting(dangling)
        });

        assert!(matches!(result, Err(StoreError::MissingReference { .. })));
        assert!(store.meeting(good_id).is_none());
        assert!(store.meetings_for_student(student).is_empty());
    }

    #[test]
    fn insert_task_rejects_cross_student_agenda_item() {
        let (store, student, counselor) = store_with_actors();
        let other = Student::new("Blair").with_counselor(counselor);
        let other_id = other.id;
        store.seed_student(other).unwrap();

        let meeting = CounselorMeeting::new(student, counselor, "Kickoff");
        let item = AgendaItem::custom(meeting.id, "Intros", 1);
        let mut task = Task::new(other_id, "Wrong student");
        task.link_agenda_item(item.id);

        let result = store.transaction(|inner| {
            inner.insert_meeting(meeting)?;
            inner.insert_agenda_item(item)?;
            inner.insert_task(task)
        });
        assert!(matches!(result, Err(StoreError::IntegrityViolation(_))));
    }

    #[test]
    fn fault_injection_fires_on_nth_write() {
        let (store, student, counselor) = store_with_actors();
        store.fail_after_writes(1);

        let first = CounselorMeeting::new(student, counselor, "One");
        let second = CounselorMeeting::new(student, counselor, "Two");

        let result = store.transaction(|inner| {
            inner.insert_meeting(first)?;
            inner.insert_meeting(second)
        });

        assert_eq!(result, Err(StoreError::FaultInjected));
        assert!(store.meetings_for_student(student).is_empty());

        // One-shot: the next transaction is clean
        let third = CounselorMeeting::new(student, counselor, "Three");
        store.transaction(|inner| inner.insert_meeting(third)).unwrap();
        assert_eq!(store.meetings_for_student(student).len(), 1);
    }

    #[test]
    fn applied_roadmap_marks() {
        let (store, student, _) = store_with_actors();
        let roadmap = Roadmap::new("Sophomore");
        let roadmap_id = roadmap.id;
        store.seed_roadmap(roadmap).unwrap();

        store
            .transaction(|inner| inner.mark_roadmap_applied(student, roadmap_id))
            .unwrap();
        assert!(store.student(student).unwrap().has_applied(roadmap_id));

        let dup = store.transaction(|inner| inner.mark_roadmap_applied(student, roadmap_id));
        assert!(matches!(dup, Err(StoreError::IntegrityViolation(_))));

        store
            .transaction(|inner| inner.clear_roadmap_applied(student, roadmap_id))
            .unwrap();
        assert!(!store.student(student).unwrap().has_applied(roadmap_id));
    }

    #[test]
    fn remove_meeting_drops_agenda_items_and_task_links() {
        let (store, student, counselor) = store_with_actors();
        let meeting = CounselorMeeting::new(student, counselor, "Kickoff");
        let meeting_id = meeting.id;
        let item = AgendaItem::custom(meeting_id, "Intros", 1);
        let item_id = item.id;
        let mut task = Task::new(student, "Prep");
        task.link_agenda_item(item_id);
        let task_id = task.id;

        store
            .transaction(|inner| {
                inner.insert_meeting(meeting)?;
                inner.insert_agenda_item(item)?;
                inner.insert_task(task)
            })
            .unwrap();

        store.transaction(|inner| inner.remove_meeting(meeting_id)).unwrap();
        assert!(store.meeting(meeting_id).is_none());
        assert!(store.agenda_item(item_id).is_none());
        assert!(store.task(task_id).unwrap().agenda_items.is_empty());
    }
}
