//! Testing utilities for the Compass workspace
//!
//! Shared fixtures for seeding a store with a roadmap tree, plus a recording
//! notification sink.

#![allow(missing_docs)]

use compass_model::{
    AgendaItemTemplate, Counselor, CounselorMeetingTemplate, Roadmap, SchoolId, Student,
    StudentUniversityDecision, TaskTemplate, TaskTemplateId, TaskTiming,
};
use compass_roadmap::{NotificationPayload, NotificationSink};
use compass_store::MemoryStore;
use parking_lot::Mutex;
use std::sync::Arc;

/// Install an env-filtered subscriber writing to the test harness output
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A seeded store with one roadmap, one student, and one counselor
pub struct RoadmapFixture {
    pub store: Arc<MemoryStore>,
    pub roadmap: Roadmap,
    pub student: Student,
    pub counselor: Counselor,
    pub meeting_templates: Vec<CounselorMeetingTemplate>,
    pub agenda_item_templates: Vec<AgendaItemTemplate>,
    pub task_templates: Vec<TaskTemplate>,
}

/// Seed a roadmap of `meetings` meeting templates, each with `items` agenda
/// item templates, each with `tasks` task templates. No template sharing.
pub fn roadmap_fixture(meetings: usize, items: usize, tasks: usize) -> RoadmapFixture {
    init_tracing();
    let store = Arc::new(MemoryStore::new());

    let counselor = Counselor::new("Dana Reed");
    let student = Student::new("Sam Park").with_counselor(counselor.id);
    store.seed_counselor(counselor.clone()).unwrap();
    store.seed_student(student.clone()).unwrap();

    let mut roadmap = Roadmap::new("Junior Year");
    let mut meeting_templates = Vec::new();
    let mut agenda_item_templates = Vec::new();
    let mut task_templates = Vec::new();

    for mi in 0..meetings {
        let mut meeting = CounselorMeetingTemplate::new(format!("Meeting {}", mi + 1), mi as u32 + 1);
        for ii in 0..items {
            let mut item =
                AgendaItemTemplate::new(format!("Agenda {}.{}", mi + 1, ii + 1), ii as u32 + 1);
            for ti in 0..tasks {
                let task = TaskTemplate::new(
                    format!("Task {}.{}.{}", mi + 1, ii + 1, ti + 1),
                    TaskTiming::PreMeeting,
                );
                item = item.with_task_template(task.id);
                store.seed_task_template(task.clone()).unwrap();
                task_templates.push(task);
            }
            meeting = meeting.with_agenda_item_template(item.id);
            store.seed_agenda_item_template(item.clone()).unwrap();
            agenda_item_templates.push(item);
        }
        roadmap = roadmap.with_meeting_template(meeting.id);
        store.seed_meeting_template(meeting.clone()).unwrap();
        meeting_templates.push(meeting);
    }
    store.seed_roadmap(roadmap.clone()).unwrap();

    RoadmapFixture {
        store,
        roadmap,
        student,
        counselor,
        meeting_templates,
        agenda_item_templates,
        task_templates,
    }
}

impl RoadmapFixture {
    /// Seed one tracker row for the fixture student, returning it
    pub fn seed_decision(&self, school: SchoolId) -> StudentUniversityDecision {
        let decision = StudentUniversityDecision::new(self.student.id, school);
        self.store.seed_decision(decision.clone()).unwrap();
        decision
    }

    /// Seed an extra task template (e.g. one carrying tracker rule maps) and
    /// keep it on the fixture
    pub fn seed_extra_task_template(&mut self, template: TaskTemplate) -> TaskTemplateId {
        self.store.seed_task_template(template.clone()).unwrap();
        let id = template.id;
        self.task_templates.push(template);
        id
    }
}

/// Notification sink that records every payload it is handed
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<NotificationPayload>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything delivered so far, in order
    pub fn delivered(&self) -> Vec<NotificationPayload> {
        self.delivered.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, payload: NotificationPayload) {
        self.delivered.lock().push(payload);
    }
}
