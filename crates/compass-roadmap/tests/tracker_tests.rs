//! Integration tests for task transitions and tracker propagation

use compass_model::{
    SchoolId, Task, TaskStatus, TaskTemplate, TaskTiming, TrackerField, TrackerStatus,
};
use compass_roadmap::{NotificationKind, Recipient, RoadmapError, TrackerUpdater};
use compass_test_utils::{roadmap_fixture, RecordingSink, RoadmapFixture};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn recommendation_template(school: SchoolId) -> TaskTemplate {
    TaskTemplate::new("Ask for recommendation", TaskTiming::PreMeeting)
        .with_filter("school_id", school.to_string())
        .with_on_assign("recommendation_one_status", "assigned")
        .with_on_complete("recommendation_one_status", "requested")
}

fn seed_task(fx: &RoadmapFixture, template: &TaskTemplate) -> Task {
    let task = Task::from_template(fx.student.id, template);
    let staged = task.clone();
    fx.store
        .transaction(move |inner| inner.insert_task(staged))
        .unwrap();
    task
}

#[test]
fn school_filter_updates_only_the_matching_row() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let school_a = SchoolId::new();
    let school_b = SchoolId::new();
    let row_a = fx.seed_decision(school_a);
    let row_b = fx.seed_decision(school_b);

    let template = recommendation_template(school_a);
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    let outcome = updater.transition(task.id, TaskStatus::Assigned).unwrap();

    assert_eq!(outcome.updated, vec![row_a.id]);
    let row_a = fx.store.decision(row_a.id).unwrap();
    assert_eq!(
        row_a.get(TrackerField::RecommendationOneStatus),
        TrackerStatus::Assigned
    );
    let row_b = fx.store.decision(row_b.id).unwrap();
    assert_eq!(
        row_b.get(TrackerField::RecommendationOneStatus),
        TrackerStatus::Unset
    );
}

#[test]
fn completion_advances_and_reopening_never_reverts() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let school = SchoolId::new();
    let row = fx.seed_decision(school);

    let template = recommendation_template(school);
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    updater.transition(task.id, TaskStatus::Assigned).unwrap();
    updater.transition(task.id, TaskStatus::Completed).unwrap();

    let current = fx.store.decision(row.id).unwrap();
    assert_eq!(
        current.get(TrackerField::RecommendationOneStatus),
        TrackerStatus::Requested
    );

    // Reopening does not walk the field back
    let reopened = updater.transition(task.id, TaskStatus::Open).unwrap();
    assert!(reopened.updated.is_empty());
    let current = fx.store.decision(row.id).unwrap();
    assert_eq!(
        current.get(TrackerField::RecommendationOneStatus),
        TrackerStatus::Requested
    );
}

#[test]
fn lifecycle_timestamps_stamp_once() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let template = TaskTemplate::new("Essay draft", TaskTiming::PostMeeting);
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    updater.transition(task.id, TaskStatus::Assigned).unwrap();
    let assigned_at = fx.store.task(task.id).unwrap().assigned_at;
    assert!(assigned_at.is_some());

    updater.transition(task.id, TaskStatus::Completed).unwrap();
    let completed_at = fx.store.task(task.id).unwrap().completed_at;
    assert!(completed_at.is_some());

    updater.transition(task.id, TaskStatus::Open).unwrap();
    updater.transition(task.id, TaskStatus::Completed).unwrap();
    let after = fx.store.task(task.id).unwrap();
    assert_eq!(after.assigned_at, assigned_at);
    assert_eq!(after.completed_at, completed_at);
}

#[test]
fn template_without_filter_propagates_nothing() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let row = fx.seed_decision(SchoolId::new());

    // On-assign rules but no include filter: tracker untouched
    let template = TaskTemplate::new("Visit campus", TaskTiming::PostMeeting)
        .with_on_assign("application_status", "assigned");
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    let outcome = updater.transition(task.id, TaskStatus::Assigned).unwrap();

    assert!(outcome.updated.is_empty());
    assert_eq!(fx.store.task(task.id).unwrap().status, TaskStatus::Assigned);
    let row = fx.store.decision(row.id).unwrap();
    assert_eq!(row.get(TrackerField::ApplicationStatus), TrackerStatus::Unset);
}

#[test]
fn malformed_rule_map_is_swallowed_and_the_transition_succeeds() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let row = fx.seed_decision(SchoolId::new());

    let template = TaskTemplate::new("Broken config", TaskTiming::PreMeeting)
        .with_filter("recomendation_status", "required")
        .with_on_assign("recommendation_one_status", "assigned");
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    let outcome = updater.transition(task.id, TaskStatus::Assigned).unwrap();

    assert!(outcome.updated.is_empty());
    assert_eq!(fx.store.task(task.id).unwrap().status, TaskStatus::Assigned);
    let row = fx.store.decision(row.id).unwrap();
    assert_eq!(
        row.get(TrackerField::RecommendationOneStatus),
        TrackerStatus::Unset
    );
}

#[test]
fn only_alter_guard_protects_advanced_rows() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let school = SchoolId::new();
    let mut row = fx.seed_decision(school);

    // Row already shows the letter as received; a late assignment must not
    // regress it
    row.set(TrackerField::RecommendationOneStatus, TrackerStatus::Received);
    let staged = row.clone();
    fx.store
        .transaction(move |inner| inner.update_decision(staged))
        .unwrap();

    let template = recommendation_template(school)
        .with_only_alter(vec![String::new(), "required".to_string()]);
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    let outcome = updater.transition(task.id, TaskStatus::Assigned).unwrap();

    assert!(outcome.updated.is_empty());
    let row = fx.store.decision(row.id).unwrap();
    assert_eq!(
        row.get(TrackerField::RecommendationOneStatus),
        TrackerStatus::Received
    );
}

#[test]
fn task_school_refs_narrow_before_the_predicate() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let school_a = fx.seed_decision(SchoolId::new()).school;
    let school_b = fx.seed_decision(SchoolId::new()).school;

    // Filter matches rows with the field still unset, i.e. both rows; the
    // task's explicit school list narrows it to one
    let template = TaskTemplate::new("Send scores", TaskTiming::PreMeeting)
        .with_filter("test_scores_status", "")
        .with_on_complete("test_scores_status", "requested");
    fx.seed_extra_task_template(template.clone());

    let task = Task::from_template(fx.student.id, &template).with_schools(vec![school_a]);
    let staged = task.clone();
    fx.store
        .transaction(move |inner| inner.insert_task(staged))
        .unwrap();

    let updater = TrackerUpdater::new(Arc::clone(&fx.store));
    let outcome = updater.transition(task.id, TaskStatus::Completed).unwrap();

    assert_eq!(outcome.updated.len(), 1);
    let rows = fx.store.decisions_for_student(fx.student.id);
    let status_of = |school| {
        rows.iter()
            .find(|r| r.school == school)
            .unwrap()
            .get(TrackerField::TestScoresStatus)
    };
    assert_eq!(status_of(school_a), TrackerStatus::Requested);
    assert_eq!(status_of(school_b), TrackerStatus::Unset);
}

#[test]
fn completing_a_task_notifies_the_counselor() {
    let mut fx = roadmap_fixture(0, 0, 0);
    let template = TaskTemplate::new("Finish essay", TaskTiming::PostMeeting);
    fx.seed_extra_task_template(template.clone());
    let task = seed_task(&fx, &template);

    let sink = RecordingSink::new();
    let updater = TrackerUpdater::with_sink(Arc::clone(&fx.store), sink.clone());
    updater.transition(task.id, TaskStatus::Completed).unwrap();

    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].kind, NotificationKind::TaskCompleted);
    assert_eq!(delivered[0].recipient, Recipient::Counselor(fx.counselor.id));
    assert_eq!(delivered[0].task, Some(task.id));

    // Completing an already-completed task is a no-op, not a second email
    updater.transition(task.id, TaskStatus::Completed).unwrap();
    assert_eq!(sink.len(), 1);
}

#[test]
fn transitioning_a_missing_task_is_not_found() {
    let fx = roadmap_fixture(0, 0, 0);
    let updater = TrackerUpdater::new(Arc::clone(&fx.store));

    let err = updater
        .transition(compass_model::TaskId::new(), TaskStatus::Assigned)
        .unwrap_err();
    assert!(matches!(err, RoadmapError::NotFound { kind: "task", .. }));
}
