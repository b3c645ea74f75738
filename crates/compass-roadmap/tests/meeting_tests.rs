//! Integration tests for meeting scheduling and notification rendering

use chrono::{Duration, Utc};
use compass_model::Actor;
use compass_roadmap::{
    MeetingScheduler, NotificationKind, Recipient, RoadmapApplier, RoadmapError,
};
use compass_test_utils::{roadmap_fixture, RecordingSink};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn applied_fixture() -> (compass_test_utils::RoadmapFixture, compass_model::MeetingId) {
    let fx = roadmap_fixture(1, 1, 2);
    let applier = RoadmapApplier::new(Arc::clone(&fx.store));
    let applied = applier
        .apply(fx.roadmap.id, fx.student.id, fx.counselor.id, None)
        .unwrap();
    let meeting = applied.meetings[0].id;
    (fx, meeting)
}

#[test]
fn counselor_scheduling_notifies_only_the_student() {
    let (fx, meeting) = applied_fixture();
    let sink = RecordingSink::new();
    let scheduler = MeetingScheduler::with_sink(Arc::clone(&fx.store), sink.clone());

    let start = Utc::now() + Duration::days(7);
    let end = start + Duration::hours(1);
    let scheduled = scheduler
        .schedule(meeting, start, end, Actor::Counselor(fx.counselor.id))
        .unwrap();

    assert_eq!(scheduled.start, Some(start));
    assert_eq!(scheduled.end, Some(end));
    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].recipient, Recipient::Student(fx.student.id));
    assert_eq!(delivered[0].kind, NotificationKind::MeetingScheduled);
    assert_eq!(delivered[0].meeting, Some(meeting));

    // Counselor scheduling does not default task due dates
    for task in fx.store.tasks_for_meeting(meeting) {
        assert_eq!(task.due, None);
    }
}

#[test]
fn student_scheduling_defaults_due_dates_and_notifies_both() {
    let (fx, meeting) = applied_fixture();
    let sink = RecordingSink::new();
    let scheduler = MeetingScheduler::with_sink(Arc::clone(&fx.store), sink.clone());

    let start = Utc::now() + Duration::days(7);
    scheduler
        .schedule(
            meeting,
            start,
            start + Duration::hours(1),
            Actor::Student(fx.student.id),
        )
        .unwrap();

    let recipients: Vec<_> = sink.delivered().iter().map(|p| p.recipient).collect();
    assert_eq!(
        recipients,
        vec![
            Recipient::Student(fx.student.id),
            Recipient::Counselor(fx.counselor.id),
        ]
    );
    for task in fx.store.tasks_for_meeting(meeting) {
        assert_eq!(task.due, Some(start));
    }
}

#[test]
fn rescheduling_moves_due_dates_that_tracked_the_meeting() {
    let (fx, meeting) = applied_fixture();
    let scheduler = MeetingScheduler::new(Arc::clone(&fx.store));

    let start = Utc::now() + Duration::days(7);
    scheduler
        .schedule(
            meeting,
            start,
            start + Duration::hours(1),
            Actor::Student(fx.student.id),
        )
        .unwrap();

    // One task gets a hand-set due date and must keep it
    let pinned_due = start + Duration::days(3);
    let tasks = fx.store.tasks_for_meeting(meeting);
    let pinned = tasks[0].id;
    fx.store
        .transaction(|inner| {
            let mut task = inner.task(pinned).cloned().unwrap();
            task.due = Some(pinned_due);
            inner.update_task(task)
        })
        .unwrap();

    let new_start = start + Duration::days(14);
    scheduler
        .reschedule(
            meeting,
            new_start,
            new_start + Duration::hours(1),
            Actor::Student(fx.student.id),
        )
        .unwrap();

    for task in fx.store.tasks_for_meeting(meeting) {
        let expected = if task.id == pinned { pinned_due } else { new_start };
        assert_eq!(task.due, Some(expected));
    }
}

#[test]
fn scheduling_misuse_is_rejected() {
    let (fx, meeting) = applied_fixture();
    let scheduler = MeetingScheduler::new(Arc::clone(&fx.store));
    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::hours(1);
    let actor = Actor::Counselor(fx.counselor.id);

    // Backwards interval
    let err = scheduler.schedule(meeting, end, start, actor).unwrap_err();
    assert!(matches!(err, RoadmapError::Scheduling(_)));

    // Reschedule before the first schedule
    let err = scheduler.reschedule(meeting, start, end, actor).unwrap_err();
    assert!(matches!(err, RoadmapError::Scheduling(_)));

    // Cancel before the first schedule
    let err = scheduler.cancel(meeting).unwrap_err();
    assert!(matches!(err, RoadmapError::Scheduling(_)));

    scheduler.schedule(meeting, start, end, actor).unwrap();

    // Schedule twice
    let err = scheduler.schedule(meeting, start, end, actor).unwrap_err();
    assert!(matches!(err, RoadmapError::Scheduling(_)));
}

#[test]
fn cancelling_stamps_and_blocks_further_changes() {
    let (fx, meeting) = applied_fixture();
    let sink = RecordingSink::new();
    let scheduler = MeetingScheduler::with_sink(Arc::clone(&fx.store), sink.clone());

    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::hours(1);
    scheduler
        .schedule(meeting, start, end, Actor::Counselor(fx.counselor.id))
        .unwrap();

    let cancelled = scheduler.cancel(meeting).unwrap();
    assert!(cancelled.cancelled.is_some());
    let last = sink.delivered().pop().unwrap();
    assert_eq!(last.kind, NotificationKind::MeetingCancelled);
    assert_eq!(last.recipient, Recipient::Student(fx.student.id));

    let err = scheduler.cancel(meeting).unwrap_err();
    assert!(matches!(err, RoadmapError::Scheduling(_)));
    let err = scheduler
        .reschedule(meeting, start, end, Actor::Counselor(fx.counselor.id))
        .unwrap_err();
    assert!(matches!(err, RoadmapError::Scheduling(_)));
}

#[test]
fn unknown_meeting_is_not_found() {
    let fx = roadmap_fixture(0, 0, 0);
    let scheduler = MeetingScheduler::new(Arc::clone(&fx.store));
    let start = Utc::now();

    let err = scheduler
        .schedule(
            compass_model::MeetingId::new(),
            start,
            start + Duration::hours(1),
            Actor::Counselor(fx.counselor.id),
        )
        .unwrap_err();
    assert!(matches!(err, RoadmapError::NotFound { kind: "meeting", .. }));
}
