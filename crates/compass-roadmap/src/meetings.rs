//! Meeting scheduling, rescheduling, and cancellation
//!
//! Applying a roadmap creates meetings without times; counselors and students
//! put them on the calendar later. Scheduling by the student also defaults
//! due dates on the meeting's tasks, matching the self-serve flow where the
//! meeting date is the deadline for its prep work.

use crate::error::RoadmapError;
use crate::notify::{NotificationKind, NotificationPayload, NotificationSink, NullSink, Recipient};
use chrono::{DateTime, Utc};
use compass_model::{Actor, CounselorMeeting, MeetingId};
use compass_store::MemoryStore;
use std::sync::Arc;

/// Schedules meetings and renders the resulting notifications
pub struct MeetingScheduler {
    store: Arc<MemoryStore>,
    sink: Arc<dyn NotificationSink>,
}

impl MeetingScheduler {
    /// Scheduler with no notification delivery
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            sink: Arc::new(NullSink),
        }
    }

    /// Scheduler that hands payloads to a sink
    #[must_use]
    pub fn with_sink(store: Arc<MemoryStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Put an unscheduled meeting on the calendar
    ///
    /// When the student does the scheduling, the meeting's tasks without a
    /// due date inherit the start time. The student is always notified; the
    /// counselor is notified too unless they scheduled it themselves.
    ///
    /// # Errors
    /// [`RoadmapError::Scheduling`] when the meeting already has times, is
    /// cancelled, or `end <= start`; [`RoadmapError::NotFound`] for an
    /// unknown meeting.
    pub fn schedule(
        &self,
        meeting_id: MeetingId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        actor: Actor,
    ) -> Result<CounselorMeeting, RoadmapError> {
        let meeting = self.load(meeting_id)?;
        if meeting.is_scheduled() {
            return Err(RoadmapError::Scheduling(format!(
                "meeting {meeting_id} is already scheduled"
            )));
        }
        self.place(meeting, start, end, None, actor, NotificationKind::MeetingScheduled)
    }

    /// Move an already-scheduled meeting
    ///
    /// Tasks whose due date is unset or still equals the old start follow the
    /// new start, again only when the student is the one moving it.
    ///
    /// # Errors
    /// [`RoadmapError::Scheduling`] when the meeting has no times yet, is
    /// cancelled, or `end <= start`; [`RoadmapError::NotFound`] for an
    /// unknown meeting.
    pub fn reschedule(
        &self,
        meeting_id: MeetingId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        actor: Actor,
    ) -> Result<CounselorMeeting, RoadmapError> {
        let meeting = self.load(meeting_id)?;
        if !meeting.is_scheduled() {
            return Err(RoadmapError::Scheduling(format!(
                "meeting {meeting_id} has not been scheduled"
            )));
        }
        let old_start = meeting.start;
        self.place(
            meeting,
            start,
            end,
            old_start,
            actor,
            NotificationKind::MeetingRescheduled,
        )
    }

    /// Cancel a scheduled meeting
    ///
    /// # Errors
    /// [`RoadmapError::Scheduling`] when the meeting is unscheduled or
    /// already cancelled; [`RoadmapError::NotFound`] for an unknown meeting.
    pub fn cancel(&self, meeting_id: MeetingId) -> Result<CounselorMeeting, RoadmapError> {
        let mut meeting = self.load(meeting_id)?;
        if !meeting.is_scheduled() {
            return Err(RoadmapError::Scheduling(format!(
                "meeting {meeting_id} has not been scheduled"
            )));
        }
        meeting.cancelled = Some(Utc::now());

        let updated = meeting.clone();
        self.store.transaction(move |inner| inner.update_meeting(updated))?;
        tracing::info!(meeting = %meeting_id, "meeting cancelled");

        self.sink.deliver(NotificationPayload::meeting_event(
            Recipient::Student(meeting.student),
            NotificationKind::MeetingCancelled,
            format!("Meeting cancelled: {}", meeting.title),
            meeting.id,
        ));
        Ok(meeting)
    }

    fn load(&self, meeting_id: MeetingId) -> Result<CounselorMeeting, RoadmapError> {
        let meeting = self
            .store
            .meeting(meeting_id)
            .ok_or_else(|| RoadmapError::not_found("meeting", meeting_id))?;
        if meeting.is_cancelled() {
            return Err(RoadmapError::Scheduling(format!(
                "meeting {meeting_id} is cancelled"
            )));
        }
        Ok(meeting)
    }

    fn place(
        &self,
        mut meeting: CounselorMeeting,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        old_start: Option<DateTime<Utc>>,
        actor: Actor,
        kind: NotificationKind,
    ) -> Result<CounselorMeeting, RoadmapError> {
        if end <= start {
            return Err(RoadmapError::Scheduling(format!(
                "meeting {} end must be after start",
                meeting.id
            )));
        }
        meeting.start = Some(start);
        meeting.end = Some(end);

        let default_due_dates = actor.is_student();
        let updated = meeting.clone();
        self.store.transaction(move |inner| {
            inner.update_meeting(updated.clone())?;
            if default_due_dates {
                for mut task in inner.tasks_for_meeting(updated.id) {
                    let follows = task.due.is_none() || task.due == old_start;
                    if follows && task.due != Some(start) {
                        task.due = Some(start);
                        inner.update_task(task)?;
                    }
                }
            }
            Ok(())
        })?;
        tracing::info!(
            meeting = %meeting.id,
            start = %start,
            end = %end,
            ?kind,
            "meeting placed"
        );

        let verb = match kind {
            NotificationKind::MeetingRescheduled => "rescheduled",
            _ => "scheduled",
        };
        let subject = format!("Meeting {verb}: {}", meeting.title);
        self.sink.deliver(NotificationPayload::meeting_event(
            Recipient::Student(meeting.student),
            kind,
            subject.clone(),
            meeting.id,
        ));
        let actor_is_counselor = matches!(actor, Actor::Counselor(id) if id == meeting.counselor);
        if !actor_is_counselor {
            self.sink.deliver(NotificationPayload::meeting_event(
                Recipient::Counselor(meeting.counselor),
                kind,
                subject,
                meeting.id,
            ));
        }
        Ok(meeting)
    }
}
