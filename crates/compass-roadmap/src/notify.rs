//! Outbound notification surface
//!
//! Services describe what happened; delivery (email, push, in-app) lives
//! behind [`NotificationSink`]. The default [`NullSink`] drops everything,
//! which keeps the services usable in tests and batch jobs.

use compass_model::{CounselorId, MeetingId, StudentId, TaskId};

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A student
    Student(StudentId),
    /// A counselor
    Counselor(CounselorId),
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A meeting got its first start/end times
    MeetingScheduled,
    /// A scheduled meeting moved
    MeetingRescheduled,
    /// A meeting was cancelled
    MeetingCancelled,
    /// A student finished a task
    TaskCompleted,
}

/// One notification, ready for a delivery channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Addressee
    pub recipient: Recipient,
    /// Event class
    pub kind: NotificationKind,
    /// Human-readable subject line
    pub subject: String,
    /// Meeting involved, for meeting events
    pub meeting: Option<MeetingId>,
    /// Task involved, for task events
    pub task: Option<TaskId>,
}

impl NotificationPayload {
    /// Payload for a meeting event
    #[must_use]
    pub fn meeting_event(
        recipient: Recipient,
        kind: NotificationKind,
        subject: impl Into<String>,
        meeting: MeetingId,
    ) -> Self {
        Self {
            recipient,
            kind,
            subject: subject.into(),
            meeting: Some(meeting),
            task: None,
        }
    }

    /// Payload for a task event
    #[must_use]
    pub fn task_event(
        recipient: Recipient,
        kind: NotificationKind,
        subject: impl Into<String>,
        task: TaskId,
    ) -> Self {
        Self {
            recipient,
            kind,
            subject: subject.into(),
            meeting: None,
            task: Some(task),
        }
    }
}

/// Delivery channel for notifications
///
/// Implementations must not fail the calling operation; delivery problems are
/// theirs to log and retry.
pub trait NotificationSink: Send + Sync {
    /// Hand a payload to the channel
    fn deliver(&self, payload: NotificationPayload);
}

/// Sink that discards every payload
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _payload: NotificationPayload) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_constructors_set_the_right_side() {
        let meeting = MeetingId::new();
        let task = TaskId::new();
        let student = Recipient::Student(StudentId::new());

        let m = NotificationPayload::meeting_event(
            student,
            NotificationKind::MeetingScheduled,
            "Kickoff scheduled",
            meeting,
        );
        assert_eq!(m.meeting, Some(meeting));
        assert_eq!(m.task, None);

        let t = NotificationPayload::task_event(
            student,
            NotificationKind::TaskCompleted,
            "Essay done",
            task,
        );
        assert_eq!(t.meeting, None);
        assert_eq!(t.task, Some(task));
    }
}
