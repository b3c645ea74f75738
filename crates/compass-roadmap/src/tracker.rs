//! Task status transitions and application tracker propagation
//!
//! When a task moves to assigned or completed, its template's tracker rules
//! may push status values onto the student's per-school decision rows. The
//! push is one-directional: reopening a task never reverts what an earlier
//! transition wrote.
//!
//! Malformed rule maps are an admin configuration problem, not the student's.
//! They are logged at warn level and skipped; the status change itself always
//! goes through.

use crate::error::RoadmapError;
use crate::notify::{NotificationKind, NotificationPayload, NotificationSink, NullSink, Recipient};
use compass_model::{DecisionId, Task, TaskId, TaskStatus, TrackerRules};
use compass_store::{MemoryStore, StoreError, StoreInner};
use std::sync::Arc;

/// Outcome of one task status transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerPropagation {
    /// The transitioned task
    pub task: TaskId,
    /// Status before the transition
    pub old_status: TaskStatus,
    /// Status after the transition
    pub new_status: TaskStatus,
    /// Decision rows whose tracker fields actually changed
    pub updated: Vec<DecisionId>,
}

/// Moves tasks through their lifecycle and propagates tracker updates
pub struct TrackerUpdater {
    store: Arc<MemoryStore>,
    sink: Arc<dyn NotificationSink>,
}

impl TrackerUpdater {
    /// Updater with no notification delivery
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            sink: Arc::new(NullSink),
        }
    }

    /// Updater that hands completion notifications to a sink
    #[must_use]
    pub fn with_sink(store: Arc<MemoryStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Move a task to a new status and propagate tracker updates
    ///
    /// The status write and every decision-row update commit in the same
    /// transaction. Transitioning to the current status is a no-op that
    /// propagates nothing. Completing a task notifies the student's
    /// counselor, if they have one.
    ///
    /// # Errors
    /// [`RoadmapError::NotFound`] for an unknown task; [`RoadmapError::Store`]
    /// when the commit fails (everything rolled back).
    pub fn transition(
        &self,
        task_id: TaskId,
        new_status: TaskStatus,
    ) -> Result<TrackerPropagation, RoadmapError> {
        if self.store.task(task_id).is_none() {
            return Err(RoadmapError::not_found("task", task_id));
        }
        let now = chrono::Utc::now();
        let outcome = self.store.transaction(move |inner| {
            let mut task = inner
                .task(task_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    kind: "task",
                    id: task_id.to_string(),
                })?;
            let old_status = task.status;
            if old_status == new_status {
                return Ok(TrackerPropagation {
                    task: task_id,
                    old_status,
                    new_status,
                    updated: Vec::new(),
                });
            }
            task.set_status(new_status, now);
            inner.update_task(task.clone())?;
            let updated = on_task_status_change(inner, &task, old_status, new_status)?;
            Ok(TrackerPropagation {
                task: task_id,
                old_status,
                new_status,
                updated,
            })
        })?;

        tracing::info!(
            task = %outcome.task,
            from = ?outcome.old_status,
            to = ?outcome.new_status,
            decisions_updated = outcome.updated.len(),
            "task transitioned"
        );

        if outcome.new_status == TaskStatus::Completed
            && outcome.old_status != TaskStatus::Completed
        {
            self.notify_completion(task_id);
        }

        Ok(outcome)
    }

    fn notify_completion(&self, task_id: TaskId) {
        let Some(task) = self.store.task(task_id) else {
            return;
        };
        let Some(counselor) = self.store.student(task.student).and_then(|s| s.counselor) else {
            return;
        };
        self.sink.deliver(NotificationPayload::task_event(
            Recipient::Counselor(counselor),
            NotificationKind::TaskCompleted,
            format!("Task completed: {}", task.title),
            task_id,
        ));
    }
}

/// Propagate one task status change onto the student's decision rows
///
/// Usable inside a caller-owned transaction; the task's new status must
/// already be written. Returns the ids of the rows that changed. Templates
/// with no tracker filter, template-less tasks, and transitions with no
/// matching rule map all propagate nothing.
pub fn on_task_status_change(
    inner: &mut StoreInner,
    task: &Task,
    old_status: TaskStatus,
    new_status: TaskStatus,
) -> Result<Vec<DecisionId>, StoreError> {
    let Some(template_id) = task.template else {
        return Ok(Vec::new());
    };
    let Some(template) = inner.task_template(template_id) else {
        return Ok(Vec::new());
    };
    if !template.has_tracker_filter() {
        return Ok(Vec::new());
    }

    let rules = match template.compile_rules() {
        Ok(rules) => rules,
        Err(err) => {
            tracing::warn!(
                template = %template_id,
                task = %task.id,
                error = %err,
                "skipping tracker propagation: malformed rule map"
            );
            return Ok(Vec::new());
        }
    };

    let assignment = match (old_status, new_status) {
        // Reopening never reverts; tracker values only move forward
        (TaskStatus::Completed, _) => None,
        (_, TaskStatus::Assigned) => rules.on_assign.as_ref(),
        (_, TaskStatus::Completed) => rules.on_complete.as_ref(),
        _ => None,
    };
    let Some(assignment) = assignment else {
        return Ok(Vec::new());
    };
    if assignment.is_empty() {
        return Ok(Vec::new());
    }

    let TrackerRules {
        predicate,
        only_alter,
        ..
    } = &rules;

    let mut updated = Vec::new();
    for mut decision in inner.decisions_for_student(task.student) {
        if !task.schools.is_empty() && !task.schools.contains(&decision.school) {
            continue;
        }
        if let Some(predicate) = predicate {
            if !predicate.matches(&decision) {
                continue;
            }
        }
        if assignment.apply(&mut decision, only_alter) {
            let id = decision.id;
            inner.update_decision(decision)?;
            updated.push(id);
        }
    }
    Ok(updated)
}
