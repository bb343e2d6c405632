//! Toast-style notification queue with scheduled auto-dismiss.
//!
//! The queue is deliberately independent of any UI: callers push messages,
//! a [`DismissScheduler`] runs the timed work, and whatever front end exists
//! renders `active()` however it likes. Staggered display (used by the
//! restock workflow) is just a delayed push on the same scheduler.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    /// Fixed auto-dismiss duration per level.
    #[must_use]
    pub fn dismiss_after(self) -> Duration {
        match self {
            Level::Success | Level::Info => Duration::from_millis(3500),
            Level::Warning => Duration::from_millis(5000),
            Level::Error => Duration::from_millis(6000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

/// Runs a job after a delay. Abstracted so tests can drive time by hand.
pub trait DismissScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, job: Box<dyn FnOnce() + Send + 'static>);
}

/// Production scheduler: spawns a sleeping task per job.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl DismissScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, job: Box<dyn FnOnce() + Send + 'static>) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        });
    }
}

/// Deterministic scheduler for tests: records jobs, fires them on demand.
#[derive(Default)]
pub struct ManualScheduler {
    jobs: Mutex<Vec<(Duration, Box<dyn FnOnce() + Send + 'static>)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs the earliest-scheduled job. Returns `false` if none were pending.
    pub fn fire_next(&self) -> bool {
        let job = {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            if jobs.is_empty() {
                return false;
            }
            let earliest = jobs
                .iter()
                .enumerate()
                .min_by_key(|(_, (delay, _))| *delay)
                .map(|(i, _)| i)
                .unwrap_or(0);
            jobs.remove(earliest).1
        };
        job();
        true
    }

    /// Runs every job pending at the time of the call, earliest first.
    /// Jobs scheduled by the fired jobs themselves stay pending.
    pub fn fire_pending(&self) {
        let count = self.pending();
        for _ in 0..count {
            if !self.fire_next() {
                break;
            }
        }
    }
}

impl DismissScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, job: Box<dyn FnOnce() + Send + 'static>) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((delay, job));
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    active: Vec<Notification>,
}

/// Process-wide list of timed messages with auto-dismiss.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<QueueInner>>,
    scheduler: Arc<dyn DismissScheduler>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new(scheduler: Arc<dyn DismissScheduler>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner::default())),
            scheduler,
        }
    }

    /// Displays a message now and schedules its auto-dismiss.
    pub fn push(&self, level: Level, message: impl Into<String>) -> u64 {
        let message = message.into();
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.active.push(Notification { id, level, message });
            id
        };

        let queue = self.clone();
        self.scheduler
            .schedule(level.dismiss_after(), Box::new(move || queue.dismiss(id)));
        id
    }

    /// Displays a message after `delay` (display cadence only; the work that
    /// triggered it has already happened).
    pub fn push_in(&self, level: Level, message: impl Into<String>, delay: Duration) {
        let queue = self.clone();
        let message = message.into();
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                queue.push(level, message);
            }),
        );
    }

    pub fn dismiss(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.active.retain(|n| n.id != id);
    }

    /// Snapshot of currently displayed notifications, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_queue() -> (NotificationQueue, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        (NotificationQueue::new(scheduler.clone()), scheduler)
    }

    #[test]
    fn push_displays_immediately_and_dismisses_on_schedule() {
        let (queue, scheduler) = manual_queue();

        let id = queue.push(Level::Success, "saved");
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.active()[0].id, id);
        assert_eq!(scheduler.pending(), 1);

        assert!(scheduler.fire_next());
        assert!(queue.active().is_empty());
    }

    #[test]
    fn push_in_defers_the_display() {
        let (queue, scheduler) = manual_queue();

        queue.push_in(Level::Info, "later", Duration::from_millis(250));
        assert!(queue.active().is_empty());

        // Firing the display job pushes the notification (and schedules its
        // own dismiss job).
        assert!(scheduler.fire_next());
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.active()[0].message, "later");
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn manual_dismiss_removes_only_that_notification() {
        let (queue, _scheduler) = manual_queue();

        let first = queue.push(Level::Warning, "low stock");
        let second = queue.push(Level::Error, "restock failed");

        queue.dismiss(first);
        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
    }

    #[test]
    fn error_level_lingers_longest() {
        assert!(Level::Error.dismiss_after() > Level::Warning.dismiss_after());
        assert!(Level::Warning.dismiss_after() > Level::Success.dismiss_after());
    }

    #[test]
    fn fire_pending_runs_only_jobs_present_at_call_time() {
        let (queue, scheduler) = manual_queue();

        queue.push_in(Level::Success, "first", Duration::from_millis(0));
        queue.push_in(Level::Success, "second", Duration::from_millis(100));
        assert_eq!(scheduler.pending(), 2);

        scheduler.fire_pending();
        // Both displays ran; their dismiss jobs are newly pending.
        assert_eq!(queue.active().len(), 2);
        assert_eq!(scheduler.pending(), 2);
    }
}
