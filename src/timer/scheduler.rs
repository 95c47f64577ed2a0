//! Deferred task queue driven by an external clock.

use std::time::Instant;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// A task waiting for its due instant.
#[derive(Debug, Clone)]
pub struct ScheduledTask<T> {
    pub id: TaskId,
    pub due: Instant,
    pub task: T,
}

/// Holds deferred tasks until they are due.
///
/// Nothing runs on its own: the owner asks for the next due instant, waits
/// however it likes, then pops due tasks one at a time.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Queue a task for `due`.
    pub fn schedule(&mut self, due: Instant, task: T) -> TaskId {
        self.next_id = self.next_id.saturating_add(1);
        let id = TaskId(self.next_id);
        self.tasks.push(ScheduledTask { id, due, task });
        id
    }

    /// Cancel every task matching the predicate. Returns how many were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !predicate(&t.task));
        before - self.tasks.len()
    }

    /// Drop all pending tasks.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Earliest due instant, if any task is pending.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.iter().map(|t| t.due).min()
    }

    /// Remove and return the earliest task due at or before `now`.
    ///
    /// Ties are broken by scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<ScheduledTask<T>> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(idx, _)| idx)?;
        Some(self.tasks.remove(idx))
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
