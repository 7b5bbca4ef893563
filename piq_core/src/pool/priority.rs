use std::sync::Arc;

use uuid::Uuid;

use crate::task::task::Task;

/// Decides which queued task the pool dispatches next.
///
/// Consulted every time a worker frees up or a task is queued, with
/// the current worker counts and both task lists. Returns the id of a
/// task in `queued`, or `None` to leave the queue untouched for now
/// (e.g. to hold capacity back for more urgent work).
pub trait TaskPriorityPolicy<O, R: 'static>: Send + Sync {
    fn select_task(
        &self,
        idle_workers: usize,
        busy_workers: usize,
        queued: &[Arc<Task<O, R>>],
        in_flight: &[Arc<Task<O, R>>],
    ) -> Option<Uuid>;
}

/// First come, first served.
pub struct FifoPriority;

impl<O, R: 'static> TaskPriorityPolicy<O, R> for FifoPriority {
    fn select_task(
        &self,
        _idle_workers: usize,
        _busy_workers: usize,
        queued: &[Arc<Task<O, R>>],
        _in_flight: &[Arc<Task<O, R>>],
    ) -> Option<Uuid> {
        queued.first().map(|task| task.id())
    }
}
