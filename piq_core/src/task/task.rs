use uuid::Uuid;

use crate::events::listener::Listener;
use crate::types::types::TaskFailure;

/// One pending, externally-executed unit of asynchronous work.
///
/// `kind` names the operation and `options` configures it; both are
/// opaque to the task itself and read only by the executor. The task
/// stores no status field: completion is observed entirely through
/// which notification channel fired. The executor, never the task,
/// drives `on_succeed` and `on_failure`.
///
/// The issuer owns the task and is responsible for detaching its
/// listeners once it stops caring, so a disposed viewport is not
/// notified. The task does not suppress a late success or failure
/// delivered after `abort`; a well-behaved executor triggers at most
/// one of the two, exactly once (the worker pool guarantees this for
/// tasks it runs).
pub struct Task<O, R: 'static> {
    id: Uuid,
    kind: String,
    options: O,
    /// Fired by the executor with the task's result.
    pub on_succeed: Listener<R>,
    /// Fired by the executor with the reason the task failed.
    pub on_failure: Listener<TaskFailure>,
    /// Fired by [`Task::abort`]; observed by the executor on a
    /// best-effort basis.
    pub on_abort: Listener<()>,
}

impl<O, R: 'static> Task<O, R> {
    pub fn new(kind: impl Into<String>, options: O) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            options,
            on_succeed: Listener::new(),
            on_failure: Listener::new(),
            on_abort: Listener::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn options(&self) -> &O {
        &self.options
    }

    /// Request cancellation. Advisory only: the abort channel fires on
    /// every call, and the executor decides whether and when to
    /// actually stop.
    pub fn abort(&self) {
        self.on_abort.trigger(&());
    }
}
