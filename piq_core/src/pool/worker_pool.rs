use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::pool::handler::TaskHandler;
use crate::pool::priority::TaskPriorityPolicy;
use crate::task::task::Task;
use crate::types::types::{PoolError, TaskFailure};

/// Minimum pool size; one worker is always kept free for
/// high-priority displays.
const MIN_WORKERS: usize = 2;

struct PoolState<O, R: 'static> {
    queued: Vec<Arc<Task<O, R>>>,
    in_flight: Vec<Arc<Task<O, R>>>,
    busy_workers: usize,
}

struct PoolInner<O, R: 'static> {
    handler: Arc<dyn TaskHandler<O, R>>,
    priority_policy: Arc<dyn TaskPriorityPolicy<O, R>>,
    worker_count: usize,
    state: Mutex<PoolState<O, R>>,
}

/// Executes queued tasks on up to `worker_count` concurrent handler
/// invocations, picking the next task through a [`TaskPriorityPolicy`].
///
/// The pool is the well-behaved executor of the task contract: for
/// every task it runs it triggers exactly one of `on_succeed` /
/// `on_failure`, exactly once, and it bridges the task's abort channel
/// into the handler's [`CancellationToken`].
///
/// Must be used from within a tokio runtime; handlers run as spawned
/// tasks.
pub struct WorkerPool<O, R: 'static> {
    inner: Arc<PoolInner<O, R>>,
}

impl<O, R: 'static> Clone for WorkerPool<O, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O, R> WorkerPool<O, R>
where
    O: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(
        handler: Arc<dyn TaskHandler<O, R>>,
        priority_policy: Arc<dyn TaskPriorityPolicy<O, R>>,
        worker_count: usize,
    ) -> Result<Self, PoolError> {
        if worker_count < MIN_WORKERS {
            return Err(PoolError::TooFewWorkers(worker_count));
        }
        Ok(Self {
            inner: Arc::new(PoolInner {
                handler,
                priority_policy,
                worker_count,
                state: Mutex::new(PoolState {
                    queued: Vec::new(),
                    in_flight: Vec::new(),
                    busy_workers: 0,
                }),
            }),
        })
    }

    /// Queue a task and return a receiver resolving with its outcome.
    ///
    /// The receiver is a convenience bridge over the task's completion
    /// channels (a once-subscription on each); subscribing to the task
    /// directly works just as well.
    pub fn queue_task(&self, task: Arc<Task<O, R>>) -> oneshot::Receiver<Result<R, TaskFailure>> {
        let (tx, rx) = oneshot::channel();
        // Whichever channel fires first consumes the sender; the
        // sibling once-registration stays behind but finds the gate
        // already consumed.
        let gate = Arc::new(Mutex::new(Some(tx)));

        let success_gate = Arc::clone(&gate);
        task.on_succeed.subscribe_once(move |result: &R| {
            if let Some(tx) = success_gate.lock().unwrap().take() {
                let _ = tx.send(Ok(result.clone()));
            }
        });
        let failure_gate = gate;
        task.on_failure.subscribe_once(move |failure: &TaskFailure| {
            if let Some(tx) = failure_gate.lock().unwrap().take() {
                let _ = tx.send(Err(failure.clone()));
            }
        });

        log::debug!("task {} ({}) queued", task.id(), task.kind());
        self.inner.state.lock().unwrap().queued.push(task);
        PoolInner::pump(&self.inner);
        rx
    }

    /// Abort every task whose options match `filter`. Queued matches
    /// are removed and completed with [`TaskFailure::Aborted`] so
    /// their waiters resolve; in-flight matches get their abort
    /// channel fired and the handler decides. Returns how many tasks
    /// were matched.
    pub fn abort_where<F>(&self, filter: F) -> usize
    where
        F: Fn(&O) -> bool,
    {
        let (removed, aborting) = {
            let mut state = self.inner.state.lock().unwrap();
            let mut removed = Vec::new();
            let mut index = 0;
            while index < state.queued.len() {
                if filter(state.queued[index].options()) {
                    removed.push(state.queued.remove(index));
                } else {
                    index += 1;
                }
            }
            let aborting: Vec<_> = state
                .in_flight
                .iter()
                .filter(|task| filter(task.options()))
                .cloned()
                .collect();
            (removed, aborting)
        };

        let matched = removed.len() + aborting.len();
        for task in removed {
            // Never reached a handler, so the pool completes it here.
            log::debug!("task {} aborted while queued", task.id());
            task.on_abort.trigger(&());
            task.on_failure.trigger(&TaskFailure::Aborted);
        }
        for task in aborting {
            log::debug!("task {} abort requested while in flight", task.id());
            task.abort();
        }
        matched
    }

    pub fn worker_count(&self) -> usize {
        self.inner.worker_count
    }

    pub fn queued_len(&self) -> usize {
        self.inner.state.lock().unwrap().queued.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.inner.state.lock().unwrap().in_flight.len()
    }
}

impl<O, R> PoolInner<O, R>
where
    O: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Dispatch queued tasks into idle workers until the policy stops
    /// selecting or capacity runs out. Called after every queue and
    /// every completion.
    fn pump(inner: &Arc<Self>) {
        loop {
            let task = {
                let mut state = inner.state.lock().unwrap();
                let idle_workers = inner.worker_count - state.busy_workers;
                if idle_workers == 0 || state.queued.is_empty() {
                    return;
                }
                let selected = inner.priority_policy.select_task(
                    idle_workers,
                    state.busy_workers,
                    &state.queued,
                    &state.in_flight,
                );
                let Some(id) = selected else {
                    return;
                };
                let Some(position) = state.queued.iter().position(|task| task.id() == id) else {
                    log::warn!("priority policy selected unknown task {}; ignoring", id);
                    return;
                };
                let task = state.queued.remove(position);
                state.in_flight.push(Arc::clone(&task));
                state.busy_workers += 1;
                task
            };
            Self::dispatch(Arc::clone(inner), task);
        }
    }

    fn dispatch(inner: Arc<Self>, task: Arc<Task<O, R>>) {
        let cancel = CancellationToken::new();
        let abort_bridge = cancel.clone();
        let abort_subscription = task.on_abort.subscribe(move |_| abort_bridge.cancel());

        tokio::spawn(async move {
            log::debug!("task {} ({}) dispatched", task.id(), task.kind());
            let outcome = inner
                .handler
                .handle(task.kind(), task.options(), cancel)
                .await;

            task.on_abort.unsubscribe(abort_subscription);
            {
                let mut state = inner.state.lock().unwrap();
                state.in_flight.retain(|in_flight| in_flight.id() != task.id());
                state.busy_workers -= 1;
            }

            match outcome {
                Ok(result) => task.on_succeed.trigger(&result),
                Err(failure) => {
                    log::debug!("task {} failed: {}", task.id(), failure);
                    task.on_failure.trigger(&failure);
                }
            }

            Self::pump(&inner);
        });
    }
}
