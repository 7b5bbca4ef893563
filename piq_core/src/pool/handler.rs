use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::types::TaskFailure;

/// Performs the work a queued task describes.
///
/// The pool calls `handle` once per dispatched task with the task's
/// kind and options. The token is the abort bridge: the pool cancels
/// it when the task's abort channel fires, and the handler honors it
/// on a best-effort basis — typically by racing the work against
/// `cancel.cancelled()` and returning [`TaskFailure::Aborted`].
///
/// Retry policy, if any, belongs here or above; the task abstraction
/// never retries.
#[async_trait]
pub trait TaskHandler<O, R>: Send + Sync {
    async fn handle(
        &self,
        kind: &str,
        options: &O,
        cancel: CancellationToken,
    ) -> Result<R, TaskFailure>;
}
