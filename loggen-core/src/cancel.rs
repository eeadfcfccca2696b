//! Cooperative cancellation of a run.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// A one-shot signal that ends a run.
///
/// The pacer races this against its ticker on every iteration. Once the future returned by
/// [`cancelled`](Self::cancelled) completes, no further tick is processed.
pub trait CancelSource {
    /// Completes once cancellation has been requested.
    fn cancelled(&self) -> impl Future<Output = ()> + Send + '_;
}

impl CancelSource for CancellationToken {
    fn cancelled(&self) -> impl Future<Output = ()> + Send + '_ {
        CancellationToken::cancelled(self)
    }
}
