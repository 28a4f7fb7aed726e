use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Run `fut` until it completes or `token` is cancelled.
///
/// Resolves to `None` on cancellation. The future is dropped at that point,
/// which aborts any in-flight HTTP exchange, so no result is ever delivered
/// afterwards. A token that is already cancelled wins over a ready future.
pub async fn cancellable<F>(token: &CancellationToken, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        out = fut => Some(out),
    }
}
