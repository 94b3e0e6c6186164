//! Helpers for moving synchronous backend calls off the logic task.
//!
//! Every [`Backend`](crate::backend::Backend) call shells out to podman and
//! can block for seconds (pulls, stats against a busy engine). The logic
//! loop, the runner and the actors all share the logic thread's runtime, and
//! a blocking call made inline would stall one of its workers, so they route
//! backend calls through here. A join failure surfaces as [`Error::TaskJoin`] rather than a
//! panic in the caller.

use std::time::Duration;

use tokio::task::spawn_blocking;
use tokio::time::timeout;

use crate::{Error, Result};

/// Run a blocking backend call on tokio's blocking pool and hand back its
/// own `Result`.
pub async fn offload<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// Like [`offload`], but gives up waiting after `duration` with
/// [`Error::Timeout`]. The blocking call itself keeps running to completion
/// in the pool, so callers must tolerate its side effects landing late.
pub async fn offload_with_timeout<F, T>(duration: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match timeout(duration, spawn_blocking(f)).await {
        Ok(Ok(inner)) => inner,
        Ok(Err(join_err)) => Err(Error::TaskJoin(join_err.to_string())),
        Err(_) => Err(Error::Timeout(duration)),
    }
}
