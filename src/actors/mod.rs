//! Actor system for background tasks.
//!
//! Each actor is an independent tokio task that communicates with the logic
//! thread via message passing. Actors handle:
//! - Periodic and on-demand resource list refresh (RefreshActor)
//! - Live stats sub-views (StatsActor)
//!
//! NOTE: Keyboard input is handled synchronously in the logic thread,
//! not via an actor, for minimum latency.

pub mod refresh;
pub mod stats;

use tokio_util::sync::CancellationToken;

pub use refresh::RefreshActor;
pub use stats::StatsActor;

/// Handle to a running actor, used for graceful shutdown.
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    /// Create a new actor handle with a cancellation token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Signal the actor to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ActorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
