//! Refresh actor: polls every resource list on a fixed interval and on
//! demand when the fast refresh signal is raised.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::refresh::FastRefreshReceiver;
use crate::resource::{ResourceKind, ResourceTables};
use crate::tea::Message;
use crate::util::offload_with_timeout;
use crate::{plog_debug, plog_trace, plog_warn, Result};

use super::ActorHandle;

const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RefreshActor {
    backend: Arc<dyn Backend>,
    tables: Arc<ResourceTables>,
    msg_tx: mpsc::UnboundedSender<Message>,
    fast_rx: FastRefreshReceiver,
    interval: Duration,
    timeout: Duration,
}

impl RefreshActor {
    pub fn new(
        backend: Arc<dyn Backend>,
        tables: Arc<ResourceTables>,
        msg_tx: mpsc::UnboundedSender<Message>,
        fast_rx: FastRefreshReceiver,
    ) -> Self {
        Self {
            backend,
            tables,
            msg_tx,
            fast_rx,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn spawn(mut self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        plog_debug!(
            "RefreshActor::spawn interval={:?} timeout={:?}",
            self.interval,
            self.timeout
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            let mut failing: HashSet<ResourceKind> = HashSet::new();

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        plog_debug!("RefreshActor cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if self.msg_tx.is_closed() {
                            plog_debug!("RefreshActor: message channel closed");
                            break;
                        }
                        self.refresh(&mut failing).await;
                    }
                    Some(()) = self.fast_rx.recv() => {
                        plog_trace!("RefreshActor: fast refresh");
                        self.refresh(&mut failing).await;
                        interval.reset();
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }

    async fn refresh(&self, failing: &mut HashSet<ResourceKind>) {
        for (kind, result) in refresh_tables(&self.backend, &self.tables, self.timeout).await {
            let msg = match result {
                Ok(()) => {
                    failing.remove(&kind);
                    Message::ListRefreshed(kind)
                }
                Err(e) => {
                    // Report a failing list once, not on every tick.
                    if !failing.insert(kind) {
                        continue;
                    }
                    plog_warn!("RefreshActor: {} list failed: {}", kind, e);
                    Message::ListFailed {
                        kind,
                        error: e.to_string(),
                    }
                }
            };
            let _ = self.msg_tx.send(msg);
        }
    }
}

/// List every kind concurrently and store the rows. A failed or timed out
/// list leaves the previous rows in place.
pub async fn refresh_tables(
    backend: &Arc<dyn Backend>,
    tables: &Arc<ResourceTables>,
    timeout: Duration,
) -> Vec<(ResourceKind, Result<()>)> {
    let calls = ResourceKind::ALL.iter().map(|&kind| {
        let backend = Arc::clone(backend);
        async move {
            let rows = offload_with_timeout(timeout, move || backend.list(kind)).await;
            (kind, rows)
        }
    });

    join_all(calls)
        .await
        .into_iter()
        .map(|(kind, rows)| {
            let result = rows.map(|rows| {
                plog_trace!("refresh_tables: {} {} rows", kind, rows.len());
                tables.replace(kind, rows);
            });
            (kind, result)
        })
        .collect()
}
