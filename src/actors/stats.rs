//! Stats actor: feeds a live stats sub-view until it is closed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, Operation, Outcome};
use crate::refresh::FastRefreshSender;
use crate::resource::ResourceKind;
use crate::runner::OperationId;
use crate::tea::Message;
use crate::util::offload_with_timeout;
use crate::{plog_debug, plog_trace, Error};

use super::ActorHandle;

const STATS_INTERVAL: Duration = Duration::from_millis(1000);
const STATS_TIMEOUT: Duration = Duration::from_secs(5);

pub struct StatsActor {
    backend: Arc<dyn Backend>,
    kind: ResourceKind,
    id: OperationId,
    ids: Vec<String>,
    msg_tx: mpsc::UnboundedSender<Message>,
    fast_tx: FastRefreshSender,
    interval: Duration,
}

impl StatsActor {
    pub fn new(
        backend: Arc<dyn Backend>,
        kind: ResourceKind,
        id: OperationId,
        ids: Vec<String>,
        msg_tx: mpsc::UnboundedSender<Message>,
        fast_tx: FastRefreshSender,
    ) -> Self {
        Self {
            backend,
            kind,
            id,
            ids,
            msg_tx,
            fast_tx,
            interval: STATS_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        plog_debug!("StatsActor::spawn {} id={} {:?}", self.kind, self.id.short(), self.ids);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        plog_debug!("StatsActor {} cancelled", self.kind);
                        break;
                    }
                    _ = interval.tick() => {
                        if self.msg_tx.is_closed() {
                            break;
                        }
                        let msg = self.sample().await;
                        // The sample is not cancelled with the view.
                        if cancel_clone.is_cancelled() {
                            plog_debug!("StatsActor {} cancelled mid-sample", self.kind);
                            break;
                        }
                        let failed = matches!(msg, Message::StatsFailed { .. });
                        let _ = self.msg_tx.send(msg);
                        if failed {
                            break;
                        }
                        // A stats sample is worth a repaint right away.
                        self.fast_tx.notify();
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }

    async fn sample(&self) -> Message {
        let backend = Arc::clone(&self.backend);
        let op = Operation::Stats {
            kind: self.kind,
            ids: self.ids.clone(),
        };
        let result = offload_with_timeout(STATS_TIMEOUT, move || backend.execute(&op)).await;
        match result {
            Ok(Outcome::Table(report)) => {
                plog_trace!("StatsActor {}: {} rows", self.kind, report.rows.len());
                Message::StatsUpdated {
                    kind: self.kind,
                    id: self.id,
                    report,
                }
            }
            Ok(other) => Message::StatsFailed {
                kind: self.kind,
                id: self.id,
                error: Error::Backend(format!("unexpected stats output: {:?}", other)).to_string(),
            },
            Err(e) => Message::StatsFailed {
                kind: self.kind,
                id: self.id,
                error: e.to_string(),
            },
        }
    }
}
