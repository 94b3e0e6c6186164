//! Task side of the async operation runner.
//!
//! The runner never touches dialog state: it runs the backend call on the
//! blocking pool and reports back with exactly one
//! [`Message::OperationFinished`], which the logic thread applies.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::{Backend, Operation, Outcome};
use crate::resource::ResourceKind;
use crate::tea::Message;
use crate::util::offload;
use crate::{plog_debug, Error, Result};

/// Identifies one in-flight operation and its progress dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Turn a multi-target report with failures into one aggregate error, even
/// when the call itself returned successfully.
pub fn settle(outcome: Outcome) -> Result<Outcome> {
    match outcome {
        Outcome::Batch(report) if !report.errors.is_empty() => Err(Error::Aggregate(report.errors)),
        other => Ok(other),
    }
}

#[derive(Clone)]
pub struct OperationRunner {
    backend: Arc<dyn Backend>,
    msg_tx: mpsc::UnboundedSender<Message>,
}

impl OperationRunner {
    pub fn new(backend: Arc<dyn Backend>, msg_tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { backend, msg_tx }
    }

    pub fn run(&self, kind: ResourceKind, id: OperationId, operation: Operation) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let msg_tx = self.msg_tx.clone();
        let label = operation.label();

        plog_debug!(
            "OperationRunner::run id={} {} {} backend={}",
            id.short(),
            kind.noun(),
            label.verb,
            backend.name()
        );

        tokio::spawn(async move {
            let result = offload(move || backend.execute(&operation))
                .await
                .and_then(settle);
            plog_debug!("OperationRunner: id={} finished ok={}", id.short(), result.is_ok());
            if msg_tx
                .send(Message::OperationFinished {
                    kind,
                    id,
                    label,
                    result,
                })
                .is_err()
            {
                plog_debug!("OperationRunner: message channel closed");
            }
        })
    }
}
