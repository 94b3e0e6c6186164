//! Fast refresh signal: a single-slot, coalescing "refresh sooner" channel
//! from live sub-views to the periodic list refresher.

use tokio::sync::mpsc;

/// Sending half. Cheap to clone; never blocks.
#[derive(Debug, Clone)]
pub struct FastRefreshSender {
    tx: mpsc::Sender<()>,
}

/// Receiving half, owned by the refresh actor.
#[derive(Debug)]
pub struct FastRefreshReceiver {
    rx: mpsc::Receiver<()>,
}

pub fn fast_refresh_channel() -> (FastRefreshSender, FastRefreshReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (FastRefreshSender { tx }, FastRefreshReceiver { rx })
}

impl FastRefreshSender {
    /// Raise the signal. Returns `false` when a signal was already pending
    /// (the send coalesced) or the receiver is gone.
    pub fn notify(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl FastRefreshReceiver {
    /// Wait for the next signal. `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Consume a pending signal without waiting.
    pub fn try_take(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}
