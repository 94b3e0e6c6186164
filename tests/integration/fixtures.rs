//! Test fixtures for integration tests.
//!
//! Provides a [`Harness`] wiring a [`Model`] to the command executor and a
//! [`FakeBackend`], plus row builders for small hand-made hosts.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use podboard::app::Effects;
use podboard::backend::{Backend, FakeBackend};
use podboard::config::Config;
use podboard::dialog::{Focus, Overlay};
use podboard::refresh::{fast_refresh_channel, FastRefreshReceiver};
use podboard::resource::{ResourceKind, ResourceRow, ResourceTables};
use podboard::tea::{update, Command, Message, Model, ResourceView};

const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A model, its executor and the backend behind it.
pub struct Harness {
    pub model: Model,
    pub backend: Arc<FakeBackend>,
    pub effects: Effects,
    pub msg_rx: mpsc::UnboundedReceiver<Message>,
    pub fast_rx: FastRefreshReceiver,
}

impl Harness {
    /// Build a harness whose tables already hold every list `backend` can
    /// produce.
    pub fn new(backend: FakeBackend) -> Self {
        let backend = Arc::new(backend);
        let tables = Arc::new(ResourceTables::new());
        for kind in ResourceKind::ALL {
            if let Ok(rows) = backend.list(kind) {
                tables.replace(kind, rows);
            }
        }

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (fast_tx, fast_rx) = fast_refresh_channel();
        let dyn_backend: Arc<dyn Backend> = backend.clone();
        let effects = Effects::new(dyn_backend, msg_tx, fast_tx, Duration::from_millis(20));

        let mut model = Model::new(Config::default(), tables.clone());
        for view in model.views.iter_mut() {
            view.reconcile(&tables);
        }

        Self {
            model,
            backend,
            effects,
            msg_rx,
            fast_rx,
        }
    }

    /// Feed a message through `update` and execute the commands it returns.
    pub async fn send(&mut self, msg: Message) -> Vec<Command> {
        let cmds = update(&mut self.model, msg);
        self.effects.apply(cmds.clone()).await;
        cmds
    }

    pub async fn press(&mut self, code: KeyCode) -> Vec<Command> {
        self.send(Message::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .await
    }

    pub async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }

    /// Wait for the next background message without applying it.
    pub async fn next_message(&mut self) -> Message {
        tokio::time::timeout(MESSAGE_TIMEOUT, self.msg_rx.recv())
            .await
            .expect("timed out waiting for a background message")
            .expect("message channel closed")
    }

    /// Wait for the next background message and apply it.
    pub async fn settle(&mut self) -> Vec<Command> {
        let msg = self.next_message().await;
        self.send(msg).await
    }

    /// Switch to `kind`'s page and put the cursor on the row with `id`.
    pub fn select(&mut self, kind: ResourceKind, id: &str) {
        self.model.active = kind.index();
        let tables = self.model.tables.clone();
        let index = tables
            .rows(kind)
            .iter()
            .position(|r| r.id == id)
            .expect("row to select");
        let view = self.model.view_mut(kind);
        view.cursor = index;
        view.reconcile(&tables);
    }

    /// Open the command picker and run `name` from it.
    pub async fn run_command(&mut self, name: &str) -> Vec<Command> {
        self.press(KeyCode::Enter).await;
        let kind = self.model.active_kind();
        let position = podboard::catalog::catalog(kind)
            .iter()
            .position(|c| c.name == name)
            .expect("command in catalog");
        for _ in 0..position {
            self.press(KeyCode::Down).await;
        }
        self.press(KeyCode::Enter).await
    }

    pub fn view(&self) -> &ResourceView {
        self.model.active_view()
    }

    pub fn focus(&self) -> Focus {
        self.view().modals.focused()
    }

    pub fn overlay(&self) -> &Overlay {
        self.view().modals.primary()
    }

    pub fn error_text(&self) -> Option<String> {
        self.view().modals.error().map(|e| e.text())
    }
}

pub fn row(id: &str, name: &str) -> ResourceRow {
    ResourceRow::new(id, name, vec![id.to_string(), name.to_string()])
}

/// A host with a single pod `abc123`.
pub fn single_pod() -> FakeBackend {
    FakeBackend::new().with_rows(ResourceKind::Pods, vec![row("abc123", "web")])
}
