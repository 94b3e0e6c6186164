//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state. The only shared structure it holds is
//! the row tables written by the refresh actor; everything dialog related is
//! owned here and mutated only by `update`.

use std::sync::Arc;

use crate::config::Config;
use crate::dialog::{ConfirmationContext, ModalStack};
use crate::render::{next_version, RenderState, TableView};
use crate::resource::{ResourceKind, ResourceSelection, ResourceTables};
use crate::runner::OperationId;

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// One resource page: its table cursor, selection and modal stack.
#[derive(Debug)]
pub struct ResourceView {
    pub kind: ResourceKind,
    pub cursor: usize,
    pub selection: Option<ResourceSelection>,
    pub modals: ModalStack,
    pub confirmation: Option<ConfirmationContext>,
    /// The operation whose progress dialog this view is showing.
    pub in_flight: Option<OperationId>,
    /// A create dialog is waiting for its option lists.
    pub pending_create: bool,
    /// The stats sub-view actor is running.
    pub live: bool,
}

impl ResourceView {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            cursor: 0,
            selection: None,
            modals: ModalStack::new(),
            confirmation: None,
            in_flight: None,
            pending_create: false,
            live: false,
        }
    }

    /// Re-derive the selection from the table after the rows or cursor
    /// changed. An empty table clears it.
    pub fn reconcile(&mut self, tables: &ResourceTables) {
        let len = tables.len(self.kind);
        if len == 0 {
            self.cursor = 0;
            self.selection = None;
            return;
        }
        self.cursor = self.cursor.min(len - 1);
        self.selection = tables.row(self.kind, self.cursor).map(|r| r.selection());
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    pub views: Vec<ResourceView>,
    pub active: usize,
    pub tables: Arc<ResourceTables>,
    pub notification: Option<Notification>,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Config (immutable after init)
    pub config: Config,
}

impl Model {
    pub fn new(config: Config, tables: Arc<ResourceTables>) -> Self {
        Self {
            views: ResourceKind::ALL.iter().map(|k| ResourceView::new(*k)).collect(),
            active: 0,
            tables,
            notification: None,
            dirty: true,
            config,
        }
    }

    pub fn active_kind(&self) -> ResourceKind {
        self.views[self.active].kind
    }

    pub fn active_view(&self) -> &ResourceView {
        &self.views[self.active]
    }

    pub fn active_view_mut(&mut self) -> &mut ResourceView {
        &mut self.views[self.active]
    }

    pub fn view(&self, kind: ResourceKind) -> &ResourceView {
        &self.views[kind.index()]
    }

    pub fn view_mut(&mut self, kind: ResourceKind) -> &mut ResourceView {
        &mut self.views[kind.index()]
    }

    /// Create an immutable snapshot for the render thread.
    pub fn snapshot(&self) -> RenderState {
        let view = self.active_view();
        let kind = view.kind;
        RenderState {
            version: next_version(),
            tabs: ResourceKind::ALL.iter().map(|k| k.title()).collect(),
            active: self.active,
            table: TableView {
                headers: kind.headers().to_vec(),
                rows: self
                    .tables
                    .rows(kind)
                    .into_iter()
                    .map(|r| r.cells)
                    .collect(),
                cursor: view.cursor,
            },
            overlay: view.modals.primary().clone(),
            error: view.modals.error().cloned(),
            focus: view.modals.focused(),
            notification: self.notification.clone(),
        }
    }
}
