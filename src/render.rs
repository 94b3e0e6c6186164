use std::sync::atomic::{AtomicU64, Ordering};

use crate::dialog::{ErrorDialog, Focus, Overlay};
use crate::tea::Notification;

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// The active page's table, already reduced to display cells.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub cursor: usize,
}

/// Immutable snapshot handed to the render thread.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub tabs: Vec<&'static str>,
    pub active: usize,
    pub table: TableView,
    /// Primary overlay of the active view, drawn above the table.
    pub overlay: Overlay,
    /// Error layer, drawn above everything.
    pub error: Option<ErrorDialog>,
    pub focus: Focus,
    pub notification: Option<Notification>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            tabs: Vec::new(),
            active: 0,
            table: TableView::default(),
            overlay: Overlay::None,
            error: None,
            focus: Focus::Table,
            notification: None,
        }
    }
}
