//! Per-view modal stack and the dialogs that live in it.
//!
//! A view holds at most one primary overlay (a tagged variant, so two cannot
//! be displayed at once) plus an optional error layer above it. [`ModalStack::focused`]
//! answers both "who gets the key" and "what is drawn on top".

pub mod create;
pub mod form;

use crate::backend::TableReport;
use crate::catalog::{self, CommandSpec};
use crate::plog_debug;
use crate::resource::{ResourceKind, ResourceSelection};
use crate::runner::OperationId;

pub use create::CreateDialog;
pub use form::{FocusCursor, Form, FormEvent};

/// Primary dialog kinds, in draw/focus precedence order (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DialogKind {
    Commands,
    Input,
    Message,
    Confirm,
    Create,
    Table,
    Stats,
    Progress,
}

/// What currently owns keyboard input in a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Error,
    Dialog(DialogKind),
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: Option<String>,
    pub message: String,
}

impl ErrorDialog {
    pub fn new(title: Option<String>, message: impl Into<String>) -> Self {
        Self {
            title,
            message: message.into(),
        }
    }

    pub fn text(&self) -> String {
        match &self.title {
            Some(title) => format!("{}: {}", title, self.message),
            None => self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDialog {
    pub kind: ResourceKind,
    pub cursor: usize,
}

impl CommandDialog {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind, cursor: 0 }
    }

    pub fn entries(&self) -> &'static [CommandSpec] {
        catalog::catalog(self.kind)
    }

    pub fn selected(&self) -> Option<&'static CommandSpec> {
        self.entries().get(self.cursor)
    }

    pub fn down(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    pub fn up(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(len - 1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPurpose {
    Rename,
    Tag,
    Untag,
    Exec,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDialog {
    pub purpose: InputPurpose,
    pub title: String,
    pub label: &'static str,
    pub button: &'static str,
    pub value: String,
    pub target: Option<ResourceSelection>,
}

impl InputDialog {
    /// A fresh prompt. Only untag pre-fills its value (with the image name).
    pub fn new(purpose: InputPurpose, target: Option<ResourceSelection>) -> Self {
        let subject = target
            .as_ref()
            .map(|t| format!(" ({})", short_id(&t.id)))
            .unwrap_or_default();
        let (title, label, button) = match purpose {
            InputPurpose::Rename => ("PODMAN CONTAINER RENAME", "new name:", "Rename"),
            InputPurpose::Tag => ("PODMAN IMAGE TAG", "target:", "Tag"),
            InputPurpose::Untag => ("PODMAN IMAGE UNTAG", "image:", "Untag"),
            InputPurpose::Exec => ("PODMAN CONTAINER EXEC", "command:", "Exec"),
            InputPurpose::Search => ("PODMAN IMAGE SEARCH", "search term:", "Search"),
        };
        let value = match (purpose, &target) {
            (InputPurpose::Untag, Some(t)) => t.name.clone(),
            _ => String::new(),
        };
        Self {
            purpose,
            title: format!("{title}{subject}"),
            label,
            button,
            value,
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDialog {
    pub title: String,
    pub text: String,
    pub scroll: u16,
}

impl MessageDialog {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            scroll: 0,
        }
    }

    pub fn scroll_down(&mut self) {
        let max = self.text.lines().count().saturating_sub(1) as u16;
        self.scroll = (self.scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmTag {
    Prune,
    Remove,
    Kill,
}

/// Which destructive command a confirm dialog stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationContext {
    pub tag: ConfirmTag,
    pub target: Option<ResourceSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: String,
    pub text: String,
    pub accept_focused: bool,
}

impl ConfirmDialog {
    /// Cancel is focused on display.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            accept_focused: false,
        }
    }

    pub fn for_context(kind: ResourceKind, ctx: &ConfirmationContext) -> Self {
        let noun = kind.noun();
        let (verb, question) = match ctx.tag {
            ConfirmTag::Prune => (
                "prune",
                format!("Are you sure you want to remove all unused {}?", kind.title()),
            ),
            ConfirmTag::Remove => ("rm", format!("Are you sure you want to remove following {noun}?")),
            ConfirmTag::Kill => ("kill", format!("Are you sure you want to kill following {noun}?")),
        };
        let text = match &ctx.target {
            Some(t) => format!("{question}\n\nID: {}\nName: {}", t.id, t.name),
            None => question,
        };
        Self::new(format!("podman {noun} {verb}"), text)
    }

    pub fn toggle(&mut self) {
        self.accept_focused = !self.accept_focused;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePurpose {
    Report,
    /// Registry search hits; Enter pulls the highlighted image.
    SearchResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDialog {
    pub purpose: TablePurpose,
    pub title: String,
    pub report: TableReport,
    pub cursor: usize,
}

impl TableDialog {
    pub fn new(purpose: TablePurpose, title: impl Into<String>, report: TableReport) -> Self {
        Self {
            purpose,
            title: title.into(),
            report,
            cursor: 0,
        }
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.report.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// The image name column of the highlighted search hit.
    pub fn selected_image(&self) -> Option<String> {
        let row = self.report.rows.get(self.cursor)?;
        let name = row.get(1)?.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// The live stats sub-view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsDialog {
    pub title: String,
    /// Identifies the actor feeding this dialog; samples from any other
    /// actor are dropped.
    pub id: OperationId,
    pub ids: Vec<String>,
    pub report: Option<TableReport>,
}

impl StatsDialog {
    pub fn new(kind: ResourceKind, id: OperationId, ids: Vec<String>) -> Self {
        Self {
            title: format!("podman {} stats", kind.noun()),
            id,
            ids,
            report: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDialog {
    pub title: String,
    pub id: OperationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Commands(CommandDialog),
    Input(InputDialog),
    Message(MessageDialog),
    Confirm(ConfirmDialog),
    Create(Box<CreateDialog>),
    Table(TableDialog),
    Stats(StatsDialog),
    Progress(ProgressDialog),
}

impl Overlay {
    pub fn kind(&self) -> Option<DialogKind> {
        match self {
            Overlay::None => None,
            Overlay::Commands(_) => Some(DialogKind::Commands),
            Overlay::Input(_) => Some(DialogKind::Input),
            Overlay::Message(_) => Some(DialogKind::Message),
            Overlay::Confirm(_) => Some(DialogKind::Confirm),
            Overlay::Create(_) => Some(DialogKind::Create),
            Overlay::Table(_) => Some(DialogKind::Table),
            Overlay::Stats(_) => Some(DialogKind::Stats),
            Overlay::Progress(_) => Some(DialogKind::Progress),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalStack {
    error: Option<ErrorDialog>,
    primary: Overlay,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `overlay` as the primary dialog, replacing whatever was there.
    pub fn display(&mut self, overlay: Overlay) {
        if let (Some(old), Some(new)) = (self.primary.kind(), overlay.kind()) {
            plog_debug!("ModalStack::display {:?} replaces {:?}", new, old);
        }
        self.primary = overlay;
    }

    /// Hide the primary dialog if it is of `kind`. Returns whether anything
    /// was hidden.
    pub fn hide(&mut self, kind: DialogKind) -> bool {
        if self.primary.kind() == Some(kind) {
            self.primary = Overlay::None;
            true
        } else {
            false
        }
    }

    /// Hide the progress dialog of operation `id`, leaving any other
    /// dialog in place.
    pub fn hide_progress(&mut self, id: OperationId) -> bool {
        match &self.primary {
            Overlay::Progress(p) if p.id == id => {
                self.primary = Overlay::None;
                true
            }
            _ => false,
        }
    }

    pub fn show_error(&mut self, dialog: ErrorDialog) {
        self.error = Some(dialog);
    }

    pub fn dismiss_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    pub fn error(&self) -> Option<&ErrorDialog> {
        self.error.as_ref()
    }

    pub fn primary(&self) -> &Overlay {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut Overlay {
        &mut self.primary
    }

    pub fn is_displayed(&self, kind: DialogKind) -> bool {
        self.primary.kind() == Some(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.primary.kind().is_none()
    }

    pub fn focused(&self) -> Focus {
        if self.error.is_some() {
            return Focus::Error;
        }
        match self.primary.kind() {
            Some(kind) => Focus::Dialog(kind),
            None => Focus::Table,
        }
    }
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}
