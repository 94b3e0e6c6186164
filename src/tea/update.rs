//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. Key events are routed by the
//! active view's [`ModalStack::focused`](crate::dialog::ModalStack::focused),
//! the same answer the draw routine uses.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dialog::{
    CommandDialog, DialogKind, Focus, FormEvent, InputPurpose, Overlay, TablePurpose,
};
use crate::resource::{ResourceKind, ResourceSelection};
use crate::runner::OperationId;
use crate::{plog_debug, plog_warn, Error};

use super::command::Command;
use super::dispatch::{
    accept_confirmation, cancel_confirmation, close_stats, open_create, pull_image, run_command,
    submit_create, submit_input,
};
use super::message::Message;
use super::model::{Model, Notification};
use super::operations::{finish_operation, show_error};

/// Pure update function: Model + Message → Commands
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                cmds.push(Command::Quit);
                return cmds;
            }
            model.notification = None; // Clear notification on any key press
            model.dirty = true;
            handle_key(model, key, &mut cmds);
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::ListRefreshed(kind) => {
            let tables = Arc::clone(&model.tables);
            model.view_mut(kind).reconcile(&tables);
            model.dirty = true;
        }

        Message::ListFailed { kind, error } => {
            plog_warn!("Message::ListFailed kind={} err={}", kind, error);
            model.notification = Some(Notification::error(format!(
                "cannot refresh {}: {}",
                kind, error
            )));
            model.dirty = true;
        }

        Message::StatsUpdated { kind, id, report } => {
            match model.view_mut(kind).modals.primary_mut() {
                Overlay::Stats(dialog) if dialog.id == id => {
                    dialog.report = Some(report);
                    model.dirty = true;
                }
                _ => plog_debug!("Message::StatsUpdated id={} is stale", id.short()),
            }
        }

        Message::StatsFailed { kind, id, error } => {
            if !stats_open(model, kind, id) {
                plog_debug!("Message::StatsFailed id={} is stale: {}", id.short(), error);
                return cmds;
            }
            close_stats(model, kind, &mut cmds);
            let title = format!("{} STATS ERROR", kind.noun().to_uppercase());
            show_error(model, kind, Some(title), &Error::Backend(error));
        }

        Message::OperationFinished {
            kind,
            id,
            label,
            result,
        } => {
            plog_debug!("Message::OperationFinished id={} ok={}", id.short(), result.is_ok());
            finish_operation(model, kind, id, label, result, &mut cmds);
        }

        Message::CreateChoicesLoaded { kind, choices } => {
            open_create(model, kind, choices);
        }
    }

    cmds
}

fn stats_open(model: &Model, kind: ResourceKind, id: OperationId) -> bool {
    matches!(model.view(kind).modals.primary(), Overlay::Stats(d) if d.id == id)
}

fn handle_key(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let kind = model.active_kind();
    match model.active_view().modals.focused() {
        Focus::Error => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                model.active_view_mut().modals.dismiss_error();
            }
        }
        // Progress swallows everything but page switching.
        Focus::Dialog(DialogKind::Progress) => {
            switch_page(model, key);
        }
        Focus::Dialog(dialog) => handle_dialog_key(model, kind, dialog, key, cmds),
        Focus::Table => handle_table_key(model, key, cmds),
    }
}

fn switch_page(model: &mut Model, key: KeyEvent) -> bool {
    let count = model.views.len();
    let next = match key.code {
        KeyCode::Tab => (model.active + 1) % count,
        KeyCode::BackTab => model.active.checked_sub(1).unwrap_or(count - 1),
        KeyCode::Char(c @ '1'..='5') => (c as usize) - ('1' as usize),
        _ => return false,
    };
    model.active = next.min(count - 1);
    let tables = Arc::clone(&model.tables);
    model.active_view_mut().reconcile(&tables);
    true
}

fn handle_table_key(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if switch_page(model, key) {
        return;
    }
    let kind = model.active_kind();
    let tables = Arc::clone(&model.tables);
    let len = tables.len(kind);
    let view = model.active_view_mut();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if len > 0 {
                view.cursor = (view.cursor + 1) % len;
            }
            view.reconcile(&tables);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if len > 0 {
                view.cursor = view.cursor.checked_sub(1).unwrap_or(len - 1);
            }
            view.reconcile(&tables);
        }
        KeyCode::Enter | KeyCode::Char('m') => {
            view.reconcile(&tables);
            view.modals.display(Overlay::Commands(CommandDialog::new(kind)));
        }
        KeyCode::Char('q') => cmds.push(Command::Quit),
        _ => {}
    }
}

/// What a dialog key asks the dispatcher to do once the dialog borrow ends.
enum Then {
    Nothing,
    Hide(DialogKind),
    Run(&'static str),
    SubmitInput(InputPurpose, String, Option<ResourceSelection>),
    Accept,
    Cancel,
    SubmitCreate,
    Pull(String),
    CloseStats,
}

fn handle_dialog_key(
    model: &mut Model,
    kind: ResourceKind,
    dialog: DialogKind,
    key: KeyEvent,
    cmds: &mut Vec<Command>,
) {
    let then = match model.view_mut(kind).modals.primary_mut() {
        Overlay::Commands(d) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                d.down();
                Then::Nothing
            }
            KeyCode::Up | KeyCode::Char('k') => {
                d.up();
                Then::Nothing
            }
            KeyCode::Enter => d.selected().map_or(Then::Nothing, |c| Then::Run(c.name)),
            KeyCode::Esc => Then::Hide(DialogKind::Commands),
            _ => Then::Nothing,
        },
        Overlay::Input(d) => match key.code {
            KeyCode::Char(c) => {
                d.value.push(c);
                Then::Nothing
            }
            KeyCode::Backspace => {
                d.value.pop();
                Then::Nothing
            }
            KeyCode::Enter => Then::SubmitInput(d.purpose, d.value.clone(), d.target.clone()),
            KeyCode::Esc => Then::Hide(DialogKind::Input),
            _ => Then::Nothing,
        },
        Overlay::Message(d) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                d.scroll_down();
                Then::Nothing
            }
            KeyCode::Up | KeyCode::Char('k') => {
                d.scroll_up();
                Then::Nothing
            }
            KeyCode::Enter | KeyCode::Esc => Then::Hide(DialogKind::Message),
            _ => Then::Nothing,
        },
        Overlay::Confirm(d) => match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                d.toggle();
                Then::Nothing
            }
            KeyCode::Enter if d.accept_focused => Then::Accept,
            KeyCode::Enter | KeyCode::Esc => Then::Cancel,
            _ => Then::Nothing,
        },
        Overlay::Create(d) => match d.form.handle_key(key) {
            FormEvent::None => Then::Nothing,
            FormEvent::Cancel => Then::Hide(DialogKind::Create),
            FormEvent::Submit => Then::SubmitCreate,
        },
        Overlay::Table(d) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                d.down();
                Then::Nothing
            }
            KeyCode::Up | KeyCode::Char('k') => {
                d.up();
                Then::Nothing
            }
            KeyCode::Enter if d.purpose == TablePurpose::SearchResults => d
                .selected_image()
                .map_or(Then::Hide(DialogKind::Table), Then::Pull),
            KeyCode::Enter | KeyCode::Esc => Then::Hide(DialogKind::Table),
            _ => Then::Nothing,
        },
        Overlay::Stats(_) => match key.code {
            KeyCode::Enter | KeyCode::Esc => Then::CloseStats,
            _ => Then::Nothing,
        },
        Overlay::Progress(_) | Overlay::None => {
            plog_warn!("handle_dialog_key: {:?} is not interactive", dialog);
            Then::Nothing
        }
    };

    match then {
        Then::Nothing => {}
        Then::Hide(kind_to_hide) => {
            model.view_mut(kind).modals.hide(kind_to_hide);
        }
        Then::Run(name) => run_command(model, kind, name, cmds),
        Then::SubmitInput(purpose, value, target) => {
            submit_input(model, kind, purpose, &value, target, cmds)
        }
        Then::Accept => accept_confirmation(model, kind, cmds),
        Then::Cancel => cancel_confirmation(model, kind),
        Then::SubmitCreate => submit_create(model, kind, cmds),
        Then::Pull(image) => pull_image(model, kind, image, cmds),
        Then::CloseStats => close_stats(model, kind, cmds),
    }
}
