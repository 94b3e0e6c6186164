//! Command dispatcher: turns a picked command name into dialogs and
//! backend operations.

use crate::backend::{CreateChoices, Operation, Verb};
use crate::catalog::{self, CommandAction};
use crate::dialog::{
    ConfirmDialog, ConfirmTag, ConfirmationContext, CreateDialog, DialogKind, InputDialog,
    InputPurpose, Overlay, StatsDialog,
};
use crate::resource::{ResourceKind, ResourceSelection};
use crate::runner::OperationId;
use crate::{plog_debug, plog_warn, Error};

use super::command::Command;
use super::model::Model;
use super::operations::{begin_operation, show_error};

/// Run the catalog command `name` on `kind`'s view.
pub fn run_command(model: &mut Model, kind: ResourceKind, name: &str, cmds: &mut Vec<Command>) {
    let Some(spec) = catalog::find(kind, name) else {
        plog_warn!("run_command: unknown {} command {}", kind.noun(), name);
        return;
    };
    plog_debug!("run_command {} {}", kind.noun(), name);

    let view = model.view_mut(kind);
    view.modals.hide(DialogKind::Commands);
    let selection = view.selection.clone();

    if spec.requires_selection && selection.is_none() {
        let err = Error::NoSelection(spec.missing_selection(kind));
        show_error(model, kind, None, &err);
        return;
    }

    match spec.action {
        CommandAction::Confirm(tag) => {
            let ctx = ConfirmationContext {
                tag,
                target: selection,
            };
            let dialog = ConfirmDialog::for_context(kind, &ctx);
            let view = model.view_mut(kind);
            view.confirmation = Some(ctx);
            view.modals.display(Overlay::Confirm(dialog));
        }
        CommandAction::Run(verb) => {
            if let Some(target) = selection {
                begin_operation(
                    model,
                    kind,
                    Operation::Target {
                        kind,
                        verb,
                        id: target.id,
                    },
                    cmds,
                );
            }
        }
        CommandAction::Prompt(purpose) => {
            model
                .view_mut(kind)
                .modals
                .display(Overlay::Input(InputDialog::new(purpose, selection)));
        }
        CommandAction::Create => {
            model.view_mut(kind).pending_create = true;
            cmds.push(Command::LoadCreateChoices { kind });
        }
        CommandAction::Stats => {
            let ids: Vec<String> = selection.into_iter().map(|s| s.id).collect();
            let id = OperationId::new();
            let view = model.view_mut(kind);
            view.live = true;
            view.modals
                .display(Overlay::Stats(StatsDialog::new(kind, id, ids.clone())));
            cmds.push(Command::StartLiveView { kind, id, ids });
        }
    }
    model.dirty = true;
}

/// The confirm dialog's accept path: the only way a destructive command
/// reaches the backend.
pub fn accept_confirmation(model: &mut Model, kind: ResourceKind, cmds: &mut Vec<Command>) {
    let view = model.view_mut(kind);
    view.modals.hide(DialogKind::Confirm);
    let Some(ctx) = view.confirmation.take() else {
        plog_warn!("accept_confirmation: no pending {} confirmation", kind.noun());
        return;
    };
    let operation = match (ctx.tag, ctx.target) {
        (ConfirmTag::Prune, _) => Operation::Prune { kind },
        (ConfirmTag::Remove, Some(t)) => target_op(kind, Verb::Remove, t),
        (ConfirmTag::Kill, Some(t)) => target_op(kind, Verb::Kill, t),
        (tag, None) => {
            plog_warn!("accept_confirmation: {:?} without a target", tag);
            return;
        }
    };
    begin_operation(model, kind, operation, cmds);
}

pub fn cancel_confirmation(model: &mut Model, kind: ResourceKind) {
    let view = model.view_mut(kind);
    view.modals.hide(DialogKind::Confirm);
    view.confirmation = None;
    model.dirty = true;
}

fn target_op(kind: ResourceKind, verb: Verb, target: ResourceSelection) -> Operation {
    Operation::Target {
        kind,
        verb,
        id: target.id,
    }
}

/// Submit a text prompt. An empty value closes it without a backend call.
pub fn submit_input(
    model: &mut Model,
    kind: ResourceKind,
    purpose: InputPurpose,
    value: &str,
    target: Option<ResourceSelection>,
    cmds: &mut Vec<Command>,
) {
    model.view_mut(kind).modals.hide(DialogKind::Input);
    model.dirty = true;
    let value = value.trim();
    if value.is_empty() {
        plog_debug!("submit_input: empty {:?}, nothing to do", purpose);
        return;
    }
    let id = target.map(|t| t.id).unwrap_or_default();
    let operation = match purpose {
        InputPurpose::Rename => Operation::Rename {
            id,
            name: value.to_string(),
        },
        InputPurpose::Tag => Operation::Tag {
            id,
            target: value.to_string(),
        },
        InputPurpose::Untag => Operation::Untag {
            id,
            image: value.to_string(),
        },
        InputPurpose::Exec => Operation::Exec {
            id,
            command: value.split_whitespace().map(str::to_string).collect(),
        },
        InputPurpose::Search => Operation::Search {
            term: value.to_string(),
        },
    };
    begin_operation(model, kind, operation, cmds);
}

/// Option lists arrived: show the create dialog if it is still wanted.
pub fn open_create(model: &mut Model, kind: ResourceKind, choices: CreateChoices) {
    let infra_image = model.config.infra_image().to_string();
    let view = model.view_mut(kind);
    if !std::mem::take(&mut view.pending_create) {
        plog_debug!("open_create: {} create no longer pending", kind.noun());
        return;
    }
    if view.modals.primary().kind().is_some() {
        plog_debug!("open_create: another {} dialog is open", kind.noun());
        return;
    }
    if let Some(dialog) = CreateDialog::new(kind, choices, &infra_image) {
        view.modals.display(Overlay::Create(Box::new(dialog)));
        model.dirty = true;
    }
}

/// Submit the create form. Validation errors stack above the form so the
/// user can fix the input.
pub fn submit_create(model: &mut Model, kind: ResourceKind, cmds: &mut Vec<Command>) {
    let spec = match model.view(kind).modals.primary() {
        Overlay::Create(dialog) => dialog.spec(),
        _ => return,
    };
    match spec {
        Ok(spec) => {
            model.view_mut(kind).modals.hide(DialogKind::Create);
            begin_operation(model, kind, Operation::Create(spec), cmds);
        }
        Err(err) => {
            let title = format!("{} CREATE ERROR", kind.noun().to_uppercase());
            show_error(model, kind, Some(title), &err);
        }
    }
}

/// Close the stats sub-view and stop its actor.
pub fn close_stats(model: &mut Model, kind: ResourceKind, cmds: &mut Vec<Command>) {
    let view = model.view_mut(kind);
    view.modals.hide(DialogKind::Stats);
    if std::mem::take(&mut view.live) {
        cmds.push(Command::StopLiveView { kind });
    }
    model.dirty = true;
}

/// Pull the highlighted search hit.
pub fn pull_image(model: &mut Model, kind: ResourceKind, image: String, cmds: &mut Vec<Command>) {
    model.view_mut(kind).modals.hide(DialogKind::Table);
    begin_operation(model, kind, Operation::Pull { image }, cmds);
}
