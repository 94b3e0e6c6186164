//! Logic-thread side of the async operation runner: progress bookkeeping on
//! start, and the single completion path.

use crate::backend::{Operation, OperationLabel, Outcome};
use crate::dialog::{ErrorDialog, MessageDialog, Overlay, ProgressDialog, TableDialog, TablePurpose};
use crate::resource::ResourceKind;
use crate::runner::OperationId;
use crate::{plog, plog_debug, plog_error, Error};

use super::command::Command;
use super::model::{Model, Notification};

/// Surface `err` in the error layer of `kind`'s view and log it.
pub fn show_error(model: &mut Model, kind: ResourceKind, title: Option<String>, err: &Error) {
    let dialog = ErrorDialog::new(title, err.to_string());
    plog_error!("{}", dialog.text().to_lowercase());
    model.view_mut(kind).modals.show_error(dialog);
    model.dirty = true;
}

/// Display progress for `operation` and hand it to the runner. A second
/// operation on a view that already has one in flight is dropped.
pub fn begin_operation(
    model: &mut Model,
    kind: ResourceKind,
    operation: Operation,
    cmds: &mut Vec<Command>,
) -> Option<OperationId> {
    let label = operation.label();
    let view = model.view_mut(kind);
    if let Some(running) = view.in_flight {
        plog!(
            "begin_operation: dropping {} {}, {} still running",
            kind.noun(),
            label.verb,
            running.short()
        );
        model.notification = Some(Notification::info(format!(
            "{} {} ignored: another {} operation is in progress",
            kind.noun(),
            label.verb,
            kind.noun()
        )));
        model.dirty = true;
        return None;
    }

    let id = OperationId::new();
    plog_debug!("begin_operation id={} {}", id.short(), label.progress_title());
    view.in_flight = Some(id);
    view.modals.display(Overlay::Progress(ProgressDialog {
        title: label.progress_title(),
        id,
    }));
    model.dirty = true;
    cmds.push(Command::RunOperation {
        kind,
        id,
        operation,
    });
    Some(id)
}

/// Apply the completion of operation `id`: progress is hidden first, then
/// either the error layer or the result is shown.
pub fn finish_operation(
    model: &mut Model,
    kind: ResourceKind,
    id: OperationId,
    label: OperationLabel,
    result: crate::Result<Outcome>,
    cmds: &mut Vec<Command>,
) {
    let view = model.view_mut(kind);
    view.modals.hide_progress(id);
    if view.in_flight == Some(id) {
        view.in_flight = None;
    }
    model.dirty = true;

    match result {
        Err(err) => show_error(model, kind, Some(label.error_title()), &err),
        Ok(outcome) => present(model, kind, &label, outcome, cmds),
    }
}

fn present(
    model: &mut Model,
    kind: ResourceKind,
    label: &OperationLabel,
    outcome: Outcome,
    cmds: &mut Vec<Command>,
) {
    let overlay = match outcome {
        // Batches with per-target errors were already turned into
        // `Error::Aggregate` by the runner.
        Outcome::Done | Outcome::Batch(_) => {
            cmds.push(Command::RefreshNow);
            return;
        }
        Outcome::Text(text) => Overlay::Message(MessageDialog::new(label.result_title(), text)),
        Outcome::Lines(lines) => {
            // Image removal reports what it untagged and deleted.
            if label.verb == "remove" {
                cmds.push(Command::RefreshNow);
            }
            Overlay::Message(MessageDialog::new(label.result_title(), lines.join("\n")))
        }
        Outcome::Table(report) => {
            let purpose = if label.verb == "search" {
                TablePurpose::SearchResults
            } else {
                TablePurpose::Report
            };
            Overlay::Table(TableDialog::new(purpose, label.result_title(), report))
        }
        Outcome::Created(id) => {
            cmds.push(Command::RefreshNow);
            Overlay::Message(MessageDialog::new(
                label.result_title(),
                format!("{} created: {}", kind.noun(), id),
            ))
        }
    };

    // A dialog the user opened meanwhile is not clobbered by a late result.
    let view = model.view_mut(kind);
    if view.modals.primary().kind().is_none() {
        view.modals.display(overlay);
    } else {
        model.notification = Some(Notification::info(format!(
            "{} finished",
            label.result_title()
        )));
    }
}
