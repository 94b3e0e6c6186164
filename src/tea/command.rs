//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use crate::backend::Operation;
use crate::resource::ResourceKind;
use crate::runner::OperationId;

/// Output commands from the update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand a backend call to the operation runner.
    RunOperation {
        kind: ResourceKind,
        id: OperationId,
        operation: Operation,
    },

    /// Fetch option lists for a create dialog.
    LoadCreateChoices { kind: ResourceKind },

    // Live sub-view (stats)
    StartLiveView {
        kind: ResourceKind,
        id: OperationId,
        ids: Vec<String>,
    },
    StopLiveView { kind: ResourceKind },

    /// Raise the fast refresh signal.
    RefreshNow,

    // App lifecycle
    Quit,
}
