//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from keyboard
//! events, background actors, or operation completions.

use crossterm::event::KeyEvent;

use crate::backend::{CreateChoices, OperationLabel, Outcome, TableReport};
use crate::resource::ResourceKind;
use crate::runner::OperationId;

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // From the refresh actor; rows are already in the shared tables
    ListRefreshed(ResourceKind),
    ListFailed {
        kind: ResourceKind,
        error: String,
    },

    // From the stats actor
    StatsUpdated {
        kind: ResourceKind,
        id: OperationId,
        report: TableReport,
    },
    StatsFailed {
        kind: ResourceKind,
        id: OperationId,
        error: String,
    },

    // Completion callbacks
    OperationFinished {
        kind: ResourceKind,
        id: OperationId,
        label: OperationLabel,
        result: crate::Result<Outcome>,
    },
    CreateChoicesLoaded {
        kind: ResourceKind,
        choices: CreateChoices,
    },
}
