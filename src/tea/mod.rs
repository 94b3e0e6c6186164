//! The Elm Architecture (TEA) implementation for podboard.
//!
//! This module provides a clean separation of concerns:
//! - `Model`: Pure application state
//! - `Message`: Inputs to the update function
//! - `Command`: Outputs (side effects) from the update function
//! - `update`: Pure function that transforms state
//! - `dispatch` / `operations`: the command dispatcher and the logic-thread
//!   half of the operation runner, called from `update`

pub mod command;
pub mod dispatch;
pub mod message;
pub mod model;
pub mod operations;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{Model, Notification, NotificationLevel, ResourceView};
pub use update::update;
