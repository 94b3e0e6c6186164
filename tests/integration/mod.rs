//! Integration test suite for podboard.
//!
//! These tests drive the pure `update` function and the command executor
//! together against the in-memory backend, the way the logic thread does,
//! without a terminal.
//!
//! # Test Categories
//!
//! - `dispatch_flow`: command picker to backend call to result dialog
//! - `focus_traversal`: focus routing across tables, overlays and forms
//! - `runner`: progress/result ordering and error aggregation
//! - `refresh`: periodic refresh and the fast refresh signal

mod fixtures;

mod dispatch_flow;
mod focus_traversal;
mod refresh;
mod runner;
