//! logharbor CLI library.
//!
//! Exposes argument definitions, command handlers and output rendering
//! so they can be exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
