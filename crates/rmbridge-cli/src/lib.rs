//! Command-line adapter for rmbridge.
//!
//! Parses arguments, resolves a [`rmbridge_core::ClientConfig`] and drives
//! the client built by `rmbridge-runtime`.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod progress;

pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
