//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for managing a reMarkable document tree via rmapi.
#[derive(Parser)]
#[command(name = "rmbridge")]
#[command(about = "Manage reMarkable cloud documents through a managed rmapi binary")]
#[command(version)]
pub struct Cli {
    /// rmapi config file to use for this invocation (defaults to ./.rmapi)
    #[arg(long = "config", global = true)]
    pub config: Option<String>,

    /// Seconds to wait for a single rmapi call before terminating it
    #[arg(long = "timeout", global = true)]
    pub timeout: Option<u64>,

    /// Ask rmapi for verbose diagnostics (RMAPI_TRACE=1)
    #[arg(long = "trace", global = true)]
    pub trace: bool,

    /// Include hidden entries in listings (RMAPI_USE_HIDDEN_FILES=1)
    #[arg(long = "hidden", global = true)]
    pub hidden: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
