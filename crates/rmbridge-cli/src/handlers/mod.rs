//! Command handlers.
//!
//! Each handler receives a resolved configuration and prints its result to
//! stdout. Diagnostics go through `tracing` on stderr.

pub mod paths;
pub mod remote;
pub mod setup;
pub mod status;
