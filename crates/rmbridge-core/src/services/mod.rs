//! Services built on top of the ports.

mod client;

pub use client::{ClientState, RemarkableClient};
