//! Core domain types, port definitions and the client facade for rmbridge.
//!
//! `rmbridge-core` knows nothing about subprocesses, HTTP or archives. It
//! describes *what* can be asked of the remote document tree ([`Intent`]),
//! the ports an adapter has to provide ([`Provisioner`],
//! [`ExecutionBackend`]) and the [`RemarkableClient`] that composes them.
//! Adapters live in `rmbridge-runtime`.

pub mod config;
pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;
pub mod services;

pub use config::{ClientConfig, ConfigError};
pub use domain::{
    BinaryDescriptor, EntryKind, Intent, InvocationResult, InvocationSpec, OperationOutcome,
    PAPERS_ROOT, RemoteEntry, RemotePath, parse_listing, validate_local_file,
};
pub use error::{BridgeError, BuildError, InvocationError, OperationFailure, ProvisionError};
pub use paths::PathError;
pub use ports::{ExecutionBackend, Provisioner};
pub use services::{ClientState, RemarkableClient};
