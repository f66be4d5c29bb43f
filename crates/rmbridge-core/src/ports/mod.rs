//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the facade expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod execution;
pub mod provisioner;

pub use execution::ExecutionBackend;
pub use provisioner::Provisioner;

#[cfg(test)]
pub use execution::MockExecutionBackend;
#[cfg(test)]
pub use provisioner::MockProvisioner;
