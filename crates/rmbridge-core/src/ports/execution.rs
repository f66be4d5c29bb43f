//! Execution backend port.

use async_trait::async_trait;

use crate::domain::{Intent, OperationOutcome};
use crate::error::BridgeError;

/// Carries out intents against the remote document tree.
///
/// This trait abstracts the execution mechanism so the facade never learns
/// whether an intent became a subprocess call or a protocol request.
///
/// # Design Rules
///
/// - Express **intent**, not argv
/// - A nonzero tool exit maps to [`BridgeError::Operation`] with stderr kept
/// - Implementations must be callable concurrently
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Execute a single intent.
    async fn execute(&self, intent: &Intent) -> Result<OperationOutcome, BridgeError>;

    /// Short backend name used in logs.
    fn name(&self) -> &'static str;
}
