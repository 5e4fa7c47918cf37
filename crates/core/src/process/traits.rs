//! Trait definitions for the process module.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::ProcessError;
use super::types::{ProcessInvocation, ProcessOutcome};

/// Something that can run an external program to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs the invocation and waits for it to exit.
    ///
    /// Implementations must stop the process and return
    /// [`ProcessError::Cancelled`] when `cancel` fires first.
    async fn run(
        &self,
        cancel: &CancellationToken,
        invocation: &ProcessInvocation,
    ) -> Result<ProcessOutcome, ProcessError>;
}
