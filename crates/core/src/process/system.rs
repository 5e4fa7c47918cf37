//! Runner that spawns real operating system processes.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::ProcessError;
use super::traits::ProcessRunner;
use super::types::{ProcessInvocation, ProcessOutcome};

/// Default runner backed by [`tokio::process`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    fn name(&self) -> &str {
        "system"
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        invocation: &ProcessInvocation,
    ) -> Result<ProcessOutcome, ProcessError> {
        if cancel.is_cancelled() {
            return Err(ProcessError::Cancelled);
        }

        let started_at = Instant::now();

        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            "Spawning external process"
        );

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on cancellation kills the child.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProcessError::NotFound {
                        program: invocation.program.clone(),
                    }
                } else {
                    ProcessError::Io(e)
                }
            })?;

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(
                    program = %invocation.program.display(),
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "External process cancelled, killing it"
                );
                return Err(ProcessError::Cancelled);
            }
            output = child.wait_with_output() => output?,
        };

        let elapsed = started_at.elapsed();

        if !output.status.success() {
            debug!(
                program = %invocation.program.display(),
                status = %output.status,
                elapsed_ms = elapsed.as_millis() as u64,
                "External process failed"
            );
            return Err(ProcessError::failed(output.status, &output.stderr));
        }

        debug!(
            program = %invocation.program.display(),
            elapsed_ms = elapsed.as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "External process finished"
        );

        Ok(ProcessOutcome {
            stdout: output.stdout,
            stderr: output.stderr,
            elapsed,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh(script: &str) -> ProcessInvocation {
        ProcessInvocation::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let outcome = SystemRunner::new()
            .run(
                &CancellationToken::new(),
                &sh("echo hello; echo warning >&2"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.stdout_lossy(), "hello\n");
        assert_eq!(outcome.stderr_lossy(), "warning\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let err = SystemRunner::new()
            .run(
                &CancellationToken::new(),
                &sh("echo 'ERROR: first' >&2; echo 'second' >&2; exit 3"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "exit status: 3: ERROR: first; second");
    }

    #[tokio::test]
    async fn test_non_zero_exit_without_stderr() {
        let err = SystemRunner::new()
            .run(&CancellationToken::new(), &sh("exit 2"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "exit status: 2");
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let err = SystemRunner::new()
            .run(
                &CancellationToken::new(),
                &ProcessInvocation::new("/nonexistent/definitely-not-here"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_stops_process() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let err = SystemRunner::new()
            .run(&token, &sh("sleep 30"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
