//! PowerShell script execution using `tokio::process`

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::error::InventoryError;

/// Output of a finished script
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit status code (0 for success)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if the script succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs inline scripts through a PowerShell host
#[derive(Debug, Clone)]
pub struct PowerShell {
    program: String,
    timeout: Duration,
}

impl PowerShell {
    /// Windows PowerShell with the given timeout
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "powershell.exe".to_string(),
            timeout,
        }
    }

    /// Use a different host executable (e.g. `pwsh`)
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn execute(&self, script: &str) -> Result<CommandOutput, InventoryError> {
        let start = Instant::now();

        let child = Command::new(&self.program)
            .args(["-NoProfile", "-NonInteractive", "-Command", script])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| InventoryError::SpawnError {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| InventoryError::IoError(e.to_string()))?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration: start.elapsed(),
        })
    }

    /// Run `script`, failing on timeout or non-zero exit
    ///
    /// # Errors
    /// Returns an error if the host cannot be spawned, the script exceeds
    /// the timeout, or it exits non-zero.
    #[instrument(skip(self, script), fields(program = %self.program), level = "debug")]
    pub async fn run(&self, script: &str) -> Result<CommandOutput, InventoryError> {
        let output = match timeout(self.timeout, self.execute(script)).await {
            Ok(result) => result?,
            Err(_) => {
                error!(timeout = ?self.timeout, "script timed out");
                return Err(InventoryError::Timeout(self.timeout));
            }
        };

        debug!(
            status = output.status,
            duration = ?output.duration,
            "script completed"
        );

        if !output.success() {
            error!(status = output.status, stderr = %output.stderr, "script failed");
            return Err(InventoryError::QueryFailed {
                status: output.status,
                message: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}
