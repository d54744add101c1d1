//! A tool for executing commands.

use crate::error::ItemError;
use std::path::PathBuf;
use std::process::Stdio;

/// Represents a command executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl Executor {
    /// Executes the command and returns the output.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Io`] if the command could not be spawned or waited on,
    /// and [`ItemError::Encode`] if it exited with a non-zero status.
    pub async fn execute(&self) -> Result<ProcessOutput, ItemError> {
        log::debug!("Executing command: {:?} {:?}", self.executable_path, self.args);

        let mut command = tokio::process::Command::new(&self.executable_path);
        command.args(&self.args);
        command.stdin(Stdio::null());
        command.stdout(Stdio::null());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        #[cfg(target_os = "windows")]
        {
            command.creation_flags(0x08000000);
        }

        let output = command.spawn()?.wait_with_output().await?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);
        if output.status.success() {
            return Ok(ProcessOutput { stderr, code });
        }

        Err(ItemError::Encode { code, stderr })
    }
}
