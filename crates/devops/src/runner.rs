use lazyaz_core::SourceError;
use std::process::{Command, Stdio};

/// Runs one `az` invocation and returns its stdout.
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[String]) -> Result<Vec<u8>, SourceError>;
}

/// The real Azure CLI.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl Default for AzCli {
    fn default() -> Self {
        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        Self {
            program: program.to_string(),
        }
    }
}

impl AzCli {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CommandRunner for AzCli {
    fn run(&self, args: &[String]) -> Result<Vec<u8>, SourceError> {
        tracing::debug!(program = %self.program, ?args, "running az command");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SourceError::Command(format!("failed to launch {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            tracing::warn!(program = %self.program, %message, "az command failed");
            return Err(SourceError::Command(message));
        }
        Ok(output.stdout)
    }
}
