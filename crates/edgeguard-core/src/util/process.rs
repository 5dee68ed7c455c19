//! Process execution utilities.

use edgeguard_types::Result;
use std::process::Stdio;
use tracing::trace;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
    /// Exit code (-1 when terminated by a signal)
    pub code: i32,
}

impl CommandOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Stdout followed by stderr, for error diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

/// Execute a command asynchronously and wait for it to finish.
///
/// There is no timeout: a hung child blocks the caller until it exits.
pub async fn run_async(command: &str, args: &[&str]) -> Result<CommandOutput> {
    trace!("exec {} ({} args)", command, args.len());

    let output = tokio::process::Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        code: output.status.code().unwrap_or(-1),
    })
}

/// Redact secrets from command output.
pub fn redact_secrets(output: &str, secrets: &[&str]) -> String {
    let mut redacted = output.to_string();
    for secret in secrets {
        if !secret.is_empty() {
            redacted = redacted.replace(secret, "***REDACTED***");
        }
    }
    redacted
}
