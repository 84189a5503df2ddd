// ABOUTME: Starts an ssh-agent subprocess and parses its announcement.
// ABOUTME: Extracts the auth socket path and agent PID for the session.

use crate::error::{Error, Result};
use std::path::PathBuf;
use tokio::process::Command;

/// A running ssh-agent owned by the session.
///
/// Torn down exactly once by cleanup; the PID is what `ssh-agent -k` needs.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    pub auth_sock: PathBuf,
    pub pid: u32,
}

/// Launch `ssh-agent` and extract `SSH_AUTH_SOCK` and `SSH_AGENT_PID` from
/// its sh-style announcement. A missing or malformed field is a hard failure;
/// a half-initialized agent is never returned.
pub(crate) async fn start() -> Result<AgentHandle> {
    let output = Command::new("ssh-agent").arg("-s").output().await?;

    if !output.status.success() {
        return Err(Error::AgentParse(format!(
            "ssh-agent exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let announcement = String::from_utf8_lossy(&output.stdout);

    let auth_sock = extract_var(&announcement, "SSH_AUTH_SOCK")
        .ok_or_else(|| Error::AgentParse("SSH_AUTH_SOCK missing from announcement".to_string()))?;

    let pid_text = extract_var(&announcement, "SSH_AGENT_PID")
        .ok_or_else(|| Error::AgentParse("SSH_AGENT_PID missing from announcement".to_string()))?;

    let pid = pid_text
        .parse::<u32>()
        .map_err(|_| Error::AgentParse(format!("SSH_AGENT_PID is not numeric: '{pid_text}'")))?;

    tracing::debug!(socket = %auth_sock, pid, "ssh-agent started");

    Ok(AgentHandle {
        auth_sock: PathBuf::from(auth_sock),
        pid,
    })
}

/// Pull `NAME=value` out of the announcement, value terminated by `;`.
fn extract_var(announcement: &str, name: &str) -> Option<String> {
    let assignment = format!("{name}=");
    let start = announcement.find(&assignment)? + assignment.len();
    let rest = &announcement[start..];
    let value = rest[..rest.find(';').unwrap_or(rest.len())].trim();
    (!value.is_empty()).then(|| value.to_string())
}
