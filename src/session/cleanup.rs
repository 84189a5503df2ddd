// ABOUTME: Best-effort teardown of all SSH artifacts a session may have created.
// ABOUTME: Every step is independent, idempotent, and never fails the run.

use super::credentials::{MUX_SOCKET_PREFIX, SessionArtifacts};
use std::fs;
use std::path::Path;
use tokio::process::Command;

/// Remove everything the session may have left behind.
///
/// Safe to call unconditionally, including after partial setup failure or a
/// second time in a row. Each step is attempted regardless of the others;
/// failures are logged at debug level and never propagate. Returns the
/// number of multiplexing sockets removed.
pub async fn cleanup(artifacts: &SessionArtifacts) -> usize {
    remove_artifact(&artifacts.key_path, "private key");
    remove_artifact(&artifacts.known_hosts_path, "known hosts file");

    if let Some(config_path) = &artifacts.config_path {
        remove_artifact(config_path, "session ssh config");
    }

    let removed = remove_mux_sockets(&artifacts.mux_dir);
    tracing::info!("removed {removed} multiplexing socket(s)");

    if let Some(agent) = &artifacts.agent {
        // ssh-agent -k exits non-zero if the agent is already gone; either
        // way the session's claim on it ends here.
        match Command::new("ssh-agent")
            .arg("-k")
            .env("SSH_AGENT_PID", agent.pid.to_string())
            .env("SSH_AUTH_SOCK", &agent.auth_sock)
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                tracing::debug!(pid = agent.pid, "ssh-agent terminated");
            }
            Ok(output) => {
                tracing::debug!(
                    pid = agent.pid,
                    code = ?output.status.code(),
                    "ssh-agent kill reported failure, ignoring"
                );
            }
            Err(e) => {
                tracing::debug!(pid = agent.pid, "could not run ssh-agent -k: {e}");
            }
        }
    }

    removed
}

fn remove_artifact(path: &Path, what: &str) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "{what} removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "{what} already absent");
        }
        Err(e) => tracing::debug!(path = %path.display(), "could not remove {what}: {e}"),
    }
}

/// Delete leftover connection-multiplexing sockets from the temp directory.
fn remove_mux_sockets(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), "could not scan temp dir: {e}");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(MUX_SOCKET_PREFIX) {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), "could not remove socket: {e}");
            }
        }
    }
    removed
}
