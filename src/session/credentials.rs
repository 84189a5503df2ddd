// ABOUTME: Materializes the ephemeral SSH identity for one deployment run.
// ABOUTME: Key file, known hosts, per-run client config, agent start and key registration.

use super::agent::{self, AgentHandle};
use crate::error::{Error, Result};
use chrono::Utc;
use std::fs::{self, OpenOptions, Permissions};
use std::io::Write as _;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const KEY_FILENAME: &str = "stelo_deploy_key";
pub const KNOWN_HOSTS_FILENAME: &str = "stelo_known_hosts";
pub const MUX_SOCKET_PREFIX: &str = "stelo-mux-";

const CONTROL_PERSIST: &str = "60s";
const KEEP_ALIVE_INTERVAL_SECS: u32 = 30;
const KEEP_ALIVE_COUNT_MAX: u32 = 4;

/// Filesystem artifacts a session may have created.
///
/// Filled in incrementally by [`begin`]; cleanup consumes whatever is present,
/// so a run that failed halfway still tears down everything it made.
#[derive(Debug)]
pub struct SessionArtifacts {
    pub ssh_dir: PathBuf,
    pub key_path: PathBuf,
    pub known_hosts_path: PathBuf,
    /// Directory holding per-run config files and multiplexing sockets.
    pub mux_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub agent: Option<AgentHandle>,
}

impl SessionArtifacts {
    /// Derive the fixed session paths from the user's home directory.
    /// Creates nothing on disk.
    pub fn prepare() -> Result<Self> {
        let home = std::env::var_os("HOME").ok_or(Error::NoHome)?;
        let ssh_dir = PathBuf::from(home).join(".ssh");
        Ok(Self {
            key_path: ssh_dir.join(KEY_FILENAME),
            known_hosts_path: ssh_dir.join(KNOWN_HOSTS_FILENAME),
            ssh_dir,
            mux_dir: std::env::temp_dir(),
            config_path: None,
            agent: None,
        })
    }
}

/// The session identity threaded through subsequent subprocess calls.
///
/// Applied per spawned command instead of mutated into the process-wide
/// environment, so nothing leaks across runs.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub auth_sock: PathBuf,
    pub agent_pid: u32,
    /// Invocation form of the session config, `ssh -F <path>`.
    pub ssh_command: String,
    pub config_path: PathBuf,
}

impl SessionContext {
    /// Set the session environment on a subprocess: agent socket and PID,
    /// plus the SSH command override consumed by tools that shell out over
    /// SSH (git honors `GIT_SSH_COMMAND` for revision fetches).
    pub fn apply(&self, cmd: &mut Command) {
        cmd.env("SSH_AUTH_SOCK", &self.auth_sock)
            .env("SSH_AGENT_PID", self.agent_pid.to_string())
            .env("GIT_SSH_COMMAND", &self.ssh_command);
    }
}

/// Set up the ephemeral SSH identity for this run.
///
/// Creates the SSH directory (0700), writes the private key (0600) and
/// optional known-hosts file (0644), renders a uniquely-named per-run client
/// config (0600), starts an ssh-agent and registers the key with it.
/// Artifacts are recorded on `artifacts` as they appear; on error the caller
/// still owns whatever was already created and must run cleanup.
pub async fn begin(
    artifacts: &mut SessionArtifacts,
    private_key: &str,
    known_hosts: Option<&str>,
    port: u16,
) -> Result<SessionContext> {
    fs::create_dir_all(&artifacts.ssh_dir)?;
    fs::set_permissions(&artifacts.ssh_dir, Permissions::from_mode(0o700))?;

    write_fresh(&artifacts.key_path, private_key, 0o600)?;

    let strict = match known_hosts {
        Some(content) if !content.trim().is_empty() => {
            write_fresh(&artifacts.known_hosts_path, content, 0o644)?;
            true
        }
        _ => {
            tracing::warn!(
                "no known hosts provided: strict host key checking is disabled for this run"
            );
            false
        }
    };

    let config_path = unique_config_path(&artifacts.mux_dir);
    let config = render_ssh_config(
        strict,
        &artifacts.key_path,
        &artifacts.known_hosts_path,
        port,
        &artifacts.mux_dir,
    );
    write_fresh(&config_path, &config, 0o600)?;
    artifacts.config_path = Some(config_path.clone());
    tracing::debug!(path = %config_path.display(), strict, "session ssh config written");

    let agent = agent::start().await?;
    artifacts.agent = Some(agent.clone());

    register_key(&agent, &artifacts.key_path).await?;

    Ok(SessionContext {
        auth_sock: agent.auth_sock,
        agent_pid: agent.pid,
        ssh_command: format!("ssh -F {}", config_path.display()),
        config_path,
    })
}

/// Add the private key to the running agent.
async fn register_key(agent: &AgentHandle, key_path: &Path) -> Result<()> {
    let output = Command::new("ssh-add")
        .arg(key_path)
        .env("SSH_AUTH_SOCK", &agent.auth_sock)
        .env("SSH_AGENT_PID", agent.pid.to_string())
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::KeyRegistration(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    tracing::debug!("private key registered with agent");
    Ok(())
}

/// Write `content` (with a trailing newline) to a fresh file with `mode`.
/// Replaces any prior file so the mode always applies.
fn write_fresh(path: &Path, content: &str, mode: u32) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// Per-run config path; nanosecond timestamp plus PID keeps concurrent runs
/// from colliding.
fn unique_config_path(dir: &Path) -> PathBuf {
    let now = Utc::now();
    let stamp = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros());
    dir.join(format!("stelo_ssh_config_{}_{}", stamp, std::process::id()))
}

fn render_ssh_config(
    strict: bool,
    key_path: &Path,
    known_hosts_path: &Path,
    port: u16,
    mux_dir: &Path,
) -> String {
    let known_hosts = if strict {
        known_hosts_path.display().to_string()
    } else {
        "/dev/null".to_string()
    };
    let control_path = mux_dir.join(format!("{MUX_SOCKET_PREFIX}%h-%p-%r"));

    format!(
        "StrictHostKeyChecking {}\n\
         UserKnownHostsFile {}\n\
         IdentityFile {}\n\
         Port {}\n\
         ControlMaster auto\n\
         ControlPath {}\n\
         ControlPersist {}\n\
         ServerAliveInterval {}\n\
         ServerAliveCountMax {}\n",
        if strict { "yes" } else { "no" },
        known_hosts,
        key_path.display(),
        port,
        control_path.display(),
        CONTROL_PERSIST,
        KEEP_ALIVE_INTERVAL_SECS,
        KEEP_ALIVE_COUNT_MAX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_config_references_known_hosts() {
        let config = render_ssh_config(
            true,
            Path::new("/home/u/.ssh/stelo_deploy_key"),
            Path::new("/home/u/.ssh/stelo_known_hosts"),
            22,
            Path::new("/tmp"),
        );
        assert!(config.contains("StrictHostKeyChecking yes"));
        assert!(config.contains("UserKnownHostsFile /home/u/.ssh/stelo_known_hosts"));
        assert!(config.contains("IdentityFile /home/u/.ssh/stelo_deploy_key"));
        assert!(config.contains("Port 22"));
        assert!(config.contains("ControlMaster auto"));
        assert!(config.contains("ControlPath /tmp/stelo-mux-%h-%p-%r"));
        assert!(config.contains("ControlPersist 60s"));
    }

    #[test]
    fn lax_config_uses_null_device() {
        let config = render_ssh_config(
            false,
            Path::new("/home/u/.ssh/stelo_deploy_key"),
            Path::new("/home/u/.ssh/stelo_known_hosts"),
            2222,
            Path::new("/tmp"),
        );
        assert!(config.contains("StrictHostKeyChecking no"));
        assert!(config.contains("UserKnownHostsFile /dev/null"));
        assert!(config.contains("Port 2222"));
    }

    #[test]
    fn config_paths_are_unique_across_calls() {
        let dir = Path::new("/tmp");
        assert_ne!(unique_config_path(dir), unique_config_path(dir));
    }
}
