// ABOUTME: Test support utilities.
// ABOUTME: Scripted fake deployers and session scaffolding for integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;
use stelo::session::SessionContext;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("stelo=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Write an executable shell script under `dir` and return its path.
#[allow(dead_code)]
pub fn write_script(dir: &Path, rel: &str, body: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, body).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();

    path
}

/// A session identity pointing at nothing. The env plumbing is exercised;
/// the fake deployers never actually dial SSH.
#[allow(dead_code)]
pub fn dummy_session() -> SessionContext {
    SessionContext {
        auth_sock: PathBuf::from("/nonexistent/agent.sock"),
        agent_pid: 1,
        ssh_command: "ssh -F /nonexistent/config".to_string(),
        config_path: PathBuf::from("/nonexistent/config"),
    }
}

/// True when the OpenSSH client tooling the session needs is on PATH.
/// End-to-end tests skip themselves when it is missing.
#[allow(dead_code)]
pub fn ssh_tooling_available() -> bool {
    fn on_path(bin: &str) -> bool {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(bin).is_file()))
            .unwrap_or(false)
    }
    on_path("ssh-agent") && on_path("ssh-add") && on_path("ssh-keygen")
}
