// ABOUTME: Confirms the deployer binary is present, executable, and responsive.
// ABOUTME: Self-heals a missing executable bit before probing with --version.

use crate::error::{Error, Result};
use crate::pathguard;
use crate::session::SessionContext;
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Validate the deployer binary and probe it with `--version`.
///
/// The path is confined to the working directory, must exist, and must be
/// executable (a missing executable bit is repaired to 0755). The probe runs
/// inside the working directory with the session environment; a non-zero
/// exit or empty stdout fails verification. Returns the resolved path.
pub async fn verify(binary: &Path, working_dir: &Path, ctx: &SessionContext) -> Result<PathBuf> {
    let resolved = pathguard::resolve_within(working_dir, binary)?;

    if !resolved.is_file() {
        return Err(Error::NotFound(resolved));
    }

    let mode = fs::metadata(&resolved)?.permissions().mode();
    if mode & 0o111 == 0 {
        tracing::debug!(path = %resolved.display(), "setting executable permission");
        fs::set_permissions(&resolved, Permissions::from_mode(0o755)).map_err(|source| {
            Error::Permission {
                path: resolved.clone(),
                source,
            }
        })?;
    }

    let mut cmd = Command::new(&resolved);
    cmd.arg("--version").current_dir(working_dir);
    ctx.apply(&mut cmd);
    let output = cmd.output().await?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.trim();

    if !output.status.success() {
        return Err(Error::VerificationFailed(format!(
            "version probe exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    if version.is_empty() {
        return Err(Error::VerificationFailed(
            "version probe produced no output".to_string(),
        ));
    }

    tracing::info!("deployer version: {version}");
    Ok(resolved)
}
