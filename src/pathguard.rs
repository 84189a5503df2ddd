// ABOUTME: Confines a binary path to a base directory.
// ABOUTME: Rejects relative or absolute paths that resolve outside it.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("base directory {0} cannot be resolved")]
    BadBase(PathBuf),

    #[error("path {candidate} escapes {base}")]
    PathEscape { base: PathBuf, candidate: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Resolve `candidate` against `base` and verify it stays inside `base`.
///
/// The base must exist and is canonicalized, so a symlinked base is judged by
/// its real location. The candidate is canonicalized when it exists and
/// lexically normalized otherwise, so a missing file can still be rejected
/// for escaping. Containment is checked component-wise: `/app2` is not
/// inside `/app`.
pub fn resolve_within(base: &Path, candidate: &Path) -> Result<PathBuf> {
    let base = base
        .canonicalize()
        .map_err(|_| Error::BadBase(base.to_path_buf()))?;

    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    };

    let resolved = joined.canonicalize().unwrap_or_else(|_| normalize(&joined));

    if resolved.starts_with(&base) {
        Ok(resolved)
    } else {
        Err(Error::PathEscape {
            base,
            candidate: candidate.to_path_buf(),
        })
    }
}

/// Lexical `.`/`..` normalization for paths that do not exist yet.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
