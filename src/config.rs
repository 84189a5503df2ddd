// ABOUTME: Optional stelo.yml manifest: per-project deployment defaults.
// ABOUTME: CLI flags override manifest values; the private key never lives here.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILENAME: &str = "stelo.yml";
pub const MANIFEST_FILENAME_ALT: &str = "stelo.yaml";

/// Deployment defaults discovered from the working directory.
///
/// Every field is optional; anything the manifest leaves out must come from
/// the CLI. Secrets are deliberately not representable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub revision: Option<String>,

    #[serde(default)]
    pub deployer_bin: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub verbosity: Option<String>,

    #[serde(default)]
    pub options: Option<String>,

    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Manifest {
    /// Look for `stelo.yml` (or `stelo.yaml`) in `dir`.
    ///
    /// A missing manifest is not an error; a malformed one is.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        for name in [MANIFEST_FILENAME, MANIFEST_FILENAME_ALT] {
            let path = dir.join(name);
            if path.is_file() {
                let text = fs::read_to_string(&path)?;
                let manifest = serde_yaml::from_str(&text)?;
                tracing::debug!(path = %path.display(), "manifest loaded");
                return Ok(Some(manifest));
            }
        }
        Ok(None)
    }
}

/// Write a starter manifest into `dir`.
pub fn init_manifest(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILENAME);

    if path.exists() && !force {
        return Err(Error::AlreadyExists(path));
    }

    fs::write(&path, template())?;
    Ok(path)
}

fn template() -> &'static str {
    r#"# Deployment defaults for this project. CLI flags override these values.
environment: production
deployer_bin: vendor/bin/dep
port: 22
# verbosity: vv
# options: --parallel --limit=5
# timeout_ms: 600000
"#
}
