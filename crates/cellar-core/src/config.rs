use cellar_util::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Repository configuration loaded from `cellar.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// `(group, artifact)` pairs exempted from the Central-shadow check.
    #[serde(default, rename = "central-shadow-allow-list")]
    pub central_shadow_allow_list: BTreeSet<(String, String)>,

    /// Whether the require-token middleware rejects HTTP Basic credentials.
    /// Defaults to `true` (§4.7); only meant to be disabled in tests.
    #[serde(default = "default_require_token", rename = "require-token")]
    pub require_token: bool,

    #[serde(default = "default_max_body_bytes", rename = "max-body-bytes")]
    pub max_body_bytes: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            storage_root: default_storage_root(),
            central_shadow_allow_list: BTreeSet::new(),
            require_token: default_require_token(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_storage_root() -> PathBuf {
    dirs_path().join("storage")
}

fn default_require_token() -> bool {
    true
}

fn default_max_body_bytes() -> u64 {
    512 * 1024 * 1024
}

impl RepositoryConfig {
    /// Load configuration from the given path, or defaults if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|e| CoreError::Generic {
                message: format!("failed to read config {}: {e}", path.display()),
            })?;
            toml::from_str(&content).map_err(|e| CoreError::Generic {
                message: format!("failed to parse config {}: {e}", path.display()),
            })
        } else {
            Ok(Self::default())
        }
    }

    pub fn allows_central_shadow(&self, group: &str, artifact: &str) -> bool {
        self.central_shadow_allow_list
            .contains(&(group.to_string(), artifact.to_string()))
    }
}

/// Returns the path to the cellar data directory (`~/.cellar/`), used for
/// the default storage root and default config path.
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".cellar")
}
