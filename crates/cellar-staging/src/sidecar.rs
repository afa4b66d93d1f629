use cellar_util::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SIDECAR_FILENAME: &str = "_metadata.toml";

/// The per-staging-directory metadata record (§3, §6 "Staging sidecar
/// file"). Encoding is TOML rather than the source's EDN — an
/// implementation-defined choice per §6, made here to match the rest of
/// this workspace's flat-record round-tripping (config, lockfiles).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarMetadata {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, rename = "group-path")]
    pub group_path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "timestamp-version")]
    pub timestamp_version: Option<String>,
}

impl SidecarMetadata {
    pub fn path_in(dir: &Path) -> std::path::PathBuf {
        dir.join(SIDECAR_FILENAME)
    }

    /// Load the sidecar for `dir`, or an empty record if none exists yet.
    pub fn load(dir: &Path) -> Result<Self, CoreError> {
        let path = Self::path_in(dir);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(CoreError::Io)?;
        toml::from_str(&content).map_err(|e| CoreError::Generic {
            message: format!("corrupt staging sidecar {}: {e}", path.display()),
        })
    }

    /// Merge-on-nil: fields supplied in `fields` (as `Some`) overwrite the
    /// existing value; fields left `None` in `fields` keep whatever the
    /// sidecar already had (§4.2 "write-metadata").
    pub fn merge(mut self, fields: SidecarMetadata) -> Self {
        if fields.group.is_some() {
            self.group = fields.group;
        }
        if fields.group_path.is_some() {
            self.group_path = fields.group_path;
        }
        if fields.name.is_some() {
            self.name = fields.name;
        }
        if fields.version.is_some() {
            self.version = fields.version;
        }
        if fields.timestamp_version.is_some() {
            self.timestamp_version = fields.timestamp_version;
        }
        self
    }

    pub fn write(&self, dir: &Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self).map_err(|e| CoreError::Generic {
            message: format!("failed to serialize staging sidecar: {e}"),
        })?;
        cellar_util::fs::atomic_write(&Self::path_in(dir), content.as_bytes())?;
        Ok(())
    }

    /// Does this sidecar match `query` per the wildcard rule in §4.2: a
    /// `None` on either side of a comparison wildcards that field.
    pub fn matches(&self, query: &SidecarMetadata) -> bool {
        fn field_matches(query: &Option<String>, sidecar: &Option<String>) -> bool {
            match (query, sidecar) {
                (None, _) | (_, None) => true,
                (Some(q), Some(s)) => q == s,
            }
        }
        field_matches(&query.group, &self.group)
            && field_matches(&query.name, &self.name)
            && field_matches(&query.version, &self.version)
            && field_matches(&query.timestamp_version, &self.timestamp_version)
    }
}
