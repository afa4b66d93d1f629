use cellar_util::errors::CoreError;
use once_cell::sync::Lazy;
use regex::Regex;

static GROUP_OR_ARTIFACT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_.-]+$").unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+$").unwrap());

/// A Maven `(group, artifact, version)` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    /// Build a coordinate, enforcing the GAV character rule (§3).
    pub fn parse(group: &str, artifact: &str, version: &str) -> Result<Self, CoreError> {
        if !GROUP_OR_ARTIFACT_RE.is_match(group) {
            return Err(CoreError::RegexValidationFailed {
                message: format!("invalid group name: {group}"),
            });
        }
        if !GROUP_OR_ARTIFACT_RE.is_match(artifact) {
            return Err(CoreError::RegexValidationFailed {
                message: format!("invalid artifact name: {artifact}"),
            });
        }
        if !VERSION_RE.is_match(version) {
            return Err(CoreError::RegexValidationFailed {
                message: format!("invalid version: {version}"),
            });
        }
        Ok(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
        })
    }

    /// True iff `version` ends with `-SNAPSHOT`.
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }

    /// The group with dots converted to slashes, as used in repository paths.
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }
}
