use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for the deploy ingestion core.
///
/// Every variant corresponds to one of the error tags a caller may see over
/// HTTP; `status()` gives the fixed status code for that tag and
/// `is_validation()` tells the finalizer whether an error already carries
/// user-facing meaning (and so must not be reclassified as
/// [`CoreError::DeployForbidden`] when it bubbles out of a deploy).
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `group`/`artifact`/`version` failed the GAV character rule.
    #[error("{message}")]
    RegexValidationFailed { message: String },

    /// POM coordinate disagrees with the upload path.
    #[error("{message}")]
    PomEntryMismatch { message: String },

    /// Non-snapshot version already has a published jar.
    #[error("{message}")]
    NonSnapshotRedeploy { message: String },

    /// Coordinate is already published on Maven Central.
    #[error("{message}")]
    CentralShadow { message: String },

    /// The Central shadow probe itself failed.
    #[error("{message}")]
    CentralShadowCheckFailure { message: String },

    /// `packaging=jar` but no `*.jar` is staged.
    #[error("{message}")]
    MissingJarFile { message: String },

    /// Neither `.md5` nor `.sha1` sidecar present for a staged file.
    #[error("{message}")]
    FileMissingChecksum { message: String },

    /// A checksum sidecar's content does not match the file.
    #[error("{message}")]
    FileInvalidChecksum { message: String },

    /// Partial PGP signing: some artifacts have `.asc`, others don't.
    #[error("{message}")]
    FileMissingSignature { message: String },

    /// Finalization attempted with no `*.pom` in the staging directory.
    #[error("{message}")]
    MissingPomFile { message: String },

    /// POM XML failed to parse.
    #[error("{message}")]
    InvalidPomFile { message: String },

    /// `maven-metadata.xml` failed to parse.
    #[error("{message}")]
    InvalidMavenMetadataFile { message: String },

    /// Authorization, group ownership, or token-scope failure.
    #[error("{message}")]
    DeployForbidden { message: String },

    /// HTTP Basic credentials presented where a deploy token is required.
    #[error("{message}")]
    DeployPasswordRejection { message: String },

    /// Catch-all for errors with no user-facing tag.
    #[error("{message}")]
    Generic { message: String },
}

impl CoreError {
    /// The fixed HTTP status for this error's tag (§7).
    pub fn status(&self) -> u16 {
        match self {
            CoreError::CentralShadowCheckFailure { .. } => 503,
            CoreError::DeployPasswordRejection { .. } => 401,
            CoreError::Io(_) | CoreError::Generic { .. } => 500,
            _ => 403,
        }
    }

    /// True iff this error already represents a validation rejection rather
    /// than an internal fault — these must propagate unchanged rather than
    /// being reclassified as [`CoreError::DeployForbidden`].
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::RegexValidationFailed { .. }
                | CoreError::PomEntryMismatch { .. }
                | CoreError::NonSnapshotRedeploy { .. }
                | CoreError::CentralShadow { .. }
                | CoreError::CentralShadowCheckFailure { .. }
                | CoreError::MissingJarFile { .. }
                | CoreError::FileMissingChecksum { .. }
                | CoreError::FileInvalidChecksum { .. }
                | CoreError::FileMissingSignature { .. }
                | CoreError::MissingPomFile { .. }
                | CoreError::InvalidPomFile { .. }
                | CoreError::InvalidMavenMetadataFile { .. }
                | CoreError::DeployForbidden { .. }
                | CoreError::DeployPasswordRejection { .. }
        )
    }

    /// Short, stable name for this error kind, used in audit log fields and
    /// test assertions.
    pub fn tag(&self) -> &'static str {
        match self {
            CoreError::Io(_) => "io-error",
            CoreError::RegexValidationFailed { .. } => "regex-validation-failed",
            CoreError::PomEntryMismatch { .. } => "pom-entry-mismatch",
            CoreError::NonSnapshotRedeploy { .. } => "non-snapshot-redeploy",
            CoreError::CentralShadow { .. } => "central-shadow",
            CoreError::CentralShadowCheckFailure { .. } => "central-shadow-check-failure",
            CoreError::MissingJarFile { .. } => "missing-jar-file",
            CoreError::FileMissingChecksum { .. } => "file-missing-checksum",
            CoreError::FileInvalidChecksum { .. } => "file-invalid-checksum",
            CoreError::FileMissingSignature { .. } => "file-missing-signature",
            CoreError::MissingPomFile { .. } => "missing-pom-file",
            CoreError::InvalidPomFile { .. } => "invalid-pom-file",
            CoreError::InvalidMavenMetadataFile { .. } => "invalid-maven-metadata-file",
            CoreError::DeployForbidden { .. } => "deploy-forbidden",
            CoreError::DeployPasswordRejection { .. } => "deploy-password-rejection",
            CoreError::Generic { .. } => "generic",
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type CoreResult<T> = miette::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_their_own_status() {
        let e = CoreError::CentralShadowCheckFailure {
            message: "central unreachable".into(),
        };
        assert_eq!(e.status(), 503);
        assert!(e.is_validation());

        let e = CoreError::DeployPasswordRejection {
            message: "token required".into(),
        };
        assert_eq!(e.status(), 401);

        let e = CoreError::FileMissingChecksum {
            message: "lib-1.0.jar".into(),
        };
        assert_eq!(e.status(), 403);
    }

    #[test]
    fn generic_errors_are_not_validation() {
        let e = CoreError::Generic {
            message: "boom".into(),
        };
        assert!(!e.is_validation());
    }
}
