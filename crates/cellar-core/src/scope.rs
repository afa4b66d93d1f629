/// The scope carried by an authenticated deploy token (§3, §4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployScope {
    /// No restriction: may deploy to any group/artifact.
    Unscoped,
    /// Restricted to a single group, any artifact within it.
    Group { group: String },
    /// Restricted to a single `(group, artifact)` pair.
    GroupArtifact { group: String, artifact: String },
}

impl DeployScope {
    /// §4.5: a request targeting `(group, artifact)` is allowed iff the
    /// scope is unscoped, group-scoped to the same group, or
    /// group+artifact-scoped to exactly this pair.
    pub fn permits(&self, group: &str, artifact: &str) -> bool {
        match self {
            DeployScope::Unscoped => true,
            DeployScope::Group { group: g } => g == group,
            DeployScope::GroupArtifact {
                group: g,
                artifact: a,
            } => g == group && a == artifact,
        }
    }
}

/// The authenticated party making a request.
#[derive(Debug, Clone)]
pub enum Identity {
    /// HTTP Basic (password) auth — only valid for non-deploy routes; the
    /// deploy routing surface rejects this with `deploy-password-rejection`.
    Cookie { account: String },
    /// A deploy token, scoped per [`DeployScope`].
    Token {
        account: String,
        scope: DeployScope,
    },
}

impl Identity {
    pub fn account(&self) -> &str {
        match self {
            Identity::Cookie { account } => account,
            Identity::Token { account, .. } => account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscoped_permits_everything() {
        assert!(DeployScope::Unscoped.permits("com.example", "lib"));
        assert!(DeployScope::Unscoped.permits("org.other", "thing"));
    }

    #[test]
    fn group_scope_permits_any_artifact_in_group() {
        let scope = DeployScope::Group {
            group: "com.example".into(),
        };
        assert!(scope.permits("com.example", "lib"));
        assert!(scope.permits("com.example", "other-lib"));
        assert!(!scope.permits("com.other", "lib"));
    }

    #[test]
    fn group_artifact_scope_is_exact() {
        let scope = DeployScope::GroupArtifact {
            group: "com.example".into(),
            artifact: "lib".into(),
        };
        assert!(scope.permits("com.example", "lib"));
        assert!(!scope.permits("com.example", "other-lib"));
        assert!(!scope.permits("com.other", "lib"));
    }
}
