//! Secret scope resolution.
//!
//! Every verb runs through [`resolve`] so list, get, create, update and
//! delete agree on which secret bucket a request touches. The resolved
//! [`SecretScope`] renders the GitHub REST paths for that bucket.

use serde::Serialize;

/// Which bucket of Actions secrets an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretScope {
    Repository {
        owner: String,
        repo: String,
    },
    Environment {
        owner: String,
        repo: String,
        environment: String,
    },
}

/// Resolve the scope for an operation.
///
/// An environment selects [`SecretScope::Environment`] only when it is present
/// and not blank after trimming; the untrimmed value is kept as given.
pub fn resolve(owner: &str, repo: &str, environment: Option<&str>) -> SecretScope {
    match environment {
        Some(environment) if !environment.trim().is_empty() => SecretScope::Environment {
            owner: owner.to_string(),
            repo: repo.to_string(),
            environment: environment.to_string(),
        },
        _ => SecretScope::Repository {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
    }
}

impl SecretScope {
    pub fn owner(&self) -> &str {
        match self {
            SecretScope::Repository { owner, .. } | SecretScope::Environment { owner, .. } => owner,
        }
    }

    pub fn repo(&self) -> &str {
        match self {
            SecretScope::Repository { repo, .. } | SecretScope::Environment { repo, .. } => repo,
        }
    }

    pub fn environment(&self) -> Option<&str> {
        match self {
            SecretScope::Repository { .. } => None,
            SecretScope::Environment { environment, .. } => Some(environment),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SecretScope::Repository { .. } => "repository",
            SecretScope::Environment { .. } => "environment",
        }
    }

    /// `GET` target listing the scope's secrets
    pub fn secrets_path(&self) -> String {
        match self {
            SecretScope::Repository { owner, repo } => {
                format!("/repos/{owner}/{repo}/actions/secrets")
            }
            SecretScope::Environment {
                owner,
                repo,
                environment,
            } => format!(
                "/repos/{owner}/{repo}/environments/{}/secrets",
                urlencoding::encode(environment)
            ),
        }
    }

    /// `GET`/`PUT`/`DELETE` target for one secret
    pub fn secret_path(&self, name: &str) -> String {
        format!("{}/{}", self.secrets_path(), urlencoding::encode(name))
    }

    /// `GET` target for the sealed-box public key of this scope
    pub fn public_key_path(&self) -> String {
        format!("{}/public-key", self.secrets_path())
    }
}

impl std::fmt::Display for SecretScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretScope::Repository { owner, repo } => write!(f, "{owner}/{repo}"),
            SecretScope::Environment {
                owner,
                repo,
                environment,
            } => write!(f, "{owner}/{repo} (environment '{environment}')"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_environment_selects_repository() {
        for environment in [None, Some(""), Some("   "), Some("\t\n")] {
            let scope = resolve("acme", "widgets", environment);
            assert_eq!(
                scope,
                SecretScope::Repository {
                    owner: "acme".to_string(),
                    repo: "widgets".to_string(),
                },
                "environment {environment:?} should resolve to repository scope"
            );
        }
    }

    #[test]
    fn test_named_environment_selects_environment_scope() {
        for environment in ["production", "staging eu", " qa "] {
            let scope = resolve("acme", "widgets", Some(environment));
            assert_eq!(scope.environment(), Some(environment));
            assert_eq!(scope.kind(), "environment");
        }
    }

    #[test]
    fn test_repository_paths() {
        let scope = resolve("acme", "widgets", None);

        assert_eq!(scope.secrets_path(), "/repos/acme/widgets/actions/secrets");
        assert_eq!(
            scope.secret_path("API_KEY"),
            "/repos/acme/widgets/actions/secrets/API_KEY"
        );
        assert_eq!(
            scope.public_key_path(),
            "/repos/acme/widgets/actions/secrets/public-key"
        );
    }

    #[test]
    fn test_environment_paths_are_encoded() {
        let scope = resolve("acme", "widgets", Some("staging eu"));

        assert_eq!(
            scope.secrets_path(),
            "/repos/acme/widgets/environments/staging%20eu/secrets"
        );
        assert_eq!(
            scope.secret_path("API_KEY"),
            "/repos/acme/widgets/environments/staging%20eu/secrets/API_KEY"
        );
        assert_eq!(
            scope.public_key_path(),
            "/repos/acme/widgets/environments/staging%20eu/secrets/public-key"
        );
    }

    #[test]
    fn test_scope_accessors_and_display() {
        let repo_scope = resolve("acme", "widgets", None);
        assert_eq!(repo_scope.owner(), "acme");
        assert_eq!(repo_scope.repo(), "widgets");
        assert_eq!(repo_scope.environment(), None);
        assert_eq!(repo_scope.to_string(), "acme/widgets");

        let env_scope = resolve("acme", "widgets", Some("prod"));
        assert_eq!(env_scope.to_string(), "acme/widgets (environment 'prod')");
    }
}
