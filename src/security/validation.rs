use crate::error::SecurityError;
use regex::Regex;

/// Validator for the identifiers a caller sends to the gateway.
///
/// Runs before any credential is decrypted, so malformed owner, repository,
/// secret or environment names never reach the GitHub client.
pub struct InputValidator {
    max_repository_length: usize,
    max_secret_name_length: usize,
    max_environment_length: usize,
    max_host_length: usize,
    owner_pattern: Regex,
    repository_pattern: Regex,
    secret_name_pattern: Regex,
    hostname_pattern: Regex,
    base64_pattern: Regex,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self {
            max_repository_length: 100,
            max_secret_name_length: 255,
            max_environment_length: 255,
            max_host_length: 253, // RFC 1035 limit
            owner_pattern: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,38}$").unwrap(),
            repository_pattern: Regex::new(r"^[A-Za-z0-9._-]+$").unwrap(),
            secret_name_pattern: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap(),
            hostname_pattern: Regex::new(
                r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
            )
            .unwrap(),
            base64_pattern: Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").unwrap(),
        }
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a GitHub user or organization login
    pub fn validate_owner(&self, owner: &str) -> Result<(), SecurityError> {
        if owner.is_empty() {
            return Err(SecurityError::InputValidationFailed {
                message: "owner cannot be empty".to_string(),
            });
        }

        if !self.owner_pattern.is_match(owner) {
            return Err(SecurityError::InputValidationFailed {
                message: format!("invalid owner name: {}", Self::sanitize_log_input(owner)),
            });
        }

        Ok(())
    }

    /// Validate a repository name (without the owner part)
    pub fn validate_repository(&self, repository: &str) -> Result<(), SecurityError> {
        if repository.is_empty() {
            return Err(SecurityError::InputValidationFailed {
                message: "repository cannot be empty".to_string(),
            });
        }

        if repository.len() > self.max_repository_length {
            return Err(SecurityError::InputValidationFailed {
                message: format!("repository name too long: {} characters", repository.len()),
            });
        }

        if repository == "." || repository == ".." {
            return Err(SecurityError::InputValidationFailed {
                message: "repository name cannot be a relative path".to_string(),
            });
        }

        if !self.repository_pattern.is_match(repository) {
            return Err(SecurityError::InputValidationFailed {
                message: format!(
                    "invalid characters in repository name: {}",
                    Self::sanitize_log_input(repository)
                ),
            });
        }

        Ok(())
    }

    /// Validate an Actions secret name using GitHub's naming rules
    pub fn validate_secret_name(&self, name: &str) -> Result<(), SecurityError> {
        if name.is_empty() {
            return Err(SecurityError::InputValidationFailed {
                message: "secret name cannot be empty".to_string(),
            });
        }

        if name.len() > self.max_secret_name_length {
            return Err(SecurityError::InputValidationFailed {
                message: format!("secret name too long: {} characters", name.len()),
            });
        }

        if !self.secret_name_pattern.is_match(name) {
            return Err(SecurityError::InputValidationFailed {
                message: "secret name may only contain letters, digits and underscores and cannot start with a digit".to_string(),
            });
        }

        if name.to_ascii_uppercase().starts_with("GITHUB_") {
            return Err(SecurityError::InputValidationFailed {
                message: "secret names cannot start with the GITHUB_ prefix".to_string(),
            });
        }

        Ok(())
    }

    /// Validate a deployment environment name.
    ///
    /// Blank names are accepted here; they select the repository scope.
    pub fn validate_environment(&self, environment: &str) -> Result<(), SecurityError> {
        if environment.trim().is_empty() {
            return Ok(());
        }

        if environment.len() > self.max_environment_length {
            return Err(SecurityError::InputValidationFailed {
                message: format!("environment name too long: {} characters", environment.len()),
            });
        }

        if environment.chars().any(|c| c.is_control()) {
            return Err(SecurityError::InputValidationFailed {
                message: "environment name contains control characters".to_string(),
            });
        }

        Ok(())
    }

    /// Loose base64 check used by the CLI before sealing against a key
    pub fn looks_like_base64(&self, value: &str) -> bool {
        self.base64_pattern.is_match(value)
    }

    /// Validate host/domain name
    pub fn validate_host(&self, host: &str) -> Result<(), SecurityError> {
        if host.len() > self.max_host_length {
            return Err(SecurityError::InputValidationFailed {
                message: format!("host name too long: {} characters", host.len()),
            });
        }

        if host.is_empty() {
            return Err(SecurityError::InputValidationFailed {
                message: "host cannot be empty".to_string(),
            });
        }

        if !self.hostname_pattern.is_match(host) {
            return Err(SecurityError::InputValidationFailed {
                message: "invalid host name format".to_string(),
            });
        }

        Ok(())
    }

    /// Strip control characters and clamp length before echoing input into logs
    pub fn sanitize_log_input(input: &str) -> String {
        input
            .chars()
            .filter(|c| c.is_ascii() && !c.is_control() || *c == ' ')
            .take(256)
            .collect()
    }
}
