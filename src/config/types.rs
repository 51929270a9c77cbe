use crate::crypto::SealedBoxCrypto;
use crate::error::ConfigError;
use crate::security::{InputValidator, SecureString};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub crypto: CryptoConfig,
}

impl Config {
    /// Load configuration from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        crate::config::ConfigLoader::from_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.github.validate()?;
        self.crypto.validate()
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Emit every audit entry as JSON in addition to the summary line
    pub detailed_audit_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            detailed_audit_logging: false,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        InputValidator::default()
            .validate_host(&self.host)
            .map_err(|_| ConfigError::InvalidHost {
                host: InputValidator::sanitize_log_input(&self.host),
            })?;

        if self.port == 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// GitHub REST API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL, overridable for GitHub Enterprise Server
    pub api_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            user_agent: "github-secrets-gateway".to_string(),
        }
    }
}

impl GitHubConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(ConfigError::ValidationError {
                message: format!("github api_url must be an http(s) URL: {}", self.api_url),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "github timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "github user_agent cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Where the gateway's X25519 secret key comes from
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Environment variable holding the base64 secret key
    pub private_key_env: String,
    /// File holding the base64 secret key, used when the variable is unset
    pub private_key_file: Option<String>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            private_key_env: "GATEWAY_PRIVATE_KEY".to_string(),
            private_key_file: None,
        }
    }
}

impl CryptoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.private_key_env.trim().is_empty() && self.private_key_file.is_none() {
            return Err(ConfigError::MissingPrivateKey {
                details: "neither private_key_env nor private_key_file is set".to_string(),
            });
        }
        Ok(())
    }

    /// Load the key from the environment variable, falling back to the file
    pub fn load_private_key(&self) -> Result<SealedBoxCrypto, ConfigError> {
        let encoded = match std::env::var(&self.private_key_env) {
            Ok(value) if !value.trim().is_empty() => SecureString::new(value),
            _ => match &self.private_key_file {
                Some(path) => SecureString::new(fs::read_to_string(path)?),
                None => {
                    return Err(ConfigError::MissingPrivateKey {
                        details: format!(
                            "environment variable {} is not set and no private_key_file is configured",
                            self.private_key_env
                        ),
                    })
                }
            },
        };

        SealedBoxCrypto::from_base64(encoded.as_str()).map_err(|e| ConfigError::MissingPrivateKey {
            details: format!("private key is unusable: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_KEY_ENV: &str = "GATEWAY_TEST_PRIVATE_KEY";

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.crypto.private_key_env, "GATEWAY_PRIVATE_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_validation() {
        let mut server = ServerConfig::default();
        assert!(server.validate().is_ok());

        server.port = 0;
        assert!(matches!(server.validate(), Err(ConfigError::InvalidPort { port: 0 })));

        server.port = 8080;
        server.host = "".to_string();
        assert!(matches!(server.validate(), Err(ConfigError::InvalidHost { .. })));
    }

    #[test]
    fn test_github_config_validation() {
        let mut github = GitHubConfig::default();
        assert!(github.validate().is_ok());

        github.api_url = "ftp://github.example.com".to_string();
        assert!(github.validate().is_err());

        github.api_url = "http://localhost:9000".to_string();
        github.timeout_secs = 0;
        assert!(github.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.github.user_agent, "github-secrets-gateway");
    }

    #[test]
    #[serial]
    fn test_private_key_from_env() {
        let crypto = SealedBoxCrypto::generate();
        std::env::set_var(TEST_KEY_ENV, crypto.secret_key_base64().as_str());

        let config = CryptoConfig {
            private_key_env: TEST_KEY_ENV.to_string(),
            private_key_file: None,
        };
        let loaded = config.load_private_key().unwrap();
        std::env::remove_var(TEST_KEY_ENV);

        assert_eq!(loaded.public_key_base64(), crypto.public_key_base64());
    }

    #[test]
    #[serial]
    fn test_private_key_falls_back_to_file() {
        std::env::remove_var(TEST_KEY_ENV);
        let crypto = SealedBoxCrypto::generate();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", crypto.secret_key_base64().as_str()).unwrap();

        let config = CryptoConfig {
            private_key_env: TEST_KEY_ENV.to_string(),
            private_key_file: Some(file.path().to_string_lossy().into_owned()),
        };
        let loaded = config.load_private_key().unwrap();

        assert_eq!(loaded.public_key_base64(), crypto.public_key_base64());
    }

    #[test]
    #[serial]
    fn test_blank_env_key_falls_back_to_file_without_echoing_key() {
        std::env::set_var(TEST_KEY_ENV, "   ");
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "c2hvcnQta2V5").unwrap();

        let config = CryptoConfig {
            private_key_env: TEST_KEY_ENV.to_string(),
            private_key_file: Some(file.path().to_string_lossy().into_owned()),
        };
        let err = config.load_private_key().unwrap_err();
        std::env::remove_var(TEST_KEY_ENV);

        assert!(matches!(err, ConfigError::MissingPrivateKey { .. }));
        assert!(!err.to_string().contains("c2hvcnQta2V5"));
    }

    #[test]
    #[serial]
    fn test_missing_private_key() {
        std::env::remove_var(TEST_KEY_ENV);
        let config = CryptoConfig {
            private_key_env: TEST_KEY_ENV.to_string(),
            private_key_file: None,
        };

        assert!(matches!(
            config.load_private_key(),
            Err(ConfigError::MissingPrivateKey { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_malformed_private_key() {
        std::env::set_var(TEST_KEY_ENV, "bm90LWEta2V5");
        let config = CryptoConfig {
            private_key_env: TEST_KEY_ENV.to_string(),
            private_key_file: None,
        };

        let result = config.load_private_key();
        std::env::remove_var(TEST_KEY_ENV);

        assert!(matches!(result, Err(ConfigError::MissingPrivateKey { .. })));
    }
}
