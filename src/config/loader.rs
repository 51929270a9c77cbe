use crate::config::types::Config;
use crate::error::ConfigError;
use std::fs;
use tracing::{info, warn};

const MAX_PATH_LENGTH: usize = 1024;
const MAX_CONFIG_SIZE: usize = 1024 * 1024;

/// Path fragments a gateway config file never lives under
const FORBIDDEN_PATH_PATTERNS: [&str; 6] = ["/proc/", "/sys/", "/dev/", "\\\\", "javascript:", "data:"];

/// Content that only shows up in a config file by accident or injection
const FORBIDDEN_CONTENT_PATTERNS: [&str; 6] = ["javascript:", "<script", "eval(", "exec(", "${", "#{"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a TOML file.
    ///
    /// Every section is optional; missing keys take their defaults.
    pub fn from_file(path: &str) -> Result<Config, ConfigError> {
        Self::validate_config_path(path)?;

        let content = fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read config file {}: {}", path, e);
            ConfigError::FileReadError(e)
        })?;

        Self::validate_config_content(&content)?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            warn!("Failed to parse TOML in {}: {}", path, e);
            ConfigError::TomlParseError {
                message: e.to_string(),
            }
        })?;

        config.validate()?;

        info!(
            "Configuration loaded from {} (github api: {})",
            path, config.github.api_url
        );
        Ok(config)
    }

    fn validate_config_path(path: &str) -> Result<(), ConfigError> {
        let rejection = if path.contains("../") || path.contains("..\\") {
            Some("configuration path contains path traversal sequences".to_string())
        } else if path.chars().any(|c| c.is_control()) {
            Some("configuration path contains invalid characters".to_string())
        } else if path.len() > MAX_PATH_LENGTH {
            Some(format!("configuration path too long: {} characters", path.len()))
        } else {
            let lowered = path.to_lowercase();
            FORBIDDEN_PATH_PATTERNS
                .iter()
                .find(|pattern| lowered.contains(*pattern))
                .map(|pattern| format!("configuration path contains suspicious pattern: {pattern}"))
        };

        match rejection {
            Some(message) => {
                warn!("Rejected configuration path: {}", message);
                Err(ConfigError::ValidationError { message })
            }
            None => Ok(()),
        }
    }

    fn validate_config_content(content: &str) -> Result<(), ConfigError> {
        if content.len() > MAX_CONFIG_SIZE {
            return Err(ConfigError::ValidationError {
                message: format!("configuration file too large: {} bytes", content.len()),
            });
        }

        if content.contains('\0') {
            return Err(ConfigError::ValidationError {
                message: "configuration file appears to contain binary data".to_string(),
            });
        }

        let lowered = content.to_lowercase();
        if let Some(pattern) = FORBIDDEN_CONTENT_PATTERNS
            .iter()
            .find(|pattern| lowered.contains(*pattern))
        {
            warn!("Configuration content contains forbidden pattern: {}", pattern);
            return Err(ConfigError::ValidationError {
                message: format!("configuration content contains forbidden pattern: {pattern}"),
            });
        }

        if !Self::is_likely_toml(content) {
            return Err(ConfigError::ValidationError {
                message: "configuration content doesn't appear to be valid TOML".to_string(),
            });
        }

        Ok(())
    }

    /// Cheap pre-parse check: blank, or containing a table, key or comment
    fn is_likely_toml(content: &str) -> bool {
        let content = content.trim();
        content.is_empty() || ["[", "=", "#"].iter().any(|marker| content.contains(marker))
    }
}
