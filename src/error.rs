use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("github client error: {0}")]
    GitHub(#[from] GitHubError),
}

/// Input validation errors raised at the gateway boundary
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("input validation failed: {message}")]
    InputValidationFailed { message: String },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("invalid toml format: {message}")]
    TomlParseError { message: String },

    #[error("invalid port number: {port}")]
    InvalidPort { port: u16 },

    #[error("invalid host: {host}")]
    InvalidHost { host: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("private key not configured: {details}")]
    MissingPrivateKey { details: String },
}

/// Server-specific errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server startup failed: {0}")]
    StartupError(String),
}

/// Sealed-box encryption and decryption errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid base64 encoding")]
    InvalidBase64,

    #[error("sealed box of {0} characters is empty or too large")]
    InvalidCiphertextLength(usize),

    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("ciphertext could not be opened with the gateway key")]
    OpenFailed,

    #[error("decrypted value is not valid utf-8")]
    InvalidUtf8,

    #[error("sealed box encryption failed")]
    SealFailed,
}

/// Errors surfaced by the GitHub REST client.
///
/// `Upstream` renders its status code into the message so text-based
/// classification keeps working for callers that only see the string form.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("github api returned {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        rate_limit_exhausted: bool,
    },

    #[error("github request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected github response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GitHubError {
    /// Status code of a non-2xx upstream response, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Request URLs carry owner, repo and secret names and are kept out of the message.
impl From<reqwest::Error> for GitHubError {
    fn from(error: reqwest::Error) -> Self {
        GitHubError::Transport(error.without_url())
    }
}

/// Which credential of a request failed to decrypt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    PersonalAccessToken,
    SecretValue,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::PersonalAccessToken => f.write_str("personal access token"),
            CredentialKind::SecretValue => f.write_str("secret value"),
        }
    }
}

/// Failure of a single secret operation, before classification
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("failed to decrypt {credential}: {source}")]
    DecryptionFailed {
        credential: CredentialKind,
        #[source]
        source: CryptoError,
    },

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("failed to seal secret value with the scope public key: {0}")]
    Seal(#[source] CryptoError),
}

/// Convenience type for Results
pub type Result<T> = std::result::Result<T, AppError>;

// Axum error response implementations
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::{http::StatusCode, Json};
        use serde_json::json;
        use tracing::{error, warn};

        let (status, error_message) = match &self {
            AppError::Security(SecurityError::InputValidationFailed { .. }) => {
                warn!("Rejected request: {}", self);
                (StatusCode::BAD_REQUEST, "invalid input")
            }
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration error"),
            AppError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server error"),
            _ => {
                error!("Unhandled error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
