//! Failure classification.
//!
//! Maps every failure a secret operation can hit onto a fixed
//! `(status, ErrorKind, message)` triple. Upstream errors carrying a status
//! code are matched on that integer. Transport and decode failures never
//! reached a GitHub status and are always `github_api_error`. Anything else
//! falls back to [`classify_text`], which inspects the error's string form:
//!
//! | text contains                    | status | kind               |
//! |----------------------------------|--------|--------------------|
//! | `401`                            | 401    | `invalid_pat`      |
//! | `403` and a rate-limit mention   | 429    | `rate_limited`     |
//! | `403`                            | 403    | `forbidden`        |
//! | `404`                            | 404    | `not_found`        |
//! | anything else                    | 500    | `github_api_error` |

use crate::error::{GitHubError, OperationError};
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    None,
    DecryptionFailed,
    InvalidPat,
    RateLimited,
    Forbidden,
    NotFound,
    GithubApiError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::None => "none",
            ErrorKind::DecryptionFailed => "decryption_failed",
            ErrorKind::InvalidPat => "invalid_pat",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::GithubApiError => "github_api_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub message: String,
}

impl Classification {
    pub fn new(status: StatusCode, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    /// Expected absence, reported the same way as an upstream 404
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorKind::NotFound, message)
    }
}

/// Classify any failure of a secret operation
pub fn classify(error: &OperationError) -> Classification {
    match error {
        OperationError::DecryptionFailed { credential, .. } => Classification::new(
            StatusCode::UNAUTHORIZED,
            ErrorKind::DecryptionFailed,
            format!("Failed to decrypt {credential}"),
        ),
        OperationError::GitHub(GitHubError::Upstream {
            status,
            message,
            rate_limit_exhausted,
        }) => classify_status(*status, message, *rate_limit_exhausted),
        OperationError::GitHub(GitHubError::Transport(e)) => {
            github_api_error(&format!("request to GitHub failed: {e}"))
        }
        OperationError::GitHub(GitHubError::Decode(_)) => {
            github_api_error("GitHub returned a response body that could not be parsed")
        }
        other => classify_text(&other.to_string()),
    }
}

/// Classify an upstream response by its status code
pub fn classify_status(status: u16, message: &str, rate_limit_exhausted: bool) -> Classification {
    match status {
        401 => invalid_pat(message),
        403 if rate_limit_exhausted || mentions_rate_limit(message) => rate_limited(message),
        403 => forbidden(message),
        404 => not_found(message),
        429 => rate_limited(message),
        _ => github_api_error(&format!("{status} {message}")),
    }
}

/// Classify an error from its textual representation alone
pub fn classify_text(text: &str) -> Classification {
    if text.contains("401") {
        invalid_pat(text)
    } else if text.contains("403") {
        if mentions_rate_limit(text) {
            rate_limited(text)
        } else {
            forbidden(text)
        }
    } else if text.contains("404") {
        not_found(text)
    } else {
        github_api_error(text)
    }
}

fn mentions_rate_limit(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("rate limit") || lowered.contains("rate-limit") || lowered.contains("ratelimit")
}

fn invalid_pat(detail: &str) -> Classification {
    Classification::new(
        StatusCode::UNAUTHORIZED,
        ErrorKind::InvalidPat,
        format!("Invalid or expired GitHub personal access token: {detail}"),
    )
}

fn rate_limited(detail: &str) -> Classification {
    Classification::new(
        StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::RateLimited,
        format!("GitHub API rate limit exceeded: {detail}"),
    )
}

fn forbidden(detail: &str) -> Classification {
    Classification::new(
        StatusCode::FORBIDDEN,
        ErrorKind::Forbidden,
        format!("Access forbidden: {detail}"),
    )
}

fn not_found(detail: &str) -> Classification {
    Classification::not_found(format!("Resource not found: {detail}"))
}

fn github_api_error(detail: &str) -> Classification {
    Classification::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::GithubApiError,
        format!("GitHub API error: {detail}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CredentialKind, CryptoError};

    fn upstream(status: u16, message: &str, exhausted: bool) -> OperationError {
        OperationError::GitHub(GitHubError::Upstream {
            status,
            message: message.to_string(),
            rate_limit_exhausted: exhausted,
        })
    }

    #[test]
    fn test_decryption_failure_is_local_401() {
        let err = OperationError::DecryptionFailed {
            credential: CredentialKind::PersonalAccessToken,
            source: CryptoError::InvalidBase64,
        };

        let classification = classify(&err);
        assert_eq!(classification.status, StatusCode::UNAUTHORIZED);
        assert_eq!(classification.kind, ErrorKind::DecryptionFailed);
        assert!(classification.message.contains("personal access token"));
    }

    #[test]
    fn test_text_table() {
        let cases = [
            ("401 Bad credentials", StatusCode::UNAUTHORIZED, ErrorKind::InvalidPat),
            (
                "403 API rate limit exceeded for user",
                StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::RateLimited,
            ),
            (
                "403 Resource not accessible by personal access token",
                StatusCode::FORBIDDEN,
                ErrorKind::Forbidden,
            ),
            ("404 Not Found", StatusCode::NOT_FOUND, ErrorKind::NotFound),
            (
                "connection reset by peer",
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::GithubApiError,
            ),
        ];

        for (text, status, kind) in cases {
            let classification = classify_text(text);
            assert_eq!(classification.status, status, "status for {text}");
            assert_eq!(classification.kind, kind, "kind for {text}");
        }
    }

    #[test]
    fn test_rate_limit_mention_without_403_is_not_rate_limited() {
        let classification = classify_text("secondary rate limit warning");
        assert_eq!(classification.kind, ErrorKind::GithubApiError);
    }

    #[test]
    fn test_structured_status_codes() {
        assert_eq!(classify(&upstream(401, "Bad credentials", false)).kind, ErrorKind::InvalidPat);
        assert_eq!(classify(&upstream(403, "Must have admin rights", false)).kind, ErrorKind::Forbidden);
        assert_eq!(classify(&upstream(404, "Not Found", false)).kind, ErrorKind::NotFound);
        assert_eq!(classify(&upstream(429, "slow down", false)).kind, ErrorKind::RateLimited);
        assert_eq!(classify(&upstream(502, "Bad Gateway", false)).kind, ErrorKind::GithubApiError);
    }

    #[test]
    fn test_structured_403_rate_limit_detection() {
        let by_message = classify(&upstream(403, "API rate limit exceeded for 10.0.0.1", false));
        assert_eq!(by_message.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(by_message.kind, ErrorKind::RateLimited);

        let by_header = classify(&upstream(403, "Forbidden", true));
        assert_eq!(by_header.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_decode_errors_are_api_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = OperationError::GitHub(GitHubError::Decode(json_err));

        let classification = classify(&err);
        assert_eq!(classification.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classification.kind, ErrorKind::GithubApiError);
    }

    #[test]
    fn test_decode_error_position_is_not_read_as_status() {
        let padded = format!("{}x", " ".repeat(403));
        let json_err = serde_json::from_str::<serde_json::Value>(&padded).unwrap_err();
        assert!(json_err.to_string().contains("404"));

        let classification = classify(&OperationError::GitHub(GitHubError::Decode(json_err)));
        assert_eq!(classification.kind, ErrorKind::GithubApiError);
    }

    #[tokio::test]
    async fn test_transport_failure_ignores_digits_in_request_path() {
        let http = reqwest::Client::new();
        let transport = http
            .get("http://127.0.0.1:9/repos/acme/svc-404/actions/secrets/TOKEN_401")
            .send()
            .await
            .unwrap_err();
        let err = OperationError::GitHub(GitHubError::from(transport));

        assert!(!err.to_string().contains("svc-404"));
        let classification = classify(&err);
        assert_eq!(classification.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classification.kind, ErrorKind::GithubApiError);
        assert!(!classification.message.contains("404"));
    }

    #[test]
    fn test_seal_failure_is_api_error() {
        let err = OperationError::Seal(CryptoError::InvalidKeyLength(16));
        assert_eq!(classify(&err).kind, ErrorKind::GithubApiError);
    }

    #[test]
    fn test_error_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorKind::DecryptionFailed).unwrap(),
            serde_json::json!("decryption_failed")
        );
        assert_eq!(ErrorKind::None.to_string(), "none");
        assert_eq!(ErrorKind::GithubApiError.as_str(), "github_api_error");
    }
}
