use crate::config::GitHubConfig;
use crate::error::GitHubError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// GitHub API version header value.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API accept header for JSON responses.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Successful (2xx) GitHub response
#[derive(Debug, Clone)]
pub struct GitHubResponse {
    pub status: u16,
    /// Parsed JSON body, `Value::Null` when the response had no body
    pub body: Value,
    pub headers: HeaderMap,
}

/// Minimal REST surface the secret operations need.
///
/// Implementations turn every non-2xx status into
/// [`GitHubError::Upstream`] so callers only see successful responses in the
/// `Ok` arm.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    async fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<GitHubResponse, GitHubError>;
}

/// reqwest-backed GitHub REST client with connection pooling
#[derive(Debug, Clone)]
pub struct RestGitHubClient {
    http: Client,
    base_url: String,
}

impl RestGitHubClient {
    /// Create a client from the `[github]` configuration section
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let http = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GitHubClient for RestGitHubClient {
    async fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<GitHubResponse, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GitHub request: {} {}", method, path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        debug!("GitHub response: {} {} -> {}", method, path, status);

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });

            return Err(GitHubError::Upstream {
                status: status.as_u16(),
                message,
                rate_limit_exhausted: rate_limit_exhausted(&headers),
            });
        }

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(GitHubResponse {
            status: status.as_u16(),
            body,
            headers,
        })
    }
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> RestGitHubClient {
        let config = GitHubConfig {
            api_url: server.url(),
            ..GitHubConfig::default()
        };
        RestGitHubClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_successful_json_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/widgets/actions/secrets")
            .match_header("authorization", "Bearer ghp_test")
            .match_header("accept", GITHUB_ACCEPT)
            .match_header("x-github-api-version", GITHUB_API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"total_count": 0, "secrets": []}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client
            .request("ghp_test", Method::GET, "/repos/acme/widgets/actions/secrets", None)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["total_count"], 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_body_becomes_null() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/repos/acme/widgets/actions/secrets/API_KEY")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client
            .request(
                "ghp_test",
                Method::DELETE,
                "/repos/acme/widgets/actions/secrets/API_KEY",
                None,
            )
            .await
            .unwrap();

        assert_eq!(response.status, 204);
        assert!(response.body.is_null());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/acme/widgets/actions/secrets/API_KEY")
            .match_body(Matcher::Json(json!({"encrypted_value": "abc", "key_id": "1"})))
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server);
        let body = json!({"encrypted_value": "abc", "key_id": "1"});
        let response = client
            .request(
                "ghp_test",
                Method::PUT,
                "/repos/acme/widgets/actions/secrets/API_KEY",
                Some(&body),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_becomes_upstream_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/widgets/actions/secrets/MISSING")
            .with_status(404)
            .with_body(json!({"message": "Not Found"}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .request(
                "ghp_test",
                Method::GET,
                "/repos/acme/widgets/actions/secrets/MISSING",
                None,
            )
            .await
            .unwrap_err();

        match err {
            GitHubError::Upstream {
                status,
                message,
                rate_limit_exhausted,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
                assert!(!rate_limit_exhausted);
            }
            other => panic!("Expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_rate_limit_header_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rate_limit")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_body("forbidden")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .request("ghp_test", Method::GET, "/rate_limit", None)
            .await
            .unwrap_err();

        match err {
            GitHubError::Upstream {
                status,
                message,
                rate_limit_exhausted,
            } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden");
                assert!(rate_limit_exhausted);
            }
            other => panic!("Expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = GitHubConfig {
            api_url: "https://github.example.com/api/v3/".to_string(),
            ..GitHubConfig::default()
        };
        let client = RestGitHubClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://github.example.com/api/v3");
    }
}
