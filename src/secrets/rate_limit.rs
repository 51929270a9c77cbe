use crate::github::GitHubClient;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const RATE_LIMIT_PATH: &str = "/rate_limit";

/// Remaining core API quota for the caller's PAT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateLimit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
}

impl RateLimit {
    /// Read the core quota out of a `GET /rate_limit` body
    pub fn from_body(body: &Value) -> Option<Self> {
        let core = body
            .pointer("/resources/core")
            .or_else(|| body.get("rate"))?;

        let field = |name: &str| core.get(name).and_then(Value::as_u64);
        let rate_limit = Self {
            limit: field("limit"),
            remaining: field("remaining"),
            reset: field("reset"),
            used: field("used"),
        };

        if rate_limit == Self::default() {
            None
        } else {
            Some(rate_limit)
        }
    }
}

/// Best-effort read of the caller's rate limit.
///
/// Has no error channel: any failure is logged at debug level and reported
/// as `None`, so it can never change the outcome of the operation it
/// annotates.
#[derive(Clone)]
pub struct RateLimitProbe {
    github: Arc<dyn GitHubClient>,
}

impl RateLimitProbe {
    pub fn new(github: Arc<dyn GitHubClient>) -> Self {
        Self { github }
    }

    pub async fn probe(&self, token: &str) -> Option<RateLimit> {
        match self
            .github
            .request(token, Method::GET, RATE_LIMIT_PATH, None)
            .await
        {
            Ok(response) => RateLimit::from_body(&response.body),
            Err(e) => {
                debug!("Rate limit probe failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::{FakeGitHub, Reply};
    use serde_json::json;

    #[test]
    fn test_reads_core_resource() {
        let body = json!({
            "resources": {
                "core": {"limit": 5000, "remaining": 4990, "reset": 1700000000, "used": 10},
                "search": {"limit": 30, "remaining": 30, "reset": 1700000000, "used": 0}
            },
            "rate": {"limit": 1, "remaining": 1, "reset": 1, "used": 0}
        });

        let rate_limit = RateLimit::from_body(&body).unwrap();
        assert_eq!(rate_limit.limit, Some(5000));
        assert_eq!(rate_limit.remaining, Some(4990));
        assert_eq!(rate_limit.reset, Some(1700000000));
        assert_eq!(rate_limit.used, Some(10));
    }

    #[test]
    fn test_falls_back_to_rate_object() {
        let body = json!({"rate": {"limit": 60, "remaining": 59}});

        let rate_limit = RateLimit::from_body(&body).unwrap();
        assert_eq!(rate_limit.limit, Some(60));
        assert_eq!(rate_limit.used, None);

        let rendered = serde_json::to_value(&rate_limit).unwrap();
        assert!(rendered.get("used").is_none());
    }

    #[test]
    fn test_unrecognised_body_yields_none() {
        assert!(RateLimit::from_body(&json!({})).is_none());
        assert!(RateLimit::from_body(&json!({"rate": {}})).is_none());
        assert!(RateLimit::from_body(&Value::Null).is_none());
    }

    #[tokio::test]
    async fn test_probe_swallows_upstream_failure() {
        let github = Arc::new(FakeGitHub::new());
        github.on(
            Method::GET,
            RATE_LIMIT_PATH,
            Reply::Fail(500, "boom".to_string()),
        );

        let probe = RateLimitProbe::new(github.clone());
        assert!(probe.probe("ghp_test").await.is_none());
        assert_eq!(github.calls_to(Method::GET, RATE_LIMIT_PATH), 1);
    }

    #[tokio::test]
    async fn test_probe_returns_quota() {
        let github = Arc::new(FakeGitHub::new());
        github.on(
            Method::GET,
            RATE_LIMIT_PATH,
            Reply::Ok(200, json!({"rate": {"limit": 5000, "remaining": 4999, "reset": 1, "used": 1}})),
        );

        let probe = RateLimitProbe::new(github);
        let rate_limit = probe.probe("ghp_test").await.unwrap();
        assert_eq!(rate_limit.remaining, Some(4999));
    }
}
