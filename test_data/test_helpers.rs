#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::SecretKey;
use github_secrets_gateway::config::GitHubConfig;
use github_secrets_gateway::crypto::{seal_for_public_key, SealedBoxCrypto};
use github_secrets_gateway::github::RestGitHubClient;
use github_secrets_gateway::security::SecurityAuditor;
use github_secrets_gateway::server::{create_app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PAT: &str = "ghp_integration_token";

/// Gateway router wired to a real reqwest client pointed at `api_url`
pub struct TestGateway {
    pub router: Router,
    pub public_key: String,
}

impl TestGateway {
    pub fn new(api_url: &str) -> Self {
        let config = GitHubConfig {
            api_url: api_url.to_string(),
            timeout_secs: 5,
            ..GitHubConfig::default()
        };
        let github = RestGitHubClient::new(&config).unwrap();
        let crypto = SealedBoxCrypto::generate();
        let public_key = crypto.public_key_base64();
        let state = AppState::from_parts(Arc::new(github), crypto, SecurityAuditor::new(true));

        Self {
            router: create_app(state),
            public_key,
        }
    }

    pub fn seal(&self, plaintext: &str) -> String {
        seal_for_public_key(plaintext.as_bytes(), &self.public_key).unwrap()
    }

    /// Request body for `verb` against acme/widgets
    pub fn body(&self, secret_name: Option<&str>, value: Option<&str>) -> Value {
        let mut body = json!({
            "encrypted_pat": self.seal(TEST_PAT),
            "owner": "acme",
            "repo": "widgets",
        });
        if let Some(name) = secret_name {
            body["secret_name"] = json!(name);
        }
        if let Some(value) = value {
            body["encrypted_value"] = json!(self.seal(value));
        }
        body
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

/// Key pair standing in for a repository's GitHub Actions public key
pub fn scope_keypair() -> (SecretKey, Value) {
    let secret_key = SecretKey::generate(&mut crypto_box::aead::OsRng);
    let body = json!({
        "key_id": "3380204578043523366",
        "key": BASE64.encode(secret_key.public_key().as_bytes()),
    });
    (secret_key, body)
}

pub fn rate_limit_body() -> Value {
    json!({
        "resources": {
            "core": {"limit": 5000, "remaining": 4321, "reset": 1700000000, "used": 679}
        },
        "rate": {"limit": 5000, "remaining": 4321, "reset": 1700000000, "used": 679}
    })
}

pub fn secret_body(name: &str) -> Value {
    json!({
        "name": name,
        "created_at": "2024-01-10T10:00:00Z",
        "updated_at": "2024-01-21T14:12:00Z"
    })
}
