use crate::config::Config;
use crate::crypto::SealedBoxCrypto;
use crate::error::AppError;
use crate::github::{GitHubClient, RestGitHubClient};
use crate::secrets::SecretOperationExecutor;
use crate::security::{InputValidator, SecurityAuditor};
use crate::server::handlers::{
    create_secret, delete_secret, get_secret, health_check, list_secrets, public_key,
    update_secret,
};
use crate::server::middleware::{cors_layer, logging_middleware};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<SecretOperationExecutor>,
    pub validator: Arc<InputValidator>,
    /// Base64 X25519 public key of the gateway
    pub public_key: Arc<str>,
}

impl AppState {
    /// Build state from configuration: loads the gateway key and creates the
    /// GitHub REST client.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let crypto = config.crypto.load_private_key()?;
        let github = RestGitHubClient::new(&config.github)?;
        info!("GitHub API base URL: {}", github.base_url());

        let auditor = SecurityAuditor::new(config.server.detailed_audit_logging);
        Ok(Self::from_parts(Arc::new(github), crypto, auditor))
    }

    pub fn from_parts(
        github: Arc<dyn GitHubClient>,
        crypto: SealedBoxCrypto,
        auditor: SecurityAuditor,
    ) -> Self {
        let public_key: Arc<str> = crypto.public_key_base64().into();
        let executor = SecretOperationExecutor::new(github, Arc::new(crypto), Arc::new(auditor));

        Self {
            executor: Arc::new(executor),
            validator: Arc::new(InputValidator::new()),
            public_key,
        }
    }
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(middleware::from_fn(logging_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/crypto/public-key", get(public_key))
        .route("/secrets/list", post(list_secrets))
        .route("/secrets/get", post(get_secret))
        .route("/secrets/create", post(create_secret))
        .route("/secrets/update", post(update_secret))
        .route("/secrets/delete", post(delete_secret))
        .layer(middleware_stack)
        .with_state(state)
}
