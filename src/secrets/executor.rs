//! Secret operation executor.
//!
//! Runs one request through `Start → CredentialsResolved → ScopeResolved →
//! UpstreamCalled → Succeeded | Failed`, recording each step as a
//! [`RequestEvent`], then probes the rate limit and reduces the events into a
//! [`ResponseEnvelope`]. Steps are strictly sequential.

use super::classify::{classify, Classification};
use super::envelope::{RequestEvent, ResponseEnvelope};
use super::rate_limit::RateLimitProbe;
use super::scope::{self, SecretScope};
use super::types::{
    OperationResult, ScopePublicKey, SecretListing, SecretRequest, SecretVerb,
};
use crate::crypto::{seal_for_public_key, CredentialDecryptor, CryptoService, PlainOperation};
use crate::error::{GitHubError, OperationError};
use crate::github::GitHubClient;
use crate::security::{SecureString, SecurityAuditor};
use axum::http::StatusCode;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// GitHub's maximum page size for secret listings
const PER_PAGE: usize = 100;

pub struct SecretOperationExecutor {
    github: Arc<dyn GitHubClient>,
    decryptor: CredentialDecryptor,
    probe: RateLimitProbe,
    auditor: Arc<SecurityAuditor>,
}

impl SecretOperationExecutor {
    pub fn new(
        github: Arc<dyn GitHubClient>,
        crypto: Arc<dyn CryptoService>,
        auditor: Arc<SecurityAuditor>,
    ) -> Self {
        Self {
            probe: RateLimitProbe::new(github.clone()),
            decryptor: CredentialDecryptor::new(crypto),
            github,
            auditor,
        }
    }

    /// Run one secret operation. Never fails: every outcome, including
    /// decryption and upstream failures, is reported through the envelope.
    pub async fn execute(&self, request: SecretRequest) -> ResponseEnvelope {
        let started = Instant::now();
        let verb = request.operation.verb();
        let mut events = Vec::with_capacity(5);

        let scope = match self.decryptor.resolve(&request.encrypted_pat, &request.operation) {
            Ok(credentials) => {
                events.push(RequestEvent::CredentialsResolved);

                let scope = scope::resolve(
                    &request.owner,
                    &request.repo,
                    request.environment.as_deref(),
                );
                events.push(RequestEvent::ScopeResolved(scope.clone()));

                let token = credentials.pat.as_str();
                events.push(self.dispatch(token, &scope, &credentials.operation).await);

                let rate_limit = self.probe.probe(token).await;
                events.push(RequestEvent::RateLimitProbed(rate_limit));
                Some(scope)
            }
            Err(err) => {
                warn!(
                    "Rejected {} request for {}/{}: {}",
                    verb, request.owner, request.repo, err
                );
                events.push(RequestEvent::Failed(classify(&err)));
                None
            }
        };

        let envelope = ResponseEnvelope::reduce(verb, &events, started.elapsed(), Utc::now());

        info!(
            verb = verb.as_str(),
            owner = %request.owner,
            repo = %request.repo,
            scope = scope.as_ref().map(SecretScope::kind).unwrap_or("none"),
            status = envelope.status_code,
            error_type = envelope.error_type.as_str(),
            duration_ms = envelope.duration * 1000.0,
            "Secret operation finished"
        );
        self.auditor.audit_operation(&request, &events, &envelope);

        envelope
    }

    async fn dispatch(
        &self,
        token: &str,
        scope: &SecretScope,
        operation: &PlainOperation,
    ) -> RequestEvent {
        let outcome = match operation {
            PlainOperation::List => self.list(token, scope).await,
            PlainOperation::Get { name } => self.get(token, scope, name).await,
            PlainOperation::Write { verb, name, value } => {
                self.create_or_update(token, scope, *verb, name, value).await
            }
            PlainOperation::Delete { name } => self.delete(token, scope, name).await,
        };

        outcome.unwrap_or_else(|err| {
            let classification = classify(&err);
            warn!("Operation on {} failed: {}", scope, classification.message);
            RequestEvent::Failed(classification)
        })
    }

    async fn list(&self, token: &str, scope: &SecretScope) -> Result<RequestEvent, OperationError> {
        let mut secrets = Vec::new();
        let mut page = 1;

        loop {
            let path = format!("{}?per_page={PER_PAGE}&page={page}", scope.secrets_path());
            let response = self.github.request(token, Method::GET, &path, None).await?;
            let listing: SecretListing =
                serde_json::from_value(response.body).map_err(GitHubError::from)?;

            let fetched = listing.secrets.len();
            secrets.extend(listing.secrets);

            if fetched < PER_PAGE || secrets.len() >= listing.total_count {
                break;
            }
            page += 1;
        }

        Ok(RequestEvent::Succeeded {
            status: StatusCode::OK,
            message: format!("Found {} secret(s) in {}", secrets.len(), scope),
            result: OperationResult::List { secrets },
        })
    }

    async fn get(
        &self,
        token: &str,
        scope: &SecretScope,
        name: &str,
    ) -> Result<RequestEvent, OperationError> {
        let response = match self
            .github
            .request(token, Method::GET, &scope.secret_path(name), None)
            .await
        {
            Ok(response) => response,
            Err(err) if err.status() == Some(404) => {
                return Ok(RequestEvent::Failed(Classification::not_found(format!(
                    "Secret '{name}' not found"
                ))));
            }
            Err(err) => return Err(err.into()),
        };

        let secret = serde_json::from_value(response.body).map_err(GitHubError::from)?;

        Ok(RequestEvent::Succeeded {
            status: StatusCode::OK,
            message: format!("Secret '{name}' retrieved"),
            result: OperationResult::Get {
                secret: Some(secret),
            },
        })
    }

    /// Fetch the scope key, seal the value, then write. The write is the only
    /// mutating call and happens last.
    async fn create_or_update(
        &self,
        token: &str,
        scope: &SecretScope,
        verb: SecretVerb,
        name: &str,
        value: &SecureString,
    ) -> Result<RequestEvent, OperationError> {
        let response = self
            .github
            .request(token, Method::GET, &scope.public_key_path(), None)
            .await?;
        let public_key: ScopePublicKey =
            serde_json::from_value(response.body).map_err(GitHubError::from)?;

        let encrypted_value =
            seal_for_public_key(value.as_bytes(), &public_key.key).map_err(OperationError::Seal)?;

        let body = json!({
            "encrypted_value": encrypted_value,
            "key_id": public_key.key_id,
        });
        let response = self
            .github
            .request(token, Method::PUT, &scope.secret_path(name), Some(&body))
            .await?;

        let (status, message) = if response.status == StatusCode::CREATED.as_u16() {
            (StatusCode::CREATED, format!("Secret '{name}' created"))
        } else {
            (StatusCode::OK, format!("Secret '{name}' updated"))
        };

        let result = match verb {
            SecretVerb::Update => OperationResult::Update { updated: true },
            _ => OperationResult::Create { created: true },
        };

        Ok(RequestEvent::Succeeded {
            status,
            message,
            result,
        })
    }

    async fn delete(
        &self,
        token: &str,
        scope: &SecretScope,
        name: &str,
    ) -> Result<RequestEvent, OperationError> {
        match self
            .github
            .request(token, Method::DELETE, &scope.secret_path(name), None)
            .await
        {
            Ok(_) => Ok(RequestEvent::Succeeded {
                status: StatusCode::OK,
                message: format!("Secret '{name}' deleted"),
                result: OperationResult::Delete { deleted: true },
            }),
            Err(err) if err.status() == Some(404) => Ok(RequestEvent::Failed(
                Classification::not_found(format!("Secret '{name}' not found")),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
