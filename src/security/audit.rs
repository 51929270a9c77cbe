use crate::secrets::classify::ErrorKind;
use crate::secrets::envelope::{RequestEvent, ResponseEnvelope};
use crate::secrets::scope::SecretScope;
use crate::secrets::types::{SecretRequest, SecretVerb};
use crate::security::validation::InputValidator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Audit record of one secret operation.
///
/// Never carries credentials or secret values, sealed or opened.
#[derive(Debug, Clone, Serialize)]
pub struct SecretAuditEntry {
    pub timestamp: DateTime<Utc>,
    pub verb: SecretVerb,
    pub owner: String,
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SecretScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    pub credentials_resolved: bool,
    pub success: bool,
    pub status_code: u16,
    pub error_type: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_remaining: Option<u64>,
}

impl SecretAuditEntry {
    pub fn from_operation(
        request: &SecretRequest,
        events: &[RequestEvent],
        envelope: &ResponseEnvelope,
    ) -> Self {
        let scope = events.iter().find_map(|event| match event {
            RequestEvent::ScopeResolved(scope) => Some(scope.clone()),
            _ => None,
        });
        let credentials_resolved = events
            .iter()
            .any(|event| matches!(event, RequestEvent::CredentialsResolved));

        Self {
            timestamp: Utc::now(),
            verb: request.operation.verb(),
            owner: InputValidator::sanitize_log_input(&request.owner),
            repo: InputValidator::sanitize_log_input(&request.repo),
            scope,
            secret_name: request
                .operation
                .secret_name()
                .map(InputValidator::sanitize_log_input),
            credentials_resolved,
            success: envelope.success,
            status_code: envelope.status_code,
            error_type: envelope.error_type,
            rate_limit_remaining: envelope.rate_limit.as_ref().and_then(|r| r.remaining),
        }
    }
}

/// Security auditor for secret operations
pub struct SecurityAuditor {
    /// Also emit the full entry as JSON
    detailed_logging: bool,
}

impl SecurityAuditor {
    pub fn new(detailed_logging: bool) -> Self {
        Self { detailed_logging }
    }

    /// Record the outcome of one secret operation
    pub fn audit_operation(
        &self,
        request: &SecretRequest,
        events: &[RequestEvent],
        envelope: &ResponseEnvelope,
    ) -> SecretAuditEntry {
        let entry = SecretAuditEntry::from_operation(request, events, envelope);
        self.log_entry(&entry);
        entry
    }

    fn log_entry(&self, entry: &SecretAuditEntry) {
        let target = match &entry.secret_name {
            Some(name) => format!("{}/{} secret '{}'", entry.owner, entry.repo, name),
            None => format!("{}/{}", entry.owner, entry.repo),
        };

        match entry.error_type {
            ErrorKind::None => info!("Secret {} succeeded for {}", entry.verb, target),
            ErrorKind::DecryptionFailed | ErrorKind::InvalidPat | ErrorKind::Forbidden => warn!(
                "Secret {} denied for {}: {}",
                entry.verb, target, entry.error_type
            ),
            kind => info!("Secret {} failed for {}: {}", entry.verb, target, kind),
        }

        if self.detailed_logging {
            info!(
                "Security audit: {}",
                serde_json::to_string(entry).unwrap_or_default()
            );
        }
    }
}
