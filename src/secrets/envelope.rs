//! Response envelope construction.
//!
//! The executor records what happened during a request as a sequence of
//! [`RequestEvent`]s; [`ResponseEnvelope::reduce`] folds them into the
//! response without any shared mutable context.

use super::classify::{Classification, ErrorKind};
use super::rate_limit::RateLimit;
use super::scope::SecretScope;
use super::types::{OperationResult, SecretVerb};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::time::Duration;

/// One step of a secret operation, in the order it happened
#[derive(Debug, Clone)]
pub enum RequestEvent {
    CredentialsResolved,
    ScopeResolved(SecretScope),
    Succeeded {
        status: StatusCode,
        message: String,
        result: OperationResult,
    },
    Failed(Classification),
    RateLimitProbed(Option<RateLimit>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub status_code: u16,
    /// Seconds spent handling the operation
    pub duration: f64,
    pub timestamp: String,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub error_type: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    #[serde(flatten)]
    pub result: OperationResult,
}

impl ResponseEnvelope {
    /// Fold the recorded events of one request into its envelope.
    ///
    /// The last terminal event (`Succeeded` or `Failed`) decides the outcome.
    /// A request that never reached one reports a 500.
    pub fn reduce(
        verb: SecretVerb,
        events: &[RequestEvent],
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut envelope = Self {
            success: false,
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            duration: duration.as_secs_f64(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            messages: Vec::new(),
            errors: vec![format!("{verb} operation did not complete")],
            error_type: ErrorKind::GithubApiError,
            rate_limit: None,
            result: verb.failure_result(),
        };

        for event in events {
            match event {
                RequestEvent::Succeeded {
                    status,
                    message,
                    result,
                } => {
                    envelope.success = true;
                    envelope.status_code = status.as_u16();
                    envelope.messages = vec![message.clone()];
                    envelope.errors.clear();
                    envelope.error_type = ErrorKind::None;
                    envelope.result = result.clone();
                }
                RequestEvent::Failed(classification) => {
                    envelope.success = false;
                    envelope.status_code = classification.status.as_u16();
                    envelope.messages.clear();
                    envelope.errors = vec![classification.message.clone()];
                    envelope.error_type = classification.kind;
                    envelope.result = verb.failure_result();
                }
                RequestEvent::RateLimitProbed(rate_limit) => {
                    envelope.rate_limit = rate_limit.clone();
                }
                RequestEvent::CredentialsResolved | RequestEvent::ScopeResolved(_) => {}
            }
        }

        envelope
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
