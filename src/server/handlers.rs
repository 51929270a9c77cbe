use crate::error::{AppError, SecurityError};
use crate::secrets::envelope::ResponseEnvelope;
use crate::secrets::types::{SecretOperation, SecretRequest, SecretVerb};
use crate::server::app::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct PublicKeyResponse {
    public_key: String,
    algorithm: &'static str,
}

/// Body shared by every `/secrets/*` route. Which optional fields are required
/// depends on the verb.
#[derive(Deserialize)]
pub struct SecretRequestBody {
    pub encrypted_pat: String,
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub secret_name: Option<String>,
    #[serde(default)]
    pub encrypted_value: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "github-secrets-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Public key callers seal their PAT and secret values against
pub async fn public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.public_key.to_string(),
        algorithm: "x25519-xsalsa20poly1305-sealedbox",
    })
}

pub async fn list_secrets(
    State(state): State<AppState>,
    Json(body): Json<SecretRequestBody>,
) -> Result<ResponseEnvelope, AppError> {
    run(&state, SecretVerb::List, body).await
}

pub async fn get_secret(
    State(state): State<AppState>,
    Json(body): Json<SecretRequestBody>,
) -> Result<ResponseEnvelope, AppError> {
    run(&state, SecretVerb::Get, body).await
}

pub async fn create_secret(
    State(state): State<AppState>,
    Json(body): Json<SecretRequestBody>,
) -> Result<ResponseEnvelope, AppError> {
    run(&state, SecretVerb::Create, body).await
}

pub async fn update_secret(
    State(state): State<AppState>,
    Json(body): Json<SecretRequestBody>,
) -> Result<ResponseEnvelope, AppError> {
    run(&state, SecretVerb::Update, body).await
}

pub async fn delete_secret(
    State(state): State<AppState>,
    Json(body): Json<SecretRequestBody>,
) -> Result<ResponseEnvelope, AppError> {
    run(&state, SecretVerb::Delete, body).await
}

async fn run(
    state: &AppState,
    verb: SecretVerb,
    body: SecretRequestBody,
) -> Result<ResponseEnvelope, AppError> {
    let request = build_request(state, verb, body)?;
    debug!("Dispatching {} for {}/{}", verb, request.owner, request.repo);
    Ok(state.executor.execute(request).await)
}

/// Validate the body and turn it into a [`SecretRequest`] for `verb`
fn build_request(
    state: &AppState,
    verb: SecretVerb,
    body: SecretRequestBody,
) -> Result<SecretRequest, SecurityError> {
    let validator = &state.validator;

    validator.validate_owner(&body.owner)?;
    validator.validate_repository(&body.repo)?;
    if let Some(environment) = &body.environment {
        validator.validate_environment(environment)?;
    }

    let operation = match verb {
        SecretVerb::List => SecretOperation::List,
        SecretVerb::Get => SecretOperation::Get {
            name: secret_name(state, body.secret_name)?,
        },
        SecretVerb::Delete => SecretOperation::Delete {
            name: secret_name(state, body.secret_name)?,
        },
        SecretVerb::Create | SecretVerb::Update => {
            let name = secret_name(state, body.secret_name)?;
            let encrypted_value = body.encrypted_value.ok_or_else(|| missing("encrypted_value"))?;

            if verb == SecretVerb::Create {
                SecretOperation::Create {
                    name,
                    encrypted_value,
                }
            } else {
                SecretOperation::Update {
                    name,
                    encrypted_value,
                }
            }
        }
    };

    Ok(SecretRequest {
        encrypted_pat: body.encrypted_pat,
        owner: body.owner,
        repo: body.repo,
        environment: body.environment,
        operation,
    })
}

fn secret_name(state: &AppState, name: Option<String>) -> Result<String, SecurityError> {
    let name = name.ok_or_else(|| missing("secret_name"))?;
    state.validator.validate_secret_name(&name)?;
    Ok(name)
}

fn missing(field: &str) -> SecurityError {
    SecurityError::InputValidationFailed {
        message: format!("{field} is required"),
    }
}
