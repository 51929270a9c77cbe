use super::service::CryptoService;
use crate::error::{CredentialKind, OperationError};
use crate::secrets::types::{SecretOperation, SecretVerb};
use crate::security::SecureString;
use std::sync::Arc;

/// Operation with its credentials opened, ready to run against GitHub
#[derive(Debug)]
pub enum PlainOperation {
    List,
    Get {
        name: String,
    },
    Write {
        verb: SecretVerb,
        name: String,
        value: SecureString,
    },
    Delete {
        name: String,
    },
}

/// Decrypted credentials of one request
#[derive(Debug)]
pub struct Credentials {
    pub pat: SecureString,
    pub operation: PlainOperation,
}

/// Fail-closed wrapper around the [`CryptoService`].
///
/// Opens the PAT and, for create/update, the secret value, each exactly once.
/// Either every credential of the request decrypts or the request fails with
/// `DecryptionFailed` before any GitHub call is made.
#[derive(Clone)]
pub struct CredentialDecryptor {
    crypto: Arc<dyn CryptoService>,
}

impl CredentialDecryptor {
    pub fn new(crypto: Arc<dyn CryptoService>) -> Self {
        Self { crypto }
    }

    pub fn decrypt(
        &self,
        ciphertext: &str,
        credential: CredentialKind,
    ) -> Result<SecureString, OperationError> {
        self.crypto
            .decrypt(ciphertext)
            .map_err(|source| OperationError::DecryptionFailed { credential, source })
    }

    pub fn resolve(
        &self,
        encrypted_pat: &str,
        operation: &SecretOperation,
    ) -> Result<Credentials, OperationError> {
        let pat = self.decrypt(encrypted_pat, CredentialKind::PersonalAccessToken)?;

        let operation = match operation {
            SecretOperation::List => PlainOperation::List,
            SecretOperation::Get { name } => PlainOperation::Get { name: name.clone() },
            SecretOperation::Create {
                name,
                encrypted_value,
            }
            | SecretOperation::Update {
                name,
                encrypted_value,
            } => PlainOperation::Write {
                verb: operation.verb(),
                name: name.clone(),
                value: self.decrypt(encrypted_value, CredentialKind::SecretValue)?,
            },
            SecretOperation::Delete { name } => PlainOperation::Delete { name: name.clone() },
        };

        Ok(Credentials { pat, operation })
    }
}
