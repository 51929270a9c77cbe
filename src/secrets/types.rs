use serde::{Deserialize, Serialize};

/// One secret operation as received from the gateway, credentials still sealed
#[derive(Debug, Clone)]
pub struct SecretRequest {
    pub encrypted_pat: String,
    pub owner: String,
    pub repo: String,
    pub environment: Option<String>,
    pub operation: SecretOperation,
}

/// Verb-specific part of a request
#[derive(Debug, Clone)]
pub enum SecretOperation {
    List,
    Get { name: String },
    Create { name: String, encrypted_value: String },
    Update { name: String, encrypted_value: String },
    Delete { name: String },
}

impl SecretOperation {
    pub fn verb(&self) -> SecretVerb {
        match self {
            SecretOperation::List => SecretVerb::List,
            SecretOperation::Get { .. } => SecretVerb::Get,
            SecretOperation::Create { .. } => SecretVerb::Create,
            SecretOperation::Update { .. } => SecretVerb::Update,
            SecretOperation::Delete { .. } => SecretVerb::Delete,
        }
    }

    pub fn secret_name(&self) -> Option<&str> {
        match self {
            SecretOperation::List => None,
            SecretOperation::Get { name }
            | SecretOperation::Create { name, .. }
            | SecretOperation::Update { name, .. }
            | SecretOperation::Delete { name } => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretVerb {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl SecretVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretVerb::List => "list",
            SecretVerb::Get => "get",
            SecretVerb::Create => "create",
            SecretVerb::Update => "update",
            SecretVerb::Delete => "delete",
        }
    }

    /// Payload reported when the operation does not succeed
    pub fn failure_result(&self) -> OperationResult {
        match self {
            SecretVerb::List => OperationResult::List { secrets: Vec::new() },
            SecretVerb::Get => OperationResult::Get { secret: None },
            SecretVerb::Create => OperationResult::Create { created: false },
            SecretVerb::Update => OperationResult::Update { updated: false },
            SecretVerb::Delete => OperationResult::Delete { deleted: false },
        }
    }
}

impl std::fmt::Display for SecretVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret metadata as exposed to callers.
///
/// Carries no value field. Any `value` key in an upstream payload is dropped
/// during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMetadata {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Verb-specific payload, flattened into the response envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    List { secrets: Vec<SecretMetadata> },
    Get { secret: Option<SecretMetadata> },
    Create { created: bool },
    Update { updated: bool },
    Delete { deleted: bool },
}

/// Page of `GET .../secrets`
#[derive(Debug, Deserialize)]
pub(crate) struct SecretListing {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub secrets: Vec<SecretMetadata>,
}

/// Response of `GET .../secrets/public-key`
#[derive(Debug, Deserialize)]
pub(crate) struct ScopePublicKey {
    pub key_id: String,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_drops_upstream_value_field() {
        let raw = json!({
            "name": "API_KEY",
            "created_at": "2024-01-10T10:00:00Z",
            "updated_at": "2024-02-01T08:30:00Z",
            "value": "should-never-surface"
        });

        let metadata: SecretMetadata = serde_json::from_value(raw).unwrap();
        let rendered = serde_json::to_value(&metadata).unwrap();

        assert_eq!(metadata.name, "API_KEY");
        assert!(rendered.get("value").is_none());
        assert!(!rendered.to_string().contains("should-never-surface"));
    }

    #[test]
    fn test_failure_results_per_verb() {
        assert_eq!(
            SecretVerb::Get.failure_result(),
            OperationResult::Get { secret: None }
        );
        assert_eq!(
            SecretVerb::Delete.failure_result(),
            OperationResult::Delete { deleted: false }
        );
        assert_eq!(
            SecretVerb::List.failure_result(),
            OperationResult::List { secrets: vec![] }
        );
    }

    #[test]
    fn test_get_result_serializes_null_secret() {
        let rendered = serde_json::to_value(OperationResult::Get { secret: None }).unwrap();
        assert_eq!(rendered, json!({ "secret": null }));
    }

    #[test]
    fn test_operation_exposes_verb_and_name() {
        let op = SecretOperation::Create {
            name: "API_KEY".to_string(),
            encrypted_value: "sealed".to_string(),
        };

        assert_eq!(op.verb(), SecretVerb::Create);
        assert_eq!(op.secret_name(), Some("API_KEY"));
        assert_eq!(SecretOperation::List.secret_name(), None);
    }

    #[test]
    fn test_listing_tolerates_missing_fields() {
        let listing: SecretListing = serde_json::from_value(json!({})).unwrap();
        assert_eq!(listing.total_count, 0);
        assert!(listing.secrets.is_empty());
    }
}
