//! Personal access token endpoints, scoped to the calling user.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::require_identifier;
use crate::client::ApiClient;
use crate::error::ProviderError;

/// A token as listed by the API. The secret value is never included.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalAccessToken {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub rotated_at: Option<String>,
    #[serde(default)]
    pub last_used_at: Option<String>,
}

/// A freshly created token, including its secret value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalAccessTokenWithToken {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub token: String,
}

/// Body of `POST /api/v1/user/me/personal-access-tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonalAccessToken {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub auto_generated: bool,
}

const TOKENS_PATH: &str = "/api/v1/user/me/personal-access-tokens";

impl ApiClient {
    /// Create a token for the calling user.
    pub async fn create_personal_access_token(
        &self,
        request: &CreatePersonalAccessToken,
    ) -> Result<PersonalAccessTokenWithToken, ProviderError> {
        info!(description = %request.description, "Creating personal access token");
        let token: PersonalAccessTokenWithToken = self.post(TOKENS_PATH, request).await?;
        require_identifier("token", TOKENS_PATH, &token.uuid)?;
        Ok(token)
    }

    /// List the calling user's tokens.
    pub async fn list_personal_access_tokens(
        &self,
    ) -> Result<Vec<PersonalAccessToken>, ProviderError> {
        debug!("Listing personal access tokens");
        self.get(TOKENS_PATH).await
    }

    /// Delete a token.
    pub async fn delete_personal_access_token(&self, token_uuid: &str) -> Result<(), ProviderError> {
        info!(token_uuid, "Deleting personal access token");
        self.delete(&format!("{}/{}", TOKENS_PATH, token_uuid)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_body() {
        let body = serde_json::to_value(CreatePersonalAccessToken {
            description: "ci".to_string(),
            expires_at: None,
            auto_generated: false,
        })
        .unwrap();
        assert_eq!(body, json!({"description": "ci", "autoGenerated": false}));
    }

    #[test]
    fn test_list_entry_tolerates_nulls() {
        let token: PersonalAccessToken = serde_json::from_value(json!({
            "uuid": "tok-1",
            "description": "ci",
            "createdAt": "2024-01-01T00:00:00Z",
            "expiresAt": null,
            "rotatedAt": null,
            "lastUsedAt": "2024-02-01T00:00:00Z"
        }))
        .unwrap();
        assert!(token.expires_at.is_none());
        assert_eq!(token.last_used_at.as_deref(), Some("2024-02-01T00:00:00Z"));
    }
}
