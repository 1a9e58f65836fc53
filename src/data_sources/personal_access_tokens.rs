//! `lightdash_personal_access_tokens`: the calling user's tokens.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DataSource;
use crate::api::personal_access_tokens::PersonalAccessToken;
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, NestedBlock, Schema};

/// Fixed ID of the token listing.
pub const TOKENS_DATA_SOURCE_ID: &str = "personal-access-tokens";

/// The data source takes no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct PersonalAccessTokensConfig {}

/// One listed token. The secret value is never available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub token_uuid: String,
    pub description: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub rotated_at: Option<String>,
    pub last_used_at: Option<String>,
}

impl From<PersonalAccessToken> for TokenSummary {
    fn from(token: PersonalAccessToken) -> Self {
        Self {
            token_uuid: token.uuid,
            description: token.description,
            created_at: token.created_at,
            expires_at: token.expires_at,
            rotated_at: token.rotated_at,
            last_used_at: token.last_used_at,
        }
    }
}

/// Result of `lightdash_personal_access_tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalAccessTokensState {
    pub id: String,
    pub tokens: Vec<TokenSummary>,
}

/// Lists the personal access tokens of the configured user.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersonalAccessTokensDataSource;

#[async_trait::async_trait]
impl DataSource for PersonalAccessTokensDataSource {
    type Config = PersonalAccessTokensConfig;
    type State = PersonalAccessTokensState;

    const TYPE_NAME: &'static str = "lightdash_personal_access_tokens";

    fn schema(&self) -> Schema {
        let token = Block::new()
            .with_attribute("token_uuid", Attribute::computed_string())
            .with_attribute("description", Attribute::computed_string())
            .with_attribute("created_at", Attribute::computed_string())
            .with_attribute("expires_at", Attribute::computed_string())
            .with_attribute("rotated_at", Attribute::computed_string())
            .with_attribute("last_used_at", Attribute::computed_string());
        Schema::v0()
            .with_description("Lists the personal access tokens of the authenticated user.")
            .with_attribute("id", Attribute::computed_string())
            .with_block("tokens", NestedBlock::list(token).computed())
    }

    async fn read(
        &self,
        client: &ApiClient,
        _config: PersonalAccessTokensConfig,
    ) -> Result<PersonalAccessTokensState, ProviderError> {
        let mut tokens: Vec<TokenSummary> = client
            .list_personal_access_tokens()
            .await?
            .into_iter()
            .map(TokenSummary::from)
            .collect();
        tokens.sort_by(|a, b| a.token_uuid.cmp(&b.token_uuid));
        debug!(count = tokens.len(), "Read personal access tokens");
        Ok(PersonalAccessTokensState {
            id: TOKENS_DATA_SOURCE_ID.to_string(),
            tokens,
        })
    }
}
