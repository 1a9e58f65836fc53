//! `lightdash_personal_access_token`: a token owned by the calling user.
//!
//! Tokens are immutable. The secret value is only returned by create, and the
//! list endpoint used for reads never includes it, so it is carried forward
//! from prior state.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{ignore_not_found, manual_configuration_warning, not_found, Resource};
use crate::api::personal_access_tokens::{CreatePersonalAccessToken, PersonalAccessToken};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Composite ID of a token.
pub const TOKEN_ID: IdPattern = IdPattern::new("personal-access-tokens/{token_uuid}");

/// State of a `lightdash_personal_access_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalAccessTokenState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub token_uuid: Option<String>,
    pub description: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl PersonalAccessTokenState {
    fn remote_uuid(&self) -> Result<String, ProviderError> {
        if let Some(uuid) = self.token_uuid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(uuid.to_string());
        }
        let [token] = TOKEN_ID.parse(self.id.as_deref().unwrap_or_default())?;
        Ok(token)
    }

    fn apply_listed(&mut self, listed: &PersonalAccessToken) {
        self.id = Some(TOKEN_ID.format(&[&listed.uuid]));
        self.token_uuid = Some(listed.uuid.clone());
        self.description = listed.description.clone();
        self.created_at = Some(listed.created_at.clone());
        self.expires_at = reconcile_expiry(self.expires_at.take(), listed.expires_at.clone());
    }
}

/// The server writes timestamps in its own form (`...59.000Z`). Keep the
/// configured expiry when both name the same instant.
fn reconcile_expiry(configured: Option<String>, remote: Option<String>) -> Option<String> {
    match (configured, remote) {
        (Some(configured), Some(remote)) if same_instant(&configured, &remote) => Some(configured),
        (_, remote) => remote,
    }
}

fn same_instant(a: &str, b: &str) -> bool {
    match (OffsetDateTime::parse(a, &Rfc3339), OffsetDateTime::parse(b, &Rfc3339)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Reconciler for `lightdash_personal_access_token`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersonalAccessTokenResource;

async fn find_token(
    client: &ApiClient,
    token_uuid: &str,
) -> Result<Option<PersonalAccessToken>, ProviderError> {
    let tokens = client.list_personal_access_tokens().await?;
    Ok(tokens.into_iter().find(|t| t.uuid == token_uuid))
}

#[async_trait::async_trait]
impl Resource for PersonalAccessTokenResource {
    type State = PersonalAccessTokenState;

    const TYPE_NAME: &'static str = "lightdash_personal_access_token";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Manages a Lightdash personal access token.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!("Computed as `{}`.", TOKEN_ID.expected())),
            )
            .with_attribute(
                "token_uuid",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute(
                "description",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "expires_at",
                Attribute::optional_string()
                    .with_requires_replace()
                    .with_description("Expiry in ISO 8601, e.g. '2024-12-31T23:59:59Z'. Unset means never."),
            )
            .with_attribute(
                "created_at",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute(
                "token",
                Attribute::computed_string()
                    .sensitive()
                    .with_use_state_for_unknown()
                    .with_description("The token value. Only available after creation."),
            )
    }

    async fn create(
        &self,
        client: &ApiClient,
        planned: PersonalAccessTokenState,
    ) -> Result<PersonalAccessTokenState, ProviderError> {
        let request = CreatePersonalAccessToken {
            description: planned.description.clone(),
            expires_at: planned.expires_at.clone(),
            auto_generated: false,
        };
        let created = client.create_personal_access_token(&request).await?;
        info!(token_uuid = %created.uuid, "Created personal access token");

        Ok(PersonalAccessTokenState {
            id: Some(TOKEN_ID.format(&[&created.uuid])),
            token_uuid: Some(created.uuid),
            description: created.description,
            expires_at: reconcile_expiry(planned.expires_at, created.expires_at),
            created_at: Some(created.created_at),
            token: Some(created.token),
        })
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: PersonalAccessTokenState,
    ) -> Result<Option<PersonalAccessTokenState>, ProviderError> {
        let token_uuid = current.remote_uuid()?;
        let Some(listed) = find_token(client, &token_uuid).await? else {
            debug!(token_uuid = %token_uuid, "Personal access token no longer listed");
            return Ok(None);
        };

        let mut state = current;
        state.apply_listed(&listed);
        Ok(Some(state))
    }

    async fn delete(
        &self,
        client: &ApiClient,
        current: PersonalAccessTokenState,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let token_uuid = current.remote_uuid()?;
        ignore_not_found(client.delete_personal_access_token(&token_uuid).await)?;
        Ok(Vec::new())
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(PersonalAccessTokenState, Vec<Diagnostic>), ProviderError> {
        let [token_uuid] = TOKEN_ID.parse(id)?;
        let listed = find_token(client, &token_uuid)
            .await?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;

        let mut state = PersonalAccessTokenState {
            id: None,
            token_uuid: None,
            description: String::new(),
            expires_at: None,
            created_at: None,
            token: None,
        };
        state.apply_listed(&listed);

        warn!(id, "Imported personal access token without its value");
        Ok((state, vec![manual_configuration_warning(Self::TYPE_NAME, &["token"])]))
    }
}
