//! Resource reconcilers.
//!
//! Every managed entity implements [`Resource`]: a typed state record plus
//! the Create/Read/Update/Delete/Import lifecycle against the Lightdash API.
//! The provider stores them behind [`DynResource`], which converts state to
//! and from JSON and intercepts in-place updates that would change a
//! replace-on-change attribute before any request is sent.

pub mod ai_agent;
pub mod group;
pub mod personal_access_token;
pub mod project;
pub mod project_group_access;
pub mod project_scheduler_settings;
pub mod space;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::plan::replacement_paths;
use crate::schema::{Diagnostic, Schema};
use crate::types::ImportedResource;

pub use ai_agent::AiAgentResource;
pub use group::GroupResource;
pub use personal_access_token::PersonalAccessTokenResource;
pub use project::ProjectResource;
pub use project_group_access::ProjectGroupAccessResource;
pub use project_scheduler_settings::ProjectSchedulerSettingsResource;
pub use space::SpaceResource;

/// Lifecycle of one Lightdash entity type.
#[async_trait::async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Typed state record stored by the orchestrator.
    type State: Serialize + DeserializeOwned + Send + Sync;

    /// Resource type name, e.g. `lightdash_project`.
    const TYPE_NAME: &'static str;

    /// Attribute schema of the resource.
    fn schema(&self) -> Schema;

    /// Create the remote entity and return the observed state.
    async fn create(
        &self,
        client: &ApiClient,
        planned: Self::State,
    ) -> Result<Self::State, ProviderError>;

    /// Refresh state from the remote entity; `None` when it no longer exists.
    async fn read(
        &self,
        client: &ApiClient,
        current: Self::State,
    ) -> Result<Option<Self::State>, ProviderError>;

    /// Update the remote entity in place.
    ///
    /// Resources that cannot be patched keep this default, which always asks
    /// for replacement.
    async fn update(
        &self,
        client: &ApiClient,
        prior: Self::State,
        planned: Self::State,
    ) -> Result<Self::State, ProviderError> {
        let _ = (client, prior, planned);
        let attributes = Resource::schema(self)
            .replace_attributes()
            .into_iter()
            .map(str::to_string)
            .collect();
        Err(ProviderError::replacement_required(Self::TYPE_NAME, attributes))
    }

    /// Delete the remote entity. Returned diagnostics are warnings.
    async fn delete(
        &self,
        client: &ApiClient,
        current: Self::State,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Reconstruct state from a composite ID.
    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(Self::State, Vec<Diagnostic>), ProviderError>;
}

/// Type-erased, JSON-in/JSON-out view of a [`Resource`].
#[async_trait::async_trait]
pub trait DynResource: Send + Sync {
    /// Resource type name.
    fn type_name(&self) -> &'static str;

    /// Attribute schema.
    fn schema(&self) -> Schema;

    /// See [`Resource::create`].
    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError>;

    /// See [`Resource::read`].
    async fn read(&self, client: &ApiClient, current: Value) -> Result<Option<Value>, ProviderError>;

    /// See [`Resource::update`]. Fails with [`ProviderError::ReplacementRequired`]
    /// without calling the reconciler when a replace-on-change attribute differs.
    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// See [`Resource::delete`].
    async fn delete(&self, client: &ApiClient, current: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// See [`Resource::import`].
    async fn import(&self, client: &ApiClient, id: &str) -> Result<ImportedResource, ProviderError>;
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    Ok(serde_json::from_value(value)?)
}

fn encode<T: Serialize>(state: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(state)?)
}

#[async_trait::async_trait]
impl<R: Resource> DynResource for R {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Resource::schema(self)
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let state = Resource::create(self, client, decode(planned)?).await?;
        encode(&state)
    }

    async fn read(&self, client: &ApiClient, current: Value) -> Result<Option<Value>, ProviderError> {
        match Resource::read(self, client, decode(current)?).await? {
            Some(state) => Ok(Some(encode(&state)?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let forcing = replacement_paths(&Resource::schema(self), &prior, &planned);
        if !forcing.is_empty() {
            debug!(resource_type = R::TYPE_NAME, attributes = ?forcing, "Update requires replacement");
            return Err(ProviderError::replacement_required(R::TYPE_NAME, forcing));
        }
        let state = Resource::update(self, client, decode(prior)?, decode(planned)?).await?;
        encode(&state)
    }

    async fn delete(&self, client: &ApiClient, current: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Resource::delete(self, client, decode(current)?).await
    }

    async fn import(&self, client: &ApiClient, id: &str) -> Result<ImportedResource, ProviderError> {
        let (state, diagnostics) = Resource::import(self, client, id).await?;
        Ok(ImportedResource::new(R::TYPE_NAME, encode(&state)?).with_diagnostics(diagnostics))
    }
}

/// Treat a remote 404 as absence.
pub(crate) fn absent_on_not_found<T>(result: Result<T, ProviderError>) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Treat a remote 404 on delete as success.
pub(crate) fn ignore_not_found(result: Result<(), ProviderError>) -> Result<(), ProviderError> {
    match result {
        Err(err) if err.is_not_found() => {
            debug!(error = %err, "Entity already absent");
            Ok(())
        }
        other => other,
    }
}

/// Warning attached to imports whose state lacks values the API never returns.
pub(crate) fn manual_configuration_warning(resource_type: &str, attributes: &[&str]) -> Diagnostic {
    Diagnostic::warning("Manual configuration required").with_detail(format!(
        "The Lightdash API does not return {} for {}. Set {} in configuration to match the \
         remote value, otherwise the next plan will show a difference.",
        attributes.join(", "),
        resource_type,
        if attributes.len() == 1 { "it" } else { "them" },
    ))
}

/// Treat an empty import result as not found.
pub(crate) fn not_found(resource_type: &str, id: &str) -> ProviderError {
    ProviderError::NotFound(format!("{} '{}'", resource_type, id))
}
