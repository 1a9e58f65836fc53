//! [`LightdashProvider`]: registry and dispatch for every Lightdash resource
//! and data source.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::client::ApiClient;
use crate::config::ProviderConfig;
use crate::data_sources::{
    DynDataSource, OrganizationDataSource, PersonalAccessTokensDataSource, ProjectDataSource,
};
use crate::error::ProviderError;
use crate::plan::plan;
use crate::resources::{
    AiAgentResource, DynResource, GroupResource, PersonalAccessTokenResource,
    ProjectGroupAccessResource, ProjectResource, ProjectSchedulerSettingsResource, SpaceResource,
};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use crate::validation::validate;

/// The Lightdash provider.
///
/// Holds one reconciler per resource type and one reader per data source.
/// The API client is set once by [`ProviderService::configure`] and shared by
/// every call afterwards.
pub struct LightdashProvider {
    resources: BTreeMap<&'static str, Box<dyn DynResource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DynDataSource>>,
    client: OnceLock<ApiClient>,
}

impl std::fmt::Debug for LightdashProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightdashProvider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("configured", &self.client.get().is_some())
            .finish()
    }
}

impl Default for LightdashProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LightdashProvider {
    /// Create an unconfigured provider with every resource and data source registered.
    pub fn new() -> Self {
        let resources: Vec<Box<dyn DynResource>> = vec![
            Box::new(AiAgentResource),
            Box::new(GroupResource),
            Box::new(PersonalAccessTokenResource),
            Box::new(ProjectResource),
            Box::new(ProjectGroupAccessResource),
            Box::new(ProjectSchedulerSettingsResource),
            Box::new(SpaceResource),
        ];
        let data_sources: Vec<Box<dyn DynDataSource>> = vec![
            Box::new(OrganizationDataSource),
            Box::new(PersonalAccessTokensDataSource),
            Box::new(ProjectDataSource),
        ];
        Self {
            resources: resources.into_iter().map(|r| (r.type_name(), r)).collect(),
            data_sources: data_sources.into_iter().map(|d| (d.type_name(), d)).collect(),
            client: OnceLock::new(),
        }
    }

    /// Create a provider that is already configured with `client`.
    pub fn with_client(client: ApiClient) -> Self {
        let provider = Self::new();
        let _ = provider.client.set(client);
        provider
    }

    /// The configured API client.
    pub fn client(&self) -> Result<&ApiClient, ProviderError> {
        self.client.get().ok_or_else(|| {
            ProviderError::Configuration(
                "the provider has not been configured; call configure first".to_string(),
            )
        })
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn DynResource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|r| &**r)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DynDataSource, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|r| &**r)
            .ok_or_else(|| ProviderError::UnknownResource(format!("data source {}", data_source_type)))
    }
}

#[async_trait::async_trait]
impl ProviderService for LightdashProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self
            .resources
            .iter()
            .fold(schema, |s, (name, r)| s.with_resource(*name, r.schema()));
        self.data_sources
            .iter()
            .fold(schema, |s, (name, d)| s.with_data_source(*name, d.schema()))
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validate(&ProviderConfig::schema(), &config);
        if diagnostics.is_empty() {
            if let Err(errors) = ProviderConfig::from_value(config)?.resolve() {
                diagnostics.extend(errors);
            }
        }
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resolved = match ProviderConfig::from_value(config)?.resolve() {
            Ok(resolved) => resolved,
            Err(diagnostics) => return Ok(diagnostics),
        };
        let client = ApiClient::new(&resolved)?;
        if self.client.set(client).is_err() {
            warn!("Provider configured twice; keeping the first configuration");
            return Ok(vec![Diagnostic::warning("Provider already configured").with_detail(
                "The provider was configured more than once. The first configuration stays in effect.",
            )]);
        }
        info!(host = %resolved.host, "Provider configured");
        Ok(vec![])
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.resource(resource_type)?.schema(), &config))
    }

    #[instrument(skip(self, prior_state, proposed_state, config), name = "provider.plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        if !proposed_state.is_null() {
            let diagnostics = validate(&schema, &config);
            if let Some(first) = diagnostics.iter().find(|d| d.is_error()) {
                return Err(ProviderError::Validation(match &first.detail {
                    Some(detail) => format!("{}: {}", first.summary, detail),
                    None => first.summary.clone(),
                }));
            }
        }
        let result = plan(&schema, prior_state.as_ref(), &proposed_state);
        debug!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan computed"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state), name = "provider.create")]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.create(self.client()?, planned_state).await
    }

    #[instrument(skip(self, current_state), name = "provider.read")]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Option<Value>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let state = resource.read(self.client()?, current_state).await?;
        if state.is_none() {
            info!("Resource no longer exists remotely; removing from state");
        }
        Ok(state)
    }

    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.update(self.client()?, prior_state, planned_state).await
    }

    #[instrument(skip(self, current_state), name = "provider.delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let warnings = resource.delete(self.client()?, current_state).await?;
        for warning in &warnings {
            warn!(summary = %warning.summary, "Delete completed with a warning");
        }
        Ok(warnings)
    }

    #[instrument(skip(self), name = "provider.import")]
    async fn import_resource(&self, resource_type: &str, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let imported = resource.import(self.client()?, id).await?;
        for diagnostic in &imported.diagnostics {
            warn!(summary = %diagnostic.summary, "Imported state is incomplete");
        }
        Ok(vec![imported])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.data_source(data_source_type)?.schema(), &config))
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        data_source.read(self.client()?, config).await
    }
}
