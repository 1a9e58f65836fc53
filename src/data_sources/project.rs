//! `lightdash_project`: look up one project by UUID.

use serde::{Deserialize, Serialize};

use super::DataSource;
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Arguments of `lightdash_project`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectLookup {
    pub project_uuid: String,
}

/// Result of `lightdash_project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub project_uuid: String,
    pub organization_uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub dbt_version: Option<String>,
    pub upstream_project_uuid: Option<String>,
    pub organization_warehouse_credentials_uuid: Option<String>,
    pub scheduler_timezone: Option<String>,
}

/// Reads a project. A missing project is an error, not an empty result.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectDataSource;

#[async_trait::async_trait]
impl DataSource for ProjectDataSource {
    type Config = ProjectLookup;
    type State = ProjectSummary;

    const TYPE_NAME: &'static str = "lightdash_project";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Reads a Lightdash project.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("project_uuid", Attribute::required_string())
            .with_attribute("organization_uuid", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("type", Attribute::computed_string())
            .with_attribute("dbt_version", Attribute::computed_string())
            .with_attribute("upstream_project_uuid", Attribute::computed_string())
            .with_attribute(
                "organization_warehouse_credentials_uuid",
                Attribute::computed_string(),
            )
            .with_attribute("scheduler_timezone", Attribute::computed_string())
    }

    async fn read(&self, client: &ApiClient, config: ProjectLookup) -> Result<ProjectSummary, ProviderError> {
        if config.project_uuid.trim().is_empty() {
            return Err(ProviderError::Validation(
                "project_uuid must not be empty".to_string(),
            ));
        }
        let project = match client.get_project(&config.project_uuid).await {
            Ok(project) => project,
            Err(err) if err.is_not_found() => {
                return Err(ProviderError::NotFound(format!(
                    "project '{}'",
                    config.project_uuid
                )))
            }
            Err(err) => return Err(err),
        };
        Ok(ProjectSummary {
            id: project.project_uuid.clone(),
            project_uuid: project.project_uuid,
            organization_uuid: project.organization_uuid,
            name: project.name,
            project_type: project.project_type.map(|t| t.as_str().to_string()),
            dbt_version: project.dbt_version,
            upstream_project_uuid: project.upstream_project_uuid,
            organization_warehouse_credentials_uuid: project.organization_warehouse_credentials_uuid,
            scheduler_timezone: project.scheduler_timezone,
        })
    }
}
