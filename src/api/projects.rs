//! Project endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::require_identifier;
use crate::client::ApiClient;
use crate::error::ProviderError;

/// Lightdash project type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectType {
    /// A regular project.
    Default,
    /// A preview project, usually copied from an upstream project.
    Preview,
}

impl ProjectType {
    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Preview => "PREVIEW",
        }
    }
}

/// dbt connection to a GitHub repository. Keys are snake_case on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbtGithubConnection {
    #[serde(rename = "type", default)]
    pub connection_type: String,
    #[serde(default)]
    pub authorization_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_access_token: Option<String>,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub project_sub_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// BigQuery warehouse credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BigQueryCredentials {
    #[serde(rename = "type")]
    pub warehouse_type: String,
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyfile_contents: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_bytes_billed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_of_week: Option<i64>,
}

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub organization_uuid: String,
    #[serde(default)]
    pub project_uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub dbt_version: Option<String>,
    #[serde(default)]
    pub dbt_connection: Option<DbtGithubConnection>,
    #[serde(default)]
    pub organization_warehouse_credentials_uuid: Option<String>,
    #[serde(default)]
    pub upstream_project_uuid: Option<String>,
    #[serde(default)]
    pub scheduler_timezone: Option<String>,
}

/// Body of `POST /api/v1/org/projects`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub dbt_connection: DbtGithubConnection,
    pub dbt_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_warehouse_credentials_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_connection: Option<BigQueryCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_project_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_warehouse_connection_from_upstream_project: Option<bool>,
}

/// Body of `PATCH /api/v1/projects/{project}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: String,
    pub dbt_connection: DbtGithubConnection,
    pub dbt_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_warehouse_credentials_uuid: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_connection: Option<BigQueryCredentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectResults {
    project: Project,
    #[serde(default)]
    content_copy_error: Option<String>,
}

const ORG_PROJECTS_PATH: &str = "/api/v1/org/projects";

fn project_path(project_uuid: &str) -> String {
    format!("/api/v1/projects/{}", project_uuid)
}

impl ApiClient {
    /// Create a project in the caller's organization.
    pub async fn create_project(&self, request: &CreateProject) -> Result<Project, ProviderError> {
        info!(name = %request.name, project_type = request.project_type.as_str(), "Creating project");
        let results: CreateProjectResults = self.post(ORG_PROJECTS_PATH, request).await?;
        if let Some(error) = &results.content_copy_error {
            debug!(error = %error, "Project content copy reported an error");
        }
        require_identifier("project", ORG_PROJECTS_PATH, &results.project.project_uuid)?;
        Ok(results.project)
    }

    /// Fetch a project by UUID.
    pub async fn get_project(&self, project_uuid: &str) -> Result<Project, ProviderError> {
        debug!(project_uuid, "Fetching project");
        let path = project_path(project_uuid);
        let project: Project = self.get(&path).await?;
        require_identifier("project", &path, &project.project_uuid)?;
        Ok(project)
    }

    /// Patch a project's core attributes.
    pub async fn update_project(
        &self,
        project_uuid: &str,
        request: &UpdateProject,
    ) -> Result<Project, ProviderError> {
        info!(project_uuid, name = %request.name, "Updating project");
        let path = project_path(project_uuid);
        let project: Project = self.patch(&path, request).await?;
        require_identifier("project", &path, &project.project_uuid)?;
        Ok(project)
    }
}
