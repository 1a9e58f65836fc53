//! Space endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::require_identifier;
use crate::client::ApiClient;
use crate::error::ProviderError;

/// A space as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_uuid: String,
    #[serde(default)]
    pub organization_uuid: String,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub parent_space_uuid: Option<String>,
}

/// Body of `POST /api/v1/projects/{project}/spaces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpace {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_space_uuid: Option<String>,
}

/// Body of `PATCH /api/v1/projects/{project}/spaces/{space}`.
///
/// A cleared visibility is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpace {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<Option<bool>>,
}

fn spaces_path(project_uuid: &str) -> String {
    format!("/api/v1/projects/{}/spaces", project_uuid)
}

fn space_path(project_uuid: &str, space_uuid: &str) -> String {
    format!("{}/{}", spaces_path(project_uuid), space_uuid)
}

impl ApiClient {
    /// Create a space in a project.
    pub async fn create_space(
        &self,
        project_uuid: &str,
        request: &CreateSpace,
    ) -> Result<Space, ProviderError> {
        info!(project_uuid, name = %request.name, "Creating space");
        let path = spaces_path(project_uuid);
        let space: Space = self.post(&path, request).await?;
        require_identifier("space", &path, &space.uuid)?;
        Ok(space)
    }

    /// Fetch a space.
    pub async fn get_space(&self, project_uuid: &str, space_uuid: &str) -> Result<Space, ProviderError> {
        debug!(project_uuid, space_uuid, "Fetching space");
        let path = space_path(project_uuid, space_uuid);
        let space: Space = self.get(&path).await?;
        require_identifier("space", &path, &space.uuid)?;
        Ok(space)
    }

    /// Rename a space or change its visibility.
    pub async fn update_space(
        &self,
        project_uuid: &str,
        space_uuid: &str,
        request: &UpdateSpace,
    ) -> Result<Space, ProviderError> {
        info!(project_uuid, space_uuid, name = %request.name, "Updating space");
        let path = space_path(project_uuid, space_uuid);
        let space: Space = self.patch(&path, request).await?;
        require_identifier("space", &path, &space.uuid)?;
        Ok(space)
    }

    /// Delete a space.
    pub async fn delete_space(&self, project_uuid: &str, space_uuid: &str) -> Result<(), ProviderError> {
        info!(project_uuid, space_uuid, "Deleting space");
        self.delete(&space_path(project_uuid, space_uuid)).await
    }
}
