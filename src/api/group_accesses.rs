//! Project role assignments for groups.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::ProviderError;

/// Roles a group can hold on a project.
pub const PROJECT_ROLES: &[&str] = &["viewer", "interactive_viewer", "editor", "developer", "admin"];

/// A group's role on a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroupAccess {
    #[serde(default)]
    pub project_uuid: String,
    #[serde(default)]
    pub group_uuid: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Serialize)]
struct RoleRequest<'a> {
    role: &'a str,
}

fn access_path(group_uuid: &str, project_uuid: &str) -> String {
    format!("/api/v1/groups/{}/projects/{}", group_uuid, project_uuid)
}

impl ApiClient {
    /// List every group role on a project.
    pub async fn list_project_group_accesses(
        &self,
        project_uuid: &str,
    ) -> Result<Vec<ProjectGroupAccess>, ProviderError> {
        debug!(project_uuid, "Listing project group accesses");
        self.get(&format!("/api/v1/projects/{}/groupAccesses", project_uuid))
            .await
    }

    /// Grant a group a role on a project.
    pub async fn create_project_group_access(
        &self,
        group_uuid: &str,
        project_uuid: &str,
        role: &str,
    ) -> Result<(), ProviderError> {
        info!(group_uuid, project_uuid, role, "Granting project access to group");
        self.post_no_content(&access_path(group_uuid, project_uuid), &RoleRequest { role })
            .await
    }

    /// Change a group's role on a project.
    pub async fn update_project_group_access(
        &self,
        group_uuid: &str,
        project_uuid: &str,
        role: &str,
    ) -> Result<(), ProviderError> {
        info!(group_uuid, project_uuid, role, "Updating project access for group");
        self.patch_no_content(&access_path(group_uuid, project_uuid), &RoleRequest { role })
            .await
    }

    /// Revoke a group's role on a project.
    pub async fn delete_project_group_access(
        &self,
        group_uuid: &str,
        project_uuid: &str,
    ) -> Result<(), ProviderError> {
        info!(group_uuid, project_uuid, "Revoking project access for group");
        self.delete(&access_path(group_uuid, project_uuid)).await
    }
}
