//! `lightdash_project_group_access`: a group's role on a project.
//!
//! The pair (project, group) identifies the assignment. There is no GET for a
//! single assignment, so reads list the project's group accesses.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ignore_not_found, not_found, Resource};
use crate::api::group_accesses::{ProjectGroupAccess, PROJECT_ROLES};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Composite ID of a group access.
pub const GROUP_ACCESS_ID: IdPattern =
    IdPattern::new("projects/{project_uuid}/group-accesses/{group_uuid}");

/// State of a `lightdash_project_group_access`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectGroupAccessState {
    #[serde(default)]
    pub id: Option<String>,
    pub project_uuid: String,
    pub group_uuid: String,
    pub role: String,
}

/// Reconciler for `lightdash_project_group_access`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectGroupAccessResource;

async fn find_access(
    client: &ApiClient,
    project_uuid: &str,
    group_uuid: &str,
) -> Result<Option<ProjectGroupAccess>, ProviderError> {
    let accesses = match client.list_project_group_accesses(project_uuid).await {
        Ok(accesses) => accesses,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };
    Ok(accesses.into_iter().find(|a| a.group_uuid == group_uuid))
}

#[async_trait::async_trait]
impl Resource for ProjectGroupAccessResource {
    type State = ProjectGroupAccessState;

    const TYPE_NAME: &'static str = "lightdash_project_group_access";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Grants a Lightdash group a role on a project.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!("Computed as `{}`.", GROUP_ACCESS_ID.expected())),
            )
            .with_attribute(
                "project_uuid",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "group_uuid",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "role",
                Attribute::required_string().with_allowed_values(PROJECT_ROLES.iter().copied()),
            )
    }

    async fn create(
        &self,
        client: &ApiClient,
        planned: ProjectGroupAccessState,
    ) -> Result<ProjectGroupAccessState, ProviderError> {
        client
            .create_project_group_access(&planned.group_uuid, &planned.project_uuid, &planned.role)
            .await?;
        let mut state = planned;
        state.id = Some(GROUP_ACCESS_ID.format(&[&state.project_uuid, &state.group_uuid]));
        Ok(state)
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: ProjectGroupAccessState,
    ) -> Result<Option<ProjectGroupAccessState>, ProviderError> {
        let Some(access) = find_access(client, &current.project_uuid, &current.group_uuid).await?
        else {
            debug!(
                project_uuid = %current.project_uuid,
                group_uuid = %current.group_uuid,
                "Group access no longer exists"
            );
            return Ok(None);
        };
        let mut state = current;
        state.role = access.role;
        state.id = Some(GROUP_ACCESS_ID.format(&[&state.project_uuid, &state.group_uuid]));
        Ok(Some(state))
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: ProjectGroupAccessState,
        planned: ProjectGroupAccessState,
    ) -> Result<ProjectGroupAccessState, ProviderError> {
        client
            .update_project_group_access(&prior.group_uuid, &prior.project_uuid, &planned.role)
            .await?;
        let mut state = planned;
        state.id = Some(GROUP_ACCESS_ID.format(&[&state.project_uuid, &state.group_uuid]));
        Ok(state)
    }

    async fn delete(
        &self,
        client: &ApiClient,
        current: ProjectGroupAccessState,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        ignore_not_found(
            client
                .delete_project_group_access(&current.group_uuid, &current.project_uuid)
                .await,
        )?;
        Ok(Vec::new())
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(ProjectGroupAccessState, Vec<Diagnostic>), ProviderError> {
        let [project_uuid, group_uuid] = GROUP_ACCESS_ID.parse(id)?;
        let access = find_access(client, &project_uuid, &group_uuid)
            .await?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;
        Ok((
            ProjectGroupAccessState {
                id: Some(GROUP_ACCESS_ID.format(&[&project_uuid, &group_uuid])),
                project_uuid,
                group_uuid,
                role: access.role,
            },
            Vec::new(),
        ))
    }
}
