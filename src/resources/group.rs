//! `lightdash_group`: an organization group and, optionally, its members.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{absent_on_not_found, ignore_not_found, not_found, Resource};
use crate::api::groups::{Group, GroupRequest};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Composite ID of a group.
pub const GROUP_ID: IdPattern = IdPattern::new("organizations/{organization_uuid}/groups/{group_uuid}");

/// State of a `lightdash_group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    #[serde(default)]
    pub id: Option<String>,
    pub organization_uuid: String,
    #[serde(default)]
    pub group_uuid: Option<String>,
    pub name: String,
    /// User UUIDs. Unmanaged when unset.
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

impl GroupState {
    fn remote_uuid(&self) -> Result<String, ProviderError> {
        if let Some(uuid) = self.group_uuid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(uuid.to_string());
        }
        let [_, group] = GROUP_ID.parse(self.id.as_deref().unwrap_or_default())?;
        Ok(group)
    }

    fn request(&self) -> GroupRequest {
        GroupRequest::new(self.name.clone(), self.members.as_deref())
    }

    fn apply_remote(&mut self, group: &Group) {
        if !group.organization_uuid.is_empty() {
            self.organization_uuid = group.organization_uuid.clone();
        }
        self.name = group.name.clone();
        self.group_uuid = Some(group.uuid.clone());
        self.id = Some(GROUP_ID.format(&[&self.organization_uuid, &group.uuid]));

        // Membership is only tracked when configured; keep the configured order
        // when the remote set is the same.
        if let (Some(local), Some(remote)) = (&self.members, group.member_uuids()) {
            let local_set: BTreeSet<&String> = local.iter().collect();
            let remote_set: BTreeSet<&String> = remote.iter().collect();
            if local_set != remote_set {
                self.members = Some(remote);
            }
        }
    }
}

/// Reconciler for `lightdash_group`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupResource;

#[async_trait::async_trait]
impl Resource for GroupResource {
    type State = GroupState;

    const TYPE_NAME: &'static str = "lightdash_group";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Manages a Lightdash group.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!("Computed as `{}`.", GROUP_ID.expected())),
            )
            .with_attribute(
                "organization_uuid",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "group_uuid",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "members",
                Attribute::optional_string_list()
                    .with_description("UUIDs of the users in the group."),
            )
    }

    async fn create(&self, client: &ApiClient, planned: GroupState) -> Result<GroupState, ProviderError> {
        let created = client.create_group(&planned.request()).await?;
        let mut state = planned;
        state.apply_remote(&created);
        Ok(state)
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: GroupState,
    ) -> Result<Option<GroupState>, ProviderError> {
        let group_uuid = current.remote_uuid()?;
        let Some(group) = absent_on_not_found(client.get_group(&group_uuid).await)? else {
            debug!(group_uuid = %group_uuid, "Group no longer exists");
            return Ok(None);
        };
        let mut state = current;
        state.apply_remote(&group);
        Ok(Some(state))
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: GroupState,
        planned: GroupState,
    ) -> Result<GroupState, ProviderError> {
        let group_uuid = prior.remote_uuid()?;
        let updated = client.update_group(&group_uuid, &planned.request()).await?;
        let mut state = planned;
        state.apply_remote(&updated);
        Ok(state)
    }

    async fn delete(&self, client: &ApiClient, current: GroupState) -> Result<Vec<Diagnostic>, ProviderError> {
        let group_uuid = current.remote_uuid()?;
        ignore_not_found(client.delete_group(&group_uuid).await)?;
        Ok(Vec::new())
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(GroupState, Vec<Diagnostic>), ProviderError> {
        let [organization_uuid, group_uuid] = GROUP_ID.parse(id)?;
        let group = absent_on_not_found(client.get_group(&group_uuid).await)?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;

        let mut state = GroupState {
            id: None,
            organization_uuid,
            group_uuid: None,
            name: String::new(),
            members: None,
        };
        state.apply_remote(&group);
        Ok((state, Vec::new()))
    }
}
