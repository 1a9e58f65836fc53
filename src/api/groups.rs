//! Group endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::require_identifier;
use crate::client::ApiClient;
use crate::error::ProviderError;

/// A group member reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub user_uuid: String,
}

/// A group as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization_uuid: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<GroupMember>>,
}

impl Group {
    /// Member UUIDs, sorted, when the response carried them.
    pub fn member_uuids(&self) -> Option<Vec<String>> {
        self.members.as_ref().map(|members| {
            let mut uuids: Vec<String> = members.iter().map(|m| m.user_uuid.clone()).collect();
            uuids.sort();
            uuids
        })
    }
}

/// Body of `POST /api/v1/org/groups` and `PATCH /api/v1/groups/{group}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<GroupMember>>,
}

impl GroupRequest {
    /// Build a request from a name and optional member UUIDs.
    pub fn new(name: impl Into<String>, member_uuids: Option<&[String]>) -> Self {
        Self {
            name: name.into(),
            members: member_uuids.map(|uuids| {
                uuids
                    .iter()
                    .map(|uuid| GroupMember {
                        user_uuid: uuid.clone(),
                    })
                    .collect()
            }),
        }
    }
}

const ORG_GROUPS_PATH: &str = "/api/v1/org/groups";

fn group_path(group_uuid: &str) -> String {
    format!("/api/v1/groups/{}", group_uuid)
}

impl ApiClient {
    /// Create a group in the caller's organization.
    pub async fn create_group(&self, request: &GroupRequest) -> Result<Group, ProviderError> {
        info!(name = %request.name, "Creating group");
        let group: Group = self.post(ORG_GROUPS_PATH, request).await?;
        require_identifier("group", ORG_GROUPS_PATH, &group.uuid)?;
        Ok(group)
    }

    /// Fetch a group, including its members.
    pub async fn get_group(&self, group_uuid: &str) -> Result<Group, ProviderError> {
        debug!(group_uuid, "Fetching group");
        let path = format!("{}?includeMembers=1000", group_path(group_uuid));
        let group: Group = self.get(&path).await?;
        require_identifier("group", &path, &group.uuid)?;
        Ok(group)
    }

    /// Rename a group and/or replace its members.
    pub async fn update_group(
        &self,
        group_uuid: &str,
        request: &GroupRequest,
    ) -> Result<Group, ProviderError> {
        info!(group_uuid, name = %request.name, "Updating group");
        let path = group_path(group_uuid);
        let group: Group = self.patch(&path, request).await?;
        require_identifier("group", &path, &group.uuid)?;
        Ok(group)
    }

    /// Delete a group.
    pub async fn delete_group(&self, group_uuid: &str) -> Result<(), ProviderError> {
        info!(group_uuid, "Deleting group");
        self.delete(&group_path(group_uuid)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_members() {
        let body = serde_json::to_value(GroupRequest::new("analysts", None)).unwrap();
        assert_eq!(body, json!({"name": "analysts"}));
    }

    #[test]
    fn test_request_with_members() {
        let members = vec!["u-1".to_string(), "u-2".to_string()];
        let body = serde_json::to_value(GroupRequest::new("analysts", Some(&members))).unwrap();
        assert_eq!(
            body,
            json!({"name": "analysts", "members": [{"userUuid": "u-1"}, {"userUuid": "u-2"}]})
        );
    }

    #[test]
    fn test_member_uuids_sorted() {
        let group: Group = serde_json::from_value(json!({
            "uuid": "g-1",
            "name": "analysts",
            "organizationUuid": "org-1",
            "members": [{"userUuid": "u-2", "email": "b@example.com"}, {"userUuid": "u-1"}]
        }))
        .unwrap();
        assert_eq!(
            group.member_uuids(),
            Some(vec!["u-1".to_string(), "u-2".to_string()])
        );
    }
}
