//! `lightdash_space`: a space (folder) inside a project.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{absent_on_not_found, ignore_not_found, not_found, Resource};
use crate::api::clearable;
use crate::api::spaces::{CreateSpace, Space, UpdateSpace};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Composite ID of a space.
pub const SPACE_ID: IdPattern = IdPattern::new(
    "organizations/{organization_uuid}/projects/{project_uuid}/spaces/{space_uuid}",
);

/// State of a `lightdash_space`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceState {
    #[serde(default)]
    pub id: Option<String>,
    pub organization_uuid: String,
    pub project_uuid: String,
    #[serde(default)]
    pub space_uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub parent_space_uuid: Option<String>,
}

impl SpaceState {
    fn remote_uuid(&self) -> Result<String, ProviderError> {
        if let Some(uuid) = self.space_uuid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(uuid.to_string());
        }
        let [_, _, space] = SPACE_ID.parse(self.id.as_deref().unwrap_or_default())?;
        Ok(space)
    }

    fn apply_remote(&mut self, space: &Space) {
        self.name = space.name.clone();
        if self.is_private.is_some() && space.is_private.is_some() {
            self.is_private = space.is_private;
        }
        self.parent_space_uuid = space.parent_space_uuid.clone();
        self.space_uuid = Some(space.uuid.clone());
        self.id = Some(SPACE_ID.format(&[&self.organization_uuid, &self.project_uuid, &space.uuid]));
    }
}

/// Reconciler for `lightdash_space`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpaceResource;

#[async_trait::async_trait]
impl Resource for SpaceResource {
    type State = SpaceState;

    const TYPE_NAME: &'static str = "lightdash_space";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Manages a space in a Lightdash project.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!("Computed as `{}`.", SPACE_ID.expected())),
            )
            .with_attribute(
                "organization_uuid",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "project_uuid",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "space_uuid",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "is_private",
                Attribute::optional_bool()
                    .with_description("Whether only invited users can see the space."),
            )
            .with_attribute(
                "parent_space_uuid",
                Attribute::optional_string()
                    .with_requires_replace()
                    .with_description("Parent space, for nested spaces."),
            )
    }

    async fn create(&self, client: &ApiClient, planned: SpaceState) -> Result<SpaceState, ProviderError> {
        let request = CreateSpace {
            name: planned.name.clone(),
            is_private: planned.is_private,
            parent_space_uuid: planned.parent_space_uuid.clone(),
        };
        let created = client.create_space(&planned.project_uuid, &request).await?;
        let mut state = planned;
        state.apply_remote(&created);
        Ok(state)
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: SpaceState,
    ) -> Result<Option<SpaceState>, ProviderError> {
        let space_uuid = current.remote_uuid()?;
        let Some(space) =
            absent_on_not_found(client.get_space(&current.project_uuid, &space_uuid).await)?
        else {
            debug!(space_uuid = %space_uuid, "Space no longer exists");
            return Ok(None);
        };
        let mut state = current;
        state.apply_remote(&space);
        Ok(Some(state))
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: SpaceState,
        planned: SpaceState,
    ) -> Result<SpaceState, ProviderError> {
        let space_uuid = prior.remote_uuid()?;
        let request = UpdateSpace {
            name: planned.name.clone(),
            is_private: clearable(&prior.is_private, &planned.is_private),
        };
        let updated = client
            .update_space(&prior.project_uuid, &space_uuid, &request)
            .await?;
        let mut state = planned;
        state.apply_remote(&updated);
        Ok(state)
    }

    async fn delete(&self, client: &ApiClient, current: SpaceState) -> Result<Vec<Diagnostic>, ProviderError> {
        let space_uuid = current.remote_uuid()?;
        ignore_not_found(client.delete_space(&current.project_uuid, &space_uuid).await)?;
        Ok(Vec::new())
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(SpaceState, Vec<Diagnostic>), ProviderError> {
        let [organization_uuid, project_uuid, space_uuid] = SPACE_ID.parse(id)?;
        let space = absent_on_not_found(client.get_space(&project_uuid, &space_uuid).await)?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;

        let mut state = SpaceState {
            id: None,
            organization_uuid,
            project_uuid,
            space_uuid: None,
            name: String::new(),
            is_private: space.is_private,
            parent_space_uuid: None,
        };
        state.apply_remote(&space);
        Ok((state, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client_for, not_found_body, ok};
    use crate::resources::DynResource;
    use serde_json::json;
    use wiremock::matchers::{any, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote(name: &str) -> serde_json::Value {
        json!({
            "uuid": "s-1",
            "name": name,
            "projectUuid": "p-1",
            "organizationUuid": "org-1",
            "isPrivate": true,
            "parentSpaceUuid": null
        })
    }

    fn existing() -> SpaceState {
        SpaceState {
            id: Some("organizations/org-1/projects/p-1/spaces/s-1".to_string()),
            organization_uuid: "org-1".to_string(),
            project_uuid: "p-1".to_string(),
            space_uuid: Some("s-1".to_string()),
            name: "Finance".to_string(),
            is_private: Some(true),
            parent_space_uuid: None,
        }
    }

    #[tokio::test]
    async fn test_create_space() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/projects/p-1/spaces"))
            .and(body_json(json!({"name": "Finance", "isPrivate": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote("Finance"))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let planned = SpaceState {
            id: None,
            space_uuid: None,
            ..existing()
        };
        let created = Resource::create(&SpaceResource, &client, planned).await.unwrap();
        assert_eq!(created, existing());
    }

    #[tokio::test]
    async fn test_rename_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/p-1/spaces/s-1"))
            .and(body_json(json!({"name": "Finance & Ops", "isPrivate": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote("Finance & Ops"))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut planned = serde_json::to_value(existing()).unwrap();
        planned["name"] = json!("Finance & Ops");
        let updated = DynResource::update(
            &SpaceResource,
            &client,
            serde_json::to_value(existing()).unwrap(),
            planned,
        )
        .await
        .unwrap();
        assert_eq!(updated["name"], "Finance & Ops");
    }

    #[tokio::test]
    async fn test_update_clears_visibility() {
        let server = MockServer::start().await;
        let mut public = remote("Finance");
        public["isPrivate"] = json!(false);
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/p-1/spaces/s-1"))
            .and(body_json(json!({"name": "Finance", "isPrivate": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(public)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let planned = SpaceState {
            is_private: None,
            ..existing()
        };
        let updated = Resource::update(&SpaceResource, &client, existing(), planned.clone())
            .await
            .unwrap();
        assert_eq!(updated, planned);
    }

    #[tokio::test]
    async fn test_moving_space_requires_replacement() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut planned = serde_json::to_value(existing()).unwrap();
        planned["parent_space_uuid"] = json!("s-0");
        let err = DynResource::update(
            &SpaceResource,
            &client,
            serde_json::to_value(existing()).unwrap(),
            planned,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("parent_space_uuid"));
    }

    #[tokio::test]
    async fn test_absent_space() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/projects/p-1/spaces/s-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body("Space not found")))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(Resource::read(&SpaceResource, &client, existing()).await.unwrap().is_none());
        assert!(Resource::delete(&SpaceResource, &client, existing()).await.is_ok());
        let err = Resource::import(
            &SpaceResource,
            &client,
            "organizations/org-1/projects/p-1/spaces/s-1",
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_import_space() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/p-1/spaces/s-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote("Finance"))))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let (state, _) = Resource::import(
            &SpaceResource,
            &client,
            "organizations/org-1/projects/p-1/spaces/s-1",
        )
        .await
        .unwrap();
        assert_eq!(state, existing());
    }
}
