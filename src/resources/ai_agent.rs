//! `lightdash_ai_agent`: an AI agent scoped to a project.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{absent_on_not_found, ignore_not_found, not_found, Resource};
use crate::api::ai_agents::{AiAgent, CreateAiAgent, UpdateAiAgent};
use crate::api::clearable;
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Composite ID of an agent.
pub const AGENT_ID: IdPattern =
    IdPattern::new("organizations/{organization_uuid}/projects/{project_uuid}/agents/{agent_uuid}");

/// State of a `lightdash_ai_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAgentState {
    #[serde(default)]
    pub id: Option<String>,
    pub organization_uuid: String,
    pub project_uuid: String,
    #[serde(default)]
    pub agent_uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl AiAgentState {
    fn remote_uuid(&self) -> Result<String, ProviderError> {
        if let Some(uuid) = self.agent_uuid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(uuid.to_string());
        }
        let [_, _, agent] = AGENT_ID.parse(self.id.as_deref().unwrap_or_default())?;
        Ok(agent)
    }

    fn create_request(&self) -> CreateAiAgent {
        CreateAiAgent {
            project_uuid: self.project_uuid.clone(),
            name: self.name.clone(),
            instruction: self.instruction.clone(),
            tags: self.tags.clone(),
        }
    }

    fn update_request(&self, prior: &AiAgentState) -> UpdateAiAgent {
        UpdateAiAgent {
            project_uuid: self.project_uuid.clone(),
            name: self.name.clone(),
            instruction: clearable(&prior.instruction, &self.instruction),
            tags: clearable(&prior.tags, &self.tags).map(Option::unwrap_or_default),
        }
    }

    fn apply_remote(&mut self, agent: &AiAgent) {
        self.name = agent.name.clone();
        if agent.instruction.is_some() || self.instruction.is_some() {
            self.instruction = agent.instruction.clone();
        }
        // An empty tag list and no tags are the same on the server.
        match (&self.tags, &agent.tags) {
            (None, Some(remote)) if remote.is_empty() => {}
            (_, remote) => self.tags = remote.clone(),
        }
        self.agent_uuid = Some(agent.uuid.clone());
        self.id = Some(AGENT_ID.format(&[&self.organization_uuid, &self.project_uuid, &agent.uuid]));
    }
}

/// Reconciler for `lightdash_ai_agent`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiAgentResource;

#[async_trait::async_trait]
impl Resource for AiAgentResource {
    type State = AiAgentState;

    const TYPE_NAME: &'static str = "lightdash_ai_agent";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Manages a Lightdash AI agent.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!("Computed as `{}`.", AGENT_ID.expected())),
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
                "agent_uuid",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "instruction",
                Attribute::optional_string().with_description("System instruction for the agent."),
            )
            .with_attribute("tags", Attribute::optional_string_list())
    }

    async fn create(&self, client: &ApiClient, planned: AiAgentState) -> Result<AiAgentState, ProviderError> {
        let created = client.create_ai_agent(&planned.create_request()).await?;
        let mut state = planned;
        state.apply_remote(&created);
        Ok(state)
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: AiAgentState,
    ) -> Result<Option<AiAgentState>, ProviderError> {
        let agent_uuid = current.remote_uuid()?;
        let Some(agent) =
            absent_on_not_found(client.get_ai_agent(&current.project_uuid, &agent_uuid).await)?
        else {
            debug!(agent_uuid = %agent_uuid, "AI agent no longer exists");
            return Ok(None);
        };
        let mut state = current;
        state.apply_remote(&agent);
        Ok(Some(state))
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: AiAgentState,
        planned: AiAgentState,
    ) -> Result<AiAgentState, ProviderError> {
        let agent_uuid = prior.remote_uuid()?;
        let updated = client
            .update_ai_agent(&agent_uuid, &planned.update_request(&prior))
            .await?;
        let mut state = planned;
        state.apply_remote(&updated);
        Ok(state)
    }

    async fn delete(&self, client: &ApiClient, current: AiAgentState) -> Result<Vec<Diagnostic>, ProviderError> {
        let agent_uuid = current.remote_uuid()?;
        ignore_not_found(client.delete_ai_agent(&current.project_uuid, &agent_uuid).await)?;
        Ok(Vec::new())
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(AiAgentState, Vec<Diagnostic>), ProviderError> {
        let [organization_uuid, project_uuid, agent_uuid] = AGENT_ID.parse(id)?;
        let agent = absent_on_not_found(client.get_ai_agent(&project_uuid, &agent_uuid).await)?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;
        let mut state = AiAgentState {
            id: None,
            organization_uuid,
            project_uuid,
            agent_uuid: None,
            name: String::new(),
            instruction: None,
            tags: None,
        };
        state.apply_remote(&agent);
        Ok((state, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client_for, not_found_body, ok};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote(name: &str, tags: &[&str]) -> serde_json::Value {
        json!({
            "uuid": "a-1",
            "projectUuid": "p-1",
            "organizationUuid": "org-1",
            "name": name,
            "instruction": "Answer revenue questions.",
            "tags": tags
        })
    }

    fn existing() -> AiAgentState {
        AiAgentState {
            id: Some("organizations/org-1/projects/p-1/agents/a-1".to_string()),
            organization_uuid: "org-1".to_string(),
            project_uuid: "p-1".to_string(),
            agent_uuid: Some("a-1".to_string()),
            name: "Revenue bot".to_string(),
            instruction: Some("Answer revenue questions.".to_string()),
            tags: None,
        }
    }

    #[tokio::test]
    async fn test_create_agent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/projects/p-1/aiAgents"))
            .and(body_json(json!({
                "projectUuid": "p-1",
                "name": "Revenue bot",
                "instruction": "Answer revenue questions."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote("Revenue bot", &[]))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let planned = AiAgentState {
            id: None,
            agent_uuid: None,
            ..existing()
        };
        let created = Resource::create(&AiAgentResource, &client, planned).await.unwrap();
        assert_eq!(created, existing());
    }

    #[tokio::test]
    async fn test_update_tags() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/p-1/aiAgents/a-1"))
            .and(body_json(json!({
                "projectUuid": "p-1",
                "name": "Revenue bot",
                "instruction": "Answer revenue questions.",
                "tags": ["finance"]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(ok(remote("Revenue bot", &["finance"]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let planned = AiAgentState {
            tags: Some(vec!["finance".to_string()]),
            ..existing()
        };
        let updated = Resource::update(&AiAgentResource, &client, existing(), planned)
            .await
            .unwrap();
        assert_eq!(updated.tags, Some(vec!["finance".to_string()]));
    }

    #[tokio::test]
    async fn test_update_clears_instruction_and_tags() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/p-1/aiAgents/a-1"))
            .and(body_json(json!({
                "projectUuid": "p-1",
                "name": "Revenue bot",
                "instruction": null,
                "tags": []
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
                "uuid": "a-1",
                "projectUuid": "p-1",
                "organizationUuid": "org-1",
                "name": "Revenue bot",
                "instruction": null,
                "tags": []
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let prior = AiAgentState {
            tags: Some(vec!["finance".to_string()]),
            ..existing()
        };
        let planned = AiAgentState {
            instruction: None,
            tags: None,
            ..existing()
        };
        let updated = Resource::update(&AiAgentResource, &client, prior, planned.clone())
            .await
            .unwrap();
        assert_eq!(updated, planned);
    }

    #[test]
    fn test_update_omits_fields_never_set() {
        let prior = AiAgentState {
            instruction: None,
            ..existing()
        };
        let body = serde_json::to_value(prior.update_request(&prior)).unwrap();
        assert_eq!(body, json!({"projectUuid": "p-1", "name": "Revenue bot"}));
    }

    #[tokio::test]
    async fn test_read_and_delete_absent_agent() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/projects/p-1/aiAgents/a-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body("Agent not found")))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(Resource::read(&AiAgentResource, &client, existing()).await.unwrap().is_none());
        assert!(Resource::delete(&AiAgentResource, &client, existing()).await.is_ok());
    }

    #[tokio::test]
    async fn test_import_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/p-1/aiAgents/a-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote("Revenue bot", &[]))))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let (state, _) = Resource::import(
            &AiAgentResource,
            &client,
            "organizations/org-1/projects/p-1/agents/a-1",
        )
        .await
        .unwrap();
        assert_eq!(state, existing());
    }
}
