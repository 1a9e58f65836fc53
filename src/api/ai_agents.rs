//! AI agent endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::require_identifier;
use crate::client::ApiClient;
use crate::error::ProviderError;

/// An AI agent as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAgent {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub project_uuid: String,
    #[serde(default)]
    pub organization_uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /api/v1/projects/{project}/aiAgents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAiAgent {
    pub project_uuid: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body of `PATCH /api/v1/projects/{project}/aiAgents/{agent}`.
///
/// A cleared instruction is sent as `null` and cleared tags as `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAiAgent {
    pub project_uuid: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn agents_path(project_uuid: &str) -> String {
    format!("/api/v1/projects/{}/aiAgents", project_uuid)
}

fn agent_path(project_uuid: &str, agent_uuid: &str) -> String {
    format!("{}/{}", agents_path(project_uuid), agent_uuid)
}

impl ApiClient {
    /// Create an agent in a project.
    pub async fn create_ai_agent(&self, request: &CreateAiAgent) -> Result<AiAgent, ProviderError> {
        info!(project_uuid = %request.project_uuid, name = %request.name, "Creating AI agent");
        let path = agents_path(&request.project_uuid);
        let agent: AiAgent = self.post(&path, request).await?;
        require_identifier("agent", &path, &agent.uuid)?;
        Ok(agent)
    }

    /// Fetch an agent.
    pub async fn get_ai_agent(&self, project_uuid: &str, agent_uuid: &str) -> Result<AiAgent, ProviderError> {
        debug!(project_uuid, agent_uuid, "Fetching AI agent");
        let path = agent_path(project_uuid, agent_uuid);
        let agent: AiAgent = self.get(&path).await?;
        require_identifier("agent", &path, &agent.uuid)?;
        Ok(agent)
    }

    /// Update an agent's name, instruction or tags.
    pub async fn update_ai_agent(
        &self,
        agent_uuid: &str,
        request: &UpdateAiAgent,
    ) -> Result<AiAgent, ProviderError> {
        info!(project_uuid = %request.project_uuid, agent_uuid, "Updating AI agent");
        let path = agent_path(&request.project_uuid, agent_uuid);
        let agent: AiAgent = self.patch(&path, request).await?;
        require_identifier("agent", &path, &agent.uuid)?;
        Ok(agent)
    }

    /// Delete an agent.
    pub async fn delete_ai_agent(&self, project_uuid: &str, agent_uuid: &str) -> Result<(), ProviderError> {
        info!(project_uuid, agent_uuid, "Deleting AI agent");
        self.delete(&agent_path(project_uuid, agent_uuid)).await
    }
}
