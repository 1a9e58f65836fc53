//! `lightdash_project`: a Lightdash project backed by a GitHub dbt repository.
//!
//! Core attributes (name, dbt version, dbt connection, warehouse) are patched
//! in place; organization, type and the upstream link force replacement.
//! Deleting the resource only forgets it: the project stays in Lightdash.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{absent_on_not_found, manual_configuration_warning, not_found, Resource};
use crate::api::clearable;
use crate::api::projects::{
    BigQueryCredentials, CreateProject, DbtGithubConnection, Project, ProjectType, UpdateProject,
};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};

/// Composite ID of a project.
pub const PROJECT_ID: IdPattern =
    IdPattern::new("organizations/{organization_uuid}/projects/{project_uuid}");

/// State of a `lightdash_project`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default)]
    pub id: Option<String>,
    pub organization_uuid: String,
    #[serde(default)]
    pub project_uuid: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub dbt_version: String,
    #[serde(default)]
    pub dbt_connection: Option<DbtConnection>,
    #[serde(default)]
    pub organization_warehouse_credentials_uuid: Option<String>,
    #[serde(default)]
    pub warehouse_connection: Option<WarehouseConnection>,
    #[serde(default)]
    pub upstream_project_uuid: Option<String>,
    #[serde(default)]
    pub copy_warehouse_connection_from_upstream_project: Option<bool>,
}

/// The `dbt_connection` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbtConnection {
    #[serde(rename = "type")]
    pub connection_type: String,
    pub authorization_method: String,
    #[serde(default)]
    pub personal_access_token: Option<String>,
    pub repository: String,
    pub branch: String,
    pub project_sub_path: String,
    #[serde(default)]
    pub host_domain: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// The `warehouse_connection` block (BigQuery).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConnection {
    #[serde(rename = "type")]
    pub warehouse_type: String,
    pub project: String,
    #[serde(default)]
    pub dataset: Option<String>,
    pub keyfile_contents: String,
    #[serde(default)]
    pub authentication_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<i64>,
    #[serde(default)]
    pub maximum_bytes_billed: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub retries: Option<i64>,
    #[serde(default)]
    pub start_of_week: Option<i64>,
}

impl DbtConnection {
    fn to_wire(&self) -> DbtGithubConnection {
        DbtGithubConnection {
            connection_type: self.connection_type.clone(),
            authorization_method: self.authorization_method.clone(),
            personal_access_token: self.personal_access_token.clone(),
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            project_sub_path: self.project_sub_path.clone(),
            host_domain: self.host_domain.clone(),
            target: self.target.clone(),
        }
    }

    /// Build from an API response. The response never carries the token.
    fn from_wire(wire: &DbtGithubConnection) -> Self {
        Self {
            connection_type: wire.connection_type.clone(),
            authorization_method: wire.authorization_method.clone(),
            personal_access_token: None,
            repository: wire.repository.clone(),
            branch: wire.branch.clone(),
            project_sub_path: wire.project_sub_path.clone(),
            host_domain: wire.host_domain.clone(),
            target: wire.target.clone(),
        }
    }

    /// Take non-secret values from the server, keep everything else.
    fn refresh(&mut self, wire: &DbtGithubConnection) {
        let refresh = |field: &mut String, remote: &String| {
            if !remote.is_empty() {
                *field = remote.clone();
            }
        };
        refresh(&mut self.connection_type, &wire.connection_type);
        refresh(&mut self.authorization_method, &wire.authorization_method);
        refresh(&mut self.repository, &wire.repository);
        refresh(&mut self.branch, &wire.branch);
        refresh(&mut self.project_sub_path, &wire.project_sub_path);
        if wire.host_domain.is_some() {
            self.host_domain = wire.host_domain.clone();
        }
        if wire.target.is_some() {
            self.target = wire.target.clone();
        }
    }
}

impl WarehouseConnection {
    fn to_wire(&self) -> Result<BigQueryCredentials, ProviderError> {
        let keyfile: Map<String, Value> = serde_json::from_str(&self.keyfile_contents).map_err(|e| {
            ProviderError::Configuration(format!(
                "Error parsing keyfile_contents: could not parse keyfile_contents as JSON: {}",
                e
            ))
        })?;
        Ok(BigQueryCredentials {
            warehouse_type: self.warehouse_type.clone(),
            project: self.project.clone(),
            dataset: self.dataset.clone(),
            keyfile_contents: Some(keyfile),
            authentication_type: self.authentication_type.clone(),
            location: self.location.clone(),
            timeout_seconds: self.timeout_seconds,
            maximum_bytes_billed: self.maximum_bytes_billed,
            priority: self.priority.as_deref().map(str::to_lowercase),
            retries: self.retries,
            start_of_week: self.start_of_week,
        })
    }
}

impl ProjectState {
    fn remote_uuid(&self) -> Result<String, ProviderError> {
        if let Some(uuid) = self.project_uuid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(uuid.to_string());
        }
        let id = self.id.as_deref().unwrap_or_default();
        let [_, project] = PROJECT_ID.parse(id)?;
        Ok(project)
    }

    fn dbt_connection(&self) -> Result<DbtGithubConnection, ProviderError> {
        self.dbt_connection
            .as_ref()
            .map(DbtConnection::to_wire)
            .ok_or_else(|| ProviderError::Validation("dbt_connection is required".to_string()))
    }

    fn warehouse_connection(&self) -> Result<Option<BigQueryCredentials>, ProviderError> {
        self.warehouse_connection
            .as_ref()
            .map(WarehouseConnection::to_wire)
            .transpose()
    }

    /// Copy values the server owns into state.
    fn apply_remote(&mut self, project: &Project) {
        if !project.organization_uuid.is_empty() {
            self.organization_uuid = project.organization_uuid.clone();
        }
        if !project.name.is_empty() {
            self.name = project.name.clone();
        }
        if let Some(project_type) = project.project_type {
            self.project_type = project_type;
        }
        if let Some(version) = project.dbt_version.as_ref().filter(|v| !v.is_empty()) {
            self.dbt_version = version.clone();
        }
        self.organization_warehouse_credentials_uuid =
            project.organization_warehouse_credentials_uuid.clone();
        self.upstream_project_uuid = project.upstream_project_uuid.clone();

        match (&mut self.dbt_connection, &project.dbt_connection) {
            (Some(local), Some(remote)) => local.refresh(remote),
            (None, Some(remote)) => self.dbt_connection = Some(DbtConnection::from_wire(remote)),
            _ => {}
        }
    }
}

/// Reconciler for `lightdash_project`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectResource;

fn dbt_connection_block() -> Block {
    Block::new()
        .with_description("The dbt connection configuration for GitHub.")
        .with_attribute(
            "type",
            Attribute::required_string()
                .with_allowed_values(["github"])
                .with_description("The type of dbt connection. Currently only 'github' is supported."),
        )
        .with_attribute(
            "authorization_method",
            Attribute::required_string()
                .with_allowed_values(["personal_access_token", "installation_id"])
                .with_description("How Lightdash authenticates to GitHub."),
        )
        .with_attribute(
            "personal_access_token",
            Attribute::optional_string()
                .sensitive()
                .with_description("The GitHub personal access token."),
        )
        .with_attribute(
            "repository",
            Attribute::required_string().with_description("The GitHub repository as 'owner/repo'."),
        )
        .with_attribute("branch", Attribute::required_string())
        .with_attribute(
            "project_sub_path",
            Attribute::required_string()
                .with_description("Directory of the dbt project within the repository."),
        )
        .with_attribute(
            "host_domain",
            Attribute::optional_string().with_description("GitHub Enterprise host domain."),
        )
        .with_attribute("target", Attribute::optional_string())
}

fn warehouse_connection_block() -> Block {
    Block::new()
        .with_description("Inline BigQuery credentials.")
        .with_attribute(
            "type",
            Attribute::required_string().with_allowed_values(["bigquery"]),
        )
        .with_attribute(
            "project",
            Attribute::required_string().with_description("The GCP project ID."),
        )
        .with_attribute("dataset", Attribute::optional_string())
        .with_attribute(
            "keyfile_contents",
            Attribute::required_string()
                .sensitive()
                .with_description("Service account key file, as a JSON string."),
        )
        .with_attribute(
            "authentication_type",
            Attribute::optional_string().with_allowed_values(["sso", "private_key", "adc"]),
        )
        .with_attribute("location", Attribute::optional_string())
        .with_attribute("timeout_seconds", Attribute::optional_int64())
        .with_attribute("maximum_bytes_billed", Attribute::optional_int64())
        .with_attribute(
            "priority",
            Attribute::optional_string()
                .with_description("BigQuery job priority, 'interactive' or 'batch'."),
        )
        .with_attribute("retries", Attribute::optional_int64())
        .with_attribute(
            "start_of_week",
            Attribute::optional_int64().with_description("0 = Sunday, 1 = Monday, and so on."),
        )
}

#[async_trait::async_trait]
impl Resource for ProjectResource {
    type State = ProjectState;

    const TYPE_NAME: &'static str = "lightdash_project";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Manages a Lightdash project with a GitHub dbt connection.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!("Computed as `{}`.", PROJECT_ID.expected())),
            )
            .with_attribute(
                "organization_uuid",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute(
                "project_uuid",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "type",
                Attribute::required_string()
                    .with_allowed_values(["DEFAULT", "PREVIEW"])
                    .with_requires_replace(),
            )
            .with_attribute(
                "dbt_version",
                Attribute::required_string().with_description("e.g. 'v1.8'."),
            )
            .with_block("dbt_connection", NestedBlock::required_single(dbt_connection_block()))
            .with_attribute(
                "organization_warehouse_credentials_uuid",
                Attribute::optional_string()
                    .with_conflicts_with("warehouse_connection")
                    .with_description("Shared organization warehouse credentials to use."),
            )
            .with_block(
                "warehouse_connection",
                NestedBlock::single(warehouse_connection_block())
                    .with_conflicts_with("organization_warehouse_credentials_uuid"),
            )
            .with_attribute(
                "upstream_project_uuid",
                Attribute::optional_string()
                    .with_requires_replace()
                    .with_description("Upstream project of a PREVIEW project."),
            )
            .with_attribute(
                "copy_warehouse_connection_from_upstream_project",
                Attribute::optional_bool().with_requires_replace(),
            )
    }

    async fn create(
        &self,
        client: &ApiClient,
        planned: ProjectState,
    ) -> Result<ProjectState, ProviderError> {
        let request = CreateProject {
            name: planned.name.clone(),
            project_type: planned.project_type,
            dbt_connection: planned.dbt_connection()?,
            dbt_version: planned.dbt_version.clone(),
            organization_warehouse_credentials_uuid: planned
                .organization_warehouse_credentials_uuid
                .clone(),
            warehouse_connection: planned.warehouse_connection()?,
            upstream_project_uuid: planned.upstream_project_uuid.clone(),
            copy_warehouse_connection_from_upstream_project: planned
                .copy_warehouse_connection_from_upstream_project,
        };

        let created = client.create_project(&request).await?;

        let mut state = planned;
        state.id = Some(PROJECT_ID.format(&[&state.organization_uuid, &created.project_uuid]));
        state.project_uuid = Some(created.project_uuid);
        info!(id = state.id.as_deref().unwrap_or_default(), "Created project");
        Ok(state)
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: ProjectState,
    ) -> Result<Option<ProjectState>, ProviderError> {
        let project_uuid = current.remote_uuid()?;
        let Some(project) = absent_on_not_found(client.get_project(&project_uuid).await)? else {
            debug!(project_uuid = %project_uuid, "Project no longer exists");
            return Ok(None);
        };

        let mut state = current;
        state.apply_remote(&project);
        state.project_uuid = Some(project.project_uuid.clone());
        state.id = Some(PROJECT_ID.format(&[&state.organization_uuid, &project.project_uuid]));
        Ok(Some(state))
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: ProjectState,
        planned: ProjectState,
    ) -> Result<ProjectState, ProviderError> {
        let project_uuid = prior.remote_uuid()?;
        let request = UpdateProject {
            name: planned.name.clone(),
            dbt_connection: planned.dbt_connection()?,
            dbt_version: planned.dbt_version.clone(),
            organization_warehouse_credentials_uuid: clearable(
                &prior.organization_warehouse_credentials_uuid,
                &planned.organization_warehouse_credentials_uuid,
            ),
            warehouse_connection: planned.warehouse_connection()?,
        };

        let updated = client.update_project(&project_uuid, &request).await?;

        let mut state = planned;
        if !updated.name.is_empty() {
            state.name = updated.name;
        }
        state.project_uuid = Some(project_uuid.clone());
        state.id = Some(PROJECT_ID.format(&[&state.organization_uuid, &project_uuid]));
        Ok(state)
    }

    async fn delete(
        &self,
        _client: &ApiClient,
        current: ProjectState,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        warn!(
            project_uuid = current.project_uuid.as_deref().unwrap_or_default(),
            "Project removed from state but left in Lightdash"
        );
        Ok(vec![Diagnostic::warning("Project not deleted").with_detail(
            "The Lightdash project was removed from state but still exists in Lightdash. \
             Delete it from the Lightdash UI if it is no longer needed.",
        )])
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(ProjectState, Vec<Diagnostic>), ProviderError> {
        let [organization_uuid, project_uuid] = PROJECT_ID.parse(id)?;
        let project = absent_on_not_found(client.get_project(&project_uuid).await)?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;

        let mut state = ProjectState {
            id: Some(PROJECT_ID.format(&[&organization_uuid, &project_uuid])),
            organization_uuid,
            project_uuid: Some(project.project_uuid.clone()),
            name: String::new(),
            project_type: ProjectType::Default,
            dbt_version: String::new(),
            dbt_connection: None,
            organization_warehouse_credentials_uuid: None,
            warehouse_connection: None,
            upstream_project_uuid: None,
            copy_warehouse_connection_from_upstream_project: None,
        };
        state.apply_remote(&project);

        warn!(id, "Imported project without credentials");
        let mut missing = vec!["dbt_connection.personal_access_token"];
        if project.organization_warehouse_credentials_uuid.is_none() {
            missing.push("warehouse_connection");
        }
        let warning = manual_configuration_warning(Self::TYPE_NAME, &missing);
        Ok((state, vec![warning]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client_for, not_found_body, ok};
    use crate::resources::DynResource;
    use serde_json::json;
    use wiremock::matchers::{any, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn planned(project_type: ProjectType) -> ProjectState {
        ProjectState {
            id: None,
            organization_uuid: "org-1".to_string(),
            project_uuid: None,
            name: "analytics".to_string(),
            project_type,
            dbt_version: "v1.8".to_string(),
            dbt_connection: Some(DbtConnection {
                connection_type: "github".to_string(),
                authorization_method: "personal_access_token".to_string(),
                personal_access_token: Some("ghp_secret".to_string()),
                repository: "acme/dbt".to_string(),
                branch: "main".to_string(),
                project_sub_path: "/".to_string(),
                host_domain: None,
                target: None,
            }),
            organization_warehouse_credentials_uuid: Some("creds-1".to_string()),
            warehouse_connection: None,
            upstream_project_uuid: None,
            copy_warehouse_connection_from_upstream_project: None,
        }
    }

    fn remote_project(project_uuid: &str) -> Value {
        json!({
            "organizationUuid": "org-1",
            "projectUuid": project_uuid,
            "name": "analytics",
            "type": "DEFAULT",
            "dbtVersion": "v1.8",
            "organizationWarehouseCredentialsUuid": "creds-1",
            "dbtConnection": {
                "type": "github",
                "authorization_method": "personal_access_token",
                "repository": "acme/dbt",
                "branch": "main",
                "project_sub_path": "/"
            }
        })
    }

    async fn forbid_requests(server: &MockServer) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/org/projects"))
            .and(header("authorization", "ApiKey ldpat_test"))
            .and(body_partial_json(json!({
                "name": "analytics",
                "type": "DEFAULT",
                "dbtVersion": "v1.8",
                "organizationWarehouseCredentialsUuid": "creds-1",
                "dbtConnection": {"personal_access_token": "ghp_secret", "branch": "main"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
                "hasContentCopy": false,
                "project": remote_project("proj-1")
            }))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/proj-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote_project("proj-1"))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let input = planned(ProjectType::Default);
        let created = Resource::create(&ProjectResource, &client, input.clone()).await.unwrap();
        assert_eq!(created.project_uuid.as_deref(), Some("proj-1"));
        assert_eq!(created.id.as_deref(), Some("organizations/org-1/projects/proj-1"));

        let read = Resource::read(&ProjectResource, &client, created.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.name, input.name);
        assert_eq!(read.project_type, input.project_type);
        assert_eq!(read.dbt_version, input.dbt_version);
        assert_eq!(
            read.organization_warehouse_credentials_uuid,
            input.organization_warehouse_credentials_uuid
        );
        let dbt = read.dbt_connection.unwrap();
        assert_eq!(dbt.personal_access_token.as_deref(), Some("ghp_secret"));
        assert_eq!(dbt.repository, "acme/dbt");
    }

    #[tokio::test]
    async fn test_create_preview_from_upstream() {
        let server = MockServer::start().await;
        let mut remote = remote_project("proj-new");
        remote["type"] = json!("PREVIEW");
        remote["upstreamProjectUuid"] = json!("proj-upstream");
        Mock::given(method("POST"))
            .and(path("/api/v1/org/projects"))
            .and(body_partial_json(json!({
                "type": "PREVIEW",
                "upstreamProjectUuid": "proj-upstream",
                "copyWarehouseConnectionFromUpstreamProject": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok(json!({"hasContentCopy": true, "project": remote}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut input = planned(ProjectType::Preview);
        input.organization_warehouse_credentials_uuid = None;
        input.upstream_project_uuid = Some("proj-upstream".to_string());
        input.copy_warehouse_connection_from_upstream_project = Some(true);

        let created = Resource::create(&ProjectResource, &client, input).await.unwrap();
        assert_eq!(created.project_uuid.as_deref(), Some("proj-new"));
        assert_ne!(created.project_uuid, created.upstream_project_uuid);
        assert_eq!(created.upstream_project_uuid.as_deref(), Some("proj-upstream"));
    }

    #[tokio::test]
    async fn test_create_without_uuid_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/org/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
                "hasContentCopy": false,
                "project": {"name": "analytics"}
            }))))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = Resource::create(&ProjectResource, &client, planned(ProjectType::Default))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingIdentifier { entity: "project", .. }));
    }

    #[tokio::test]
    async fn test_invalid_keyfile_is_configuration_error() {
        let server = MockServer::start().await;
        forbid_requests(&server).await;

        let mut input = planned(ProjectType::Default);
        input.organization_warehouse_credentials_uuid = None;
        input.warehouse_connection = Some(WarehouseConnection {
            warehouse_type: "bigquery".to_string(),
            project: "gcp".to_string(),
            dataset: None,
            keyfile_contents: "{not json".to_string(),
            authentication_type: None,
            location: None,
            timeout_seconds: None,
            maximum_bytes_billed: None,
            priority: None,
            retries: None,
            start_of_week: None,
        });

        let client = client_for(&server).await;
        let err = Resource::create(&ProjectResource, &client, input).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains("Error parsing keyfile_contents"));
    }

    #[tokio::test]
    async fn test_warehouse_priority_lowercased_on_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/org/projects"))
            .and(body_partial_json(json!({
                "warehouseConnection": {
                    "type": "bigquery",
                    "priority": "batch",
                    "keyfileContents": {"type": "service_account"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
                "project": remote_project("proj-1")
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let mut input = planned(ProjectType::Default);
        input.organization_warehouse_credentials_uuid = None;
        input.warehouse_connection = Some(WarehouseConnection {
            warehouse_type: "bigquery".to_string(),
            project: "gcp".to_string(),
            dataset: Some("analytics".to_string()),
            keyfile_contents: r#"{"type": "service_account"}"#.to_string(),
            authentication_type: None,
            location: None,
            timeout_seconds: None,
            maximum_bytes_billed: None,
            priority: Some("BATCH".to_string()),
            retries: None,
            start_of_week: None,
        });

        let client = client_for(&server).await;
        let created = Resource::create(&ProjectResource, &client, input).await.unwrap();
        let warehouse = created.warehouse_connection.unwrap();
        assert_eq!(warehouse.priority.as_deref(), Some("BATCH"));
    }

    #[tokio::test]
    async fn test_read_absent_project() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/proj-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body("Project not found")))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut current = planned(ProjectType::Default);
        current.project_uuid = Some("proj-1".to_string());
        let read = Resource::read(&ProjectResource, &client, current).await.unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_import_then_read() {
        let server = MockServer::start().await;
        let mut remote = remote_project("PROJ");
        remote["organizationUuid"] = json!("ORG");
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/PROJ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote)))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let imported = DynResource::import(&ProjectResource, &client, "organizations/ORG/projects/PROJ")
            .await
            .unwrap();
        assert_eq!(imported.resource_type, "lightdash_project");
        assert_eq!(imported.diagnostics.len(), 1);
        assert!(!imported.diagnostics[0].is_error());
        let detail = imported.diagnostics[0].detail.clone().unwrap_or_default();
        assert!(detail.contains("dbt_connection.personal_access_token"));
        assert!(!detail.contains("warehouse_connection"));

        let read = DynResource::read(&ProjectResource, &client, imported.state)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read["organization_uuid"], "ORG");
        assert_eq!(read["project_uuid"], "PROJ");
        assert_eq!(read["id"], "organizations/ORG/projects/PROJ");
        assert!(read["dbt_connection"]["personal_access_token"].is_null());
    }

    #[tokio::test]
    async fn test_import_with_inline_warehouse_warns_about_it() {
        let server = MockServer::start().await;
        let mut remote = remote_project("PROJ");
        remote["organizationWarehouseCredentialsUuid"] = Value::Null;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/PROJ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote)))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let (_, warnings) = Resource::import(&ProjectResource, &client, "organizations/ORG/projects/PROJ")
            .await
            .unwrap();
        let detail = warnings[0].detail.clone().unwrap_or_default();
        assert!(detail.contains("warehouse_connection"));
    }

    #[tokio::test]
    async fn test_malformed_import_makes_no_requests() {
        let server = MockServer::start().await;
        forbid_requests(&server).await;

        let client = client_for(&server).await;
        let err = Resource::import(&ProjectResource, &client, "not-a-valid-id")
            .await
            .unwrap_err();
        match err {
            ProviderError::InvalidImportId { expected, .. } => assert_eq!(
                expected,
                "organizations/<organization_uuid>/projects/<project_uuid>"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_type_change_intercepted_before_transport() {
        let server = MockServer::start().await;
        forbid_requests(&server).await;

        let client = client_for(&server).await;
        let mut prior = planned(ProjectType::Default);
        prior.project_uuid = Some("proj-1".to_string());
        prior.id = Some("organizations/org-1/projects/proj-1".to_string());
        let mut next = prior.clone();
        next.project_type = ProjectType::Preview;

        let err = DynResource::update(
            &ProjectResource,
            &client,
            serde_json::to_value(&prior).unwrap(),
            serde_json::to_value(&next).unwrap(),
        )
        .await
        .unwrap_err();
        match err {
            ProviderError::ReplacementRequired { attributes, .. } => {
                assert_eq!(attributes, vec!["type".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_patches_core_attributes() {
        let server = MockServer::start().await;
        let mut remote = remote_project("proj-1");
        remote["name"] = json!("analytics-v2");
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/proj-1"))
            .and(body_partial_json(json!({
                "name": "analytics-v2",
                "dbtConnection": {"branch": "release"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut prior = planned(ProjectType::Default);
        prior.project_uuid = Some("proj-1".to_string());
        prior.id = Some("organizations/org-1/projects/proj-1".to_string());
        let mut next = prior.clone();
        next.id = None;
        next.project_uuid = None;
        next.name = "analytics-v2".to_string();
        if let Some(dbt) = next.dbt_connection.as_mut() {
            dbt.branch = "release".to_string();
        }

        let updated = DynResource::update(
            &ProjectResource,
            &client,
            serde_json::to_value(&prior).unwrap(),
            serde_json::to_value(&next).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(updated["name"], "analytics-v2");
        assert_eq!(updated["project_uuid"], "proj-1");
        assert_eq!(updated["id"], "organizations/org-1/projects/proj-1");
    }

    #[tokio::test]
    async fn test_update_clears_organization_credentials() {
        let server = MockServer::start().await;
        let mut remote = remote_project("proj-1");
        remote["organizationWarehouseCredentialsUuid"] = Value::Null;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/proj-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(remote)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut prior = planned(ProjectType::Default);
        prior.project_uuid = Some("proj-1".to_string());
        prior.id = Some("organizations/org-1/projects/proj-1".to_string());
        let mut next = prior.clone();
        next.organization_warehouse_credentials_uuid = None;
        next.warehouse_connection = Some(WarehouseConnection {
            warehouse_type: "bigquery".to_string(),
            project: "gcp".to_string(),
            dataset: None,
            keyfile_contents: r#"{"type": "service_account"}"#.to_string(),
            authentication_type: None,
            location: None,
            timeout_seconds: None,
            maximum_bytes_billed: None,
            priority: None,
            retries: None,
            start_of_week: None,
        });

        let updated = Resource::update(&ProjectResource, &client, prior, next)
            .await
            .unwrap();
        assert!(updated.organization_warehouse_credentials_uuid.is_none());

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let fields = body.as_object().unwrap();
        assert_eq!(fields.get("organizationWarehouseCredentialsUuid"), Some(&Value::Null));
        assert_eq!(body["warehouseConnection"]["type"], "bigquery");
    }

    #[tokio::test]
    async fn test_delete_is_local_with_warning() {
        let server = MockServer::start().await;
        forbid_requests(&server).await;

        let client = client_for(&server).await;
        let mut current = planned(ProjectType::Default);
        current.project_uuid = Some("proj-1".to_string());
        let warnings = Resource::delete(&ProjectResource, &client, current).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].summary, "Project not deleted");
        assert!(!warnings[0].is_error());
    }
}
