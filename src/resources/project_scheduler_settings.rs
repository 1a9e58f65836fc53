//! `lightdash_project_scheduler_settings`: the timezone used by a project's
//! scheduled deliveries.
//!
//! The settings always exist on the server, so create and update are the same
//! PATCH and delete restores the server default.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{absent_on_not_found, ignore_not_found, not_found, Resource};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource_id::IdPattern;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Composite ID of a project's scheduler settings.
pub const SCHEDULER_SETTINGS_ID: IdPattern =
    IdPattern::new("organizations/{organization_uuid}/projects/{project_uuid}/scheduler-settings");

/// Timezone Lightdash applies when none is configured.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// State of a `lightdash_project_scheduler_settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSchedulerSettingsState {
    #[serde(default)]
    pub id: Option<String>,
    pub organization_uuid: String,
    pub project_uuid: String,
    pub scheduler_timezone: String,
}

impl ProjectSchedulerSettingsState {
    fn with_id(mut self) -> Self {
        self.id = Some(SCHEDULER_SETTINGS_ID.format(&[&self.organization_uuid, &self.project_uuid]));
        self
    }
}

/// Reconciler for `lightdash_project_scheduler_settings`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectSchedulerSettingsResource;

#[async_trait::async_trait]
impl Resource for ProjectSchedulerSettingsResource {
    type State = ProjectSchedulerSettingsState;

    const TYPE_NAME: &'static str = "lightdash_project_scheduler_settings";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Manages the scheduler settings of a Lightdash project.")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_use_state_for_unknown()
                    .with_description(format!(
                        "Computed as `{}`.",
                        SCHEDULER_SETTINGS_ID.expected()
                    )),
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
                "scheduler_timezone",
                Attribute::required_string()
                    .with_description("IANA timezone name, e.g. 'Asia/Tokyo'."),
            )
    }

    async fn create(
        &self,
        client: &ApiClient,
        planned: ProjectSchedulerSettingsState,
    ) -> Result<ProjectSchedulerSettingsState, ProviderError> {
        client
            .update_scheduler_settings(&planned.project_uuid, &planned.scheduler_timezone)
            .await?;
        Ok(planned.with_id())
    }

    async fn read(
        &self,
        client: &ApiClient,
        current: ProjectSchedulerSettingsState,
    ) -> Result<Option<ProjectSchedulerSettingsState>, ProviderError> {
        let Some(project) = absent_on_not_found(client.get_project(&current.project_uuid).await)?
        else {
            debug!(project_uuid = %current.project_uuid, "Project no longer exists");
            return Ok(None);
        };
        let mut state = current;
        if let Some(timezone) = project.scheduler_timezone {
            state.scheduler_timezone = timezone;
        }
        Ok(Some(state.with_id()))
    }

    async fn update(
        &self,
        client: &ApiClient,
        _prior: ProjectSchedulerSettingsState,
        planned: ProjectSchedulerSettingsState,
    ) -> Result<ProjectSchedulerSettingsState, ProviderError> {
        client
            .update_scheduler_settings(&planned.project_uuid, &planned.scheduler_timezone)
            .await?;
        Ok(planned.with_id())
    }

    async fn delete(
        &self,
        client: &ApiClient,
        current: ProjectSchedulerSettingsState,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        info!(project_uuid = %current.project_uuid, "Resetting scheduler timezone to default");
        ignore_not_found(
            client
                .update_scheduler_settings(&current.project_uuid, DEFAULT_TIMEZONE)
                .await,
        )?;
        Ok(Vec::new())
    }

    async fn import(
        &self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(ProjectSchedulerSettingsState, Vec<Diagnostic>), ProviderError> {
        let [organization_uuid, project_uuid] = SCHEDULER_SETTINGS_ID.parse(id)?;
        let project = absent_on_not_found(client.get_project(&project_uuid).await)?
            .ok_or_else(|| not_found(Self::TYPE_NAME, id))?;
        let state = ProjectSchedulerSettingsState {
            id: None,
            organization_uuid,
            project_uuid,
            scheduler_timezone: project
                .scheduler_timezone
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        };
        Ok((state.with_id(), Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client_for, not_found_body, ok};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(timezone: &str) -> ProjectSchedulerSettingsState {
        ProjectSchedulerSettingsState {
            id: Some("organizations/org-1/projects/p-1/scheduler-settings".to_string()),
            organization_uuid: "org-1".to_string(),
            project_uuid: "p-1".to_string(),
            scheduler_timezone: timezone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_patches_timezone() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/p-1/schedulerSettings"))
            .and(body_json(json!({"schedulerTimezone": "Asia/Tokyo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let planned = ProjectSchedulerSettingsState {
            id: None,
            ..settings("Asia/Tokyo")
        };
        let created = Resource::create(&ProjectSchedulerSettingsResource, &client, planned)
            .await
            .unwrap();
        assert_eq!(created, settings("Asia/Tokyo"));
    }

    #[tokio::test]
    async fn test_read_picks_up_remote_timezone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
                "organizationUuid": "org-1",
                "projectUuid": "p-1",
                "name": "analytics",
                "type": "DEFAULT",
                "schedulerTimezone": "Europe/Paris"
            }))))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let read = Resource::read(&ProjectSchedulerSettingsResource, &client, settings("Asia/Tokyo"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.scheduler_timezone, "Europe/Paris");
    }

    #[tokio::test]
    async fn test_delete_resets_to_utc() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/projects/p-1/schedulerSettings"))
            .and(body_json(json!({"schedulerTimezone": "UTC"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let warnings = Resource::delete(&ProjectSchedulerSettingsResource, &client, settings("Asia/Tokyo"))
            .await
            .unwrap();
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_delete_on_missing_project_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body("Project not found")))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(
            Resource::delete(&ProjectSchedulerSettingsResource, &client, settings("Asia/Tokyo"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_malformed_import() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        let err = Resource::import(
            &ProjectSchedulerSettingsResource,
            &client,
            "organizations/org-1/projects/p-1",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidImportId { .. }));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
