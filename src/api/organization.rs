//! Organization and scheduler-settings endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::require_identifier;
use crate::client::ApiClient;
use crate::error::ProviderError;

/// The caller's organization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub organization_uuid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchedulerSettings<'a> {
    scheduler_timezone: &'a str,
}

const ORG_PATH: &str = "/api/v1/org";

impl ApiClient {
    /// Fetch the organization the token belongs to.
    pub async fn get_organization(&self) -> Result<Organization, ProviderError> {
        debug!("Fetching organization");
        let organization: Organization = self.get(ORG_PATH).await?;
        require_identifier("organization", ORG_PATH, &organization.organization_uuid)?;
        Ok(organization)
    }

    /// Set the timezone used by a project's scheduled deliveries.
    pub async fn update_scheduler_settings(
        &self,
        project_uuid: &str,
        timezone: &str,
    ) -> Result<(), ProviderError> {
        info!(project_uuid, timezone, "Updating project scheduler settings");
        self.patch_no_content(
            &format!("/api/v1/projects/{}/schedulerSettings", project_uuid),
            &SchedulerSettings {
                scheduler_timezone: timezone,
            },
        )
        .await
    }
}
