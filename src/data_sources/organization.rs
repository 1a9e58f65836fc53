//! `lightdash_organization`: the organization the API token belongs to.

use serde::{Deserialize, Serialize};

use super::DataSource;
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// The data source takes no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizationConfig {}

/// Result of `lightdash_organization`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationState {
    pub id: String,
    pub organization_uuid: String,
    pub name: String,
}

/// Reads the caller's organization.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrganizationDataSource;

#[async_trait::async_trait]
impl DataSource for OrganizationDataSource {
    type Config = OrganizationConfig;
    type State = OrganizationState;

    const TYPE_NAME: &'static str = "lightdash_organization";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Reads the Lightdash organization of the authenticated user.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("organization_uuid", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
    }

    async fn read(&self, client: &ApiClient, _config: OrganizationConfig) -> Result<OrganizationState, ProviderError> {
        let organization = client.get_organization().await?;
        Ok(OrganizationState {
            id: organization.organization_uuid.clone(),
            organization_uuid: organization.organization_uuid,
            name: organization.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::DynDataSource;
    use crate::resources::test_support::{client_for, ok};
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_read_organization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/org"))
            .and(header("authorization", "ApiKey ldpat_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
                "organizationUuid": "org-1",
                "name": "Acme"
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let value = DynDataSource::read(&OrganizationDataSource, &client, Value::Null)
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({"id": "org-1", "organization_uuid": "org-1", "name": "Acme"})
        );
    }

    #[tokio::test]
    async fn test_server_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/org"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "error": {"statusCode": 401, "name": "AuthorizationError", "message": "Invalid API key"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = DataSource::read(&OrganizationDataSource, &client, OrganizationConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Invalid API key"));
    }
}
