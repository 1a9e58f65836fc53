//! Read-only data sources.
//!
//! A [`DataSource`] reads remote values into a typed result record. The
//! provider stores them behind [`DynDataSource`] the same way it stores
//! resources.

pub mod organization;
pub mod personal_access_tokens;
pub mod project;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::schema::Schema;

pub use organization::OrganizationDataSource;
pub use personal_access_tokens::PersonalAccessTokensDataSource;
pub use project::ProjectDataSource;

/// A read-only lookup against the Lightdash API.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Arguments from configuration.
    type Config: DeserializeOwned + Send;
    /// Result record.
    type State: Serialize + Send;

    /// Data source type name, e.g. `lightdash_project`.
    const TYPE_NAME: &'static str;

    /// Attribute schema of the data source.
    fn schema(&self) -> Schema;

    /// Fetch the data.
    async fn read(&self, client: &ApiClient, config: Self::Config) -> Result<Self::State, ProviderError>;
}

/// Type-erased view of a [`DataSource`].
#[async_trait::async_trait]
pub trait DynDataSource: Send + Sync {
    /// Data source type name.
    fn type_name(&self) -> &'static str;

    /// Attribute schema.
    fn schema(&self) -> Schema;

    /// See [`DataSource::read`].
    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError>;
}

#[async_trait::async_trait]
impl<D: DataSource> DynDataSource for D {
    fn type_name(&self) -> &'static str {
        D::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        DataSource::schema(self)
    }

    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError> {
        let config = match config {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let config: D::Config = serde_json::from_value(config)?;
        let state = DataSource::read(self, client, config).await?;
        Ok(serde_json::to_value(state)?)
    }
}
