//! Lightdash Provider
//!
//! A declarative resource provider for the [Lightdash](https://www.lightdash.com)
//! REST API. It maps resource blocks onto Lightdash entities (projects,
//! personal access tokens, groups, project group accesses, spaces, project
//! scheduler settings and AI agents) and reconciles them through
//! Create/Read/Update/Delete/Import.
//!
//! # Overview
//!
//! - **Resources**: one [`resources::Resource`] reconciler per entity type
//! - **Data sources**: read-only lookups (tokens, a project, the organization)
//! - **Schema types**: attribute schemas with required/optional/computed,
//!   sensitive, replace-on-change and conflicts-with markers
//! - **Plan**: schema-driven diffs that mask sensitive values and flag replacements
//! - **Transport**: [`ApiClient`], one JSON request per call against `/api/v1`
//! - **Errors and logging**: [`ProviderError`] and `tracing` output on stderr
//!
//! # Quick Start
//!
//! ```ignore
//! use lightdash_provider::{init_logging, LightdashProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!     let provider = LightdashProvider::new();
//!     provider
//!         .configure(json!({"host": "https://app.lightdash.cloud", "token": "ldpat_..."}))
//!         .await?;
//!
//!     let imported = provider
//!         .import_resource("lightdash_project", "organizations/<org>/projects/<project>")
//!         .await?;
//!     println!("{}", imported[0].state);
//!     Ok(())
//! }
//! ```
//!
//! # Composite IDs
//!
//! Every resource stores an `id` encoding its place in the Lightdash
//! hierarchy, and import accepts the same string:
//!
//! ```text
//! organizations/<organization_uuid>/projects/<project_uuid>
//! organizations/<organization_uuid>/projects/<project_uuid>/spaces/<space_uuid>
//! projects/<project_uuid>/group-accesses/<group_uuid>
//! personal-access-tokens/<token_uuid>
//! ```
//!
//! # Configuration
//!
//! The provider block takes `host` and `token`, falling back to the
//! `LIGHTDASH_URL` and `LIGHTDASH_API_KEY` environment variables.

#![warn(missing_docs)]
#![warn(clippy::all)]

#[allow(missing_docs)]
pub mod api;
pub mod client;
pub mod config;
#[allow(missing_docs)]
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resource_id;
#[allow(missing_docs)]
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::ApiClient;
pub use config::{ProviderConfig, ResolvedConfig};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::LightdashProvider;
pub use resource_id::IdPattern;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
