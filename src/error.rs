//! Error types for the Lightdash provider.
//!
//! Every failure a reconciler can hit maps onto one [`ProviderError`] variant.
//! Errors are never retried; they are converted into a [`Diagnostic`] with a
//! short summary and a detailed message for the orchestrator.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while reconciling Lightdash resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested entity does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Input failed schema validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider or resource configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// State could not be converted to or from its typed representation.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request never produced a response.
    #[error("Transport error during {method} {path}: {source}")]
    Transport {
        /// HTTP verb of the attempted request.
        method: String,
        /// Request path relative to the host.
        path: String,
        /// Underlying client failure.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    #[error("{method} {path} returned HTTP {status}: {message}{}", request_body_suffix(.request_body))]
    Api {
        /// HTTP verb of the request.
        method: String,
        /// Request path relative to the host.
        path: String,
        /// Response status code.
        status: u16,
        /// Server error message, or the raw response body.
        message: String,
        /// Redacted request body, when one was sent.
        request_body: Option<String>,
    },

    /// The response body was not the JSON shape we expected.
    #[error("Failed to decode response from {path}: {source}, body: {body}")]
    Decode {
        /// Request path relative to the host.
        path: String,
        /// Raw response body.
        body: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response came back without the identifier of the entity.
    #[error("{entity} UUID is missing in the response from {path}")]
    MissingIdentifier {
        /// Human name of the entity, e.g. "project".
        entity: &'static str,
        /// Request path relative to the host.
        path: String,
    },

    /// An import identifier did not match the composite ID grammar.
    #[error("Invalid import ID '{id}': expected {expected}")]
    InvalidImportId {
        /// The identifier supplied by the user.
        id: String,
        /// The expected shape, e.g. `organizations/<organization_uuid>/projects/<project_uuid>`.
        expected: String,
    },

    /// An update touched attributes that can only change through replacement.
    #[error("{resource_type} cannot be updated in place; changing [{}] requires replacement", .attributes.join(", "))]
    ReplacementRequired {
        /// The resource type name.
        resource_type: String,
        /// Attribute paths whose change forces replacement.
        attributes: Vec<String>,
    },
}

fn request_body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(", body: {}", body),
        None => String::new(),
    }
}

impl ProviderError {
    /// Short title used as the diagnostic summary.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Resource not found",
            Self::Validation(_) => "Invalid configuration",
            Self::Configuration(_) => "Configuration error",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Serialization(_) => "Unable to convert state",
            Self::Transport { .. } => "Unable to reach the Lightdash API",
            Self::Api { .. } => "Lightdash API request failed",
            Self::Decode { .. } => "Unexpected Lightdash API response",
            Self::MissingIdentifier { .. } => "Missing identifier in Lightdash API response",
            Self::InvalidImportId { .. } => "Invalid import ID",
            Self::ReplacementRequired { .. } => "Update not supported",
        }
    }

    /// Whether the error means the remote entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api { status: 404, .. })
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert the error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.to_string())
    }

    pub(crate) fn replacement_required(
        resource_type: impl Into<String>,
        attributes: Vec<String>,
    ) -> Self {
        Self::ReplacementRequired {
            resource_type: resource_type.into(),
            attributes,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}
