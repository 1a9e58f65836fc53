//! Provider configuration.
//!
//! The provider block carries the Lightdash host and an API token. Either may
//! be omitted from configuration and supplied through the environment
//! instead.

use serde::Deserialize;
use url::Url;

use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Environment variable holding the Lightdash host URL.
pub const HOST_ENV_VAR: &str = "LIGHTDASH_URL";

/// Environment variable holding the Lightdash personal access token.
pub const TOKEN_ENV_VAR: &str = "LIGHTDASH_API_KEY";

/// Raw provider block as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Lightdash host, e.g. `https://app.lightdash.cloud`.
    #[serde(default)]
    pub host: Option<String>,
    /// Personal access token used for every request.
    #[serde(default)]
    pub token: Option<String>,
}

/// Configuration after environment fallbacks and validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Base URL of the Lightdash instance.
    pub host: Url,
    /// API token.
    pub token: String,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("host", &self.host.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Parse the provider block. `null` is treated as an empty block.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| ProviderError::Configuration(format!("invalid provider block: {}", e)))
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Configures access to a Lightdash instance.")
            .with_attribute(
                "host",
                Attribute::optional_string().with_description(format!(
                    "The Lightdash host URL. May also be provided via {}.",
                    HOST_ENV_VAR
                )),
            )
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "A Lightdash personal access token. May also be provided via {}.",
                        TOKEN_ENV_VAR
                    )),
            )
    }

    /// Apply environment fallbacks and validate, using the process environment.
    pub fn resolve(&self) -> Result<ResolvedConfig, Vec<Diagnostic>> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Apply fallbacks from `lookup` and validate.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedConfig, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |configured: &Option<String>, env_var: &str| {
            configured
                .clone()
                .or_else(|| lookup(env_var))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut diagnostics = Vec::new();

        let host = match pick(&self.host, HOST_ENV_VAR) {
            None => {
                diagnostics.push(
                    Diagnostic::error("Missing Lightdash host")
                        .with_detail(format!(
                            "Set the host attribute or the {} environment variable.",
                            HOST_ENV_VAR
                        ))
                        .with_attribute("host"),
                );
                None
            }
            Some(raw) => match parse_host(&raw) {
                Ok(url) => Some(url),
                Err(detail) => {
                    diagnostics.push(
                        Diagnostic::error("Invalid Lightdash host")
                            .with_detail(detail)
                            .with_attribute("host"),
                    );
                    None
                }
            },
        };

        let token = pick(&self.token, TOKEN_ENV_VAR);
        if token.is_none() {
            diagnostics.push(
                Diagnostic::error("Missing Lightdash API token")
                    .with_detail(format!(
                        "Set the token attribute or the {} environment variable.",
                        TOKEN_ENV_VAR
                    ))
                    .with_attribute("token"),
            );
        }

        match (host, token) {
            (Some(host), Some(token)) if diagnostics.is_empty() => Ok(ResolvedConfig { host, token }),
            _ => Err(diagnostics),
        }
    }
}

fn parse_host(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "'{}' uses unsupported scheme '{}'; expected http or https",
            raw, other
        )),
    }
}
