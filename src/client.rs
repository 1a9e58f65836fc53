//! Transport to the Lightdash REST API.
//!
//! [`ApiClient`] is the single handle every reconciler shares: base URL,
//! token and an HTTP client. Each call issues exactly one request, with no
//! retries. Successful responses carry the Lightdash envelope
//! `{"status": "ok", "results": ...}`; failures are returned verbatim, wrapped
//! with the method, path and (redacted) request body.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::error::ProviderError;

const USER_AGENT: &str = concat!("lightdash-provider/", env!("CARGO_PKG_VERSION"));

/// Keys whose values are replaced before a request body is echoed in an error.
const SECRET_KEYS: &[&str] = &[
    "personal_access_token",
    "personalAccessToken",
    "keyfileContents",
    "keyfile_contents",
    "token",
    "password",
    "privateKey",
];

/// Shared, immutable handle to one Lightdash instance.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    results: T,
}

impl ApiClient {
    /// Build a client from resolved provider configuration.
    pub fn new(config: &ResolvedConfig) -> Result<Self, ProviderError> {
        Self::from_parts(config.host.as_str(), config.token.clone())
    }

    /// Build a client from a base URL and token.
    pub fn from_parts(base_url: &str, token: impl Into<String>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the envelope's `results`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let body = self.execute(Method::GET, path, None).await?;
        decode(path, &body)
    }

    /// POST a JSON body to `path` and decode the envelope's `results`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::POST, path, Some(payload)).await?;
        decode(path, &body)
    }

    /// PATCH a JSON body to `path` and decode the envelope's `results`.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::PATCH, path, Some(payload)).await?;
        decode(path, &body)
    }

    /// POST a JSON body to `path`, ignoring the response body.
    pub async fn post_no_content<B>(&self, path: &str, body: &B) -> Result<(), ProviderError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        self.execute(Method::POST, path, Some(payload)).await?;
        Ok(())
    }

    /// PATCH a JSON body to `path`, ignoring the response body.
    pub async fn patch_no_content<B>(&self, path: &str, body: &B) -> Result<(), ProviderError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        self.execute(Method::PATCH, path, Some(payload)).await?;
        Ok(())
    }

    /// DELETE `path`, ignoring the response body.
    pub async fn delete(&self, path: &str) -> Result<(), ProviderError> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, path, "Sending Lightdash API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, format!("ApiKey {}", self.token))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(payload) = &payload {
            request = request.json(payload);
        }

        let transport = |source| ProviderError::Transport {
            method: method.to_string(),
            path: path.to_string(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(method = %method, path, status = status.as_u16(), "Lightdash API responded");

        if !status.is_success() {
            return Err(ProviderError::Api {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
                request_body: payload.map(|p| redact(p).to_string()),
            });
        }

        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.results)
        .map_err(|source| ProviderError::Decode {
            path: path.to_string(),
            body: body.to_string(),
            source,
        })
}

/// Pull `error.message` out of a Lightdash error envelope, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Replace the values of secret-bearing keys, at any depth.
pub(crate) fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if SECRET_KEYS.contains(&k.as_str()) && !v.is_null() {
                        (k, Value::String("<redacted>".to_string()))
                    } else {
                        (k, redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        other => other,
    }
}
