use http::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::backend::Backend;
use crate::credentials::Credentials;
use crate::protocol::{ChatCompletion, ChatCompletionBody, ModelList};
use crate::request::{CHAT_COMPLETIONS_PATH, MODELS_PATH};

/// Failure talking to the inference provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid credential header: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Shown after a failed connection check when no project is set.
pub const PROJECT_TIP: &str =
    "Tip: Set project as entity_name/project_name to avoid defaulting to personal project";

/// Join an endpoint path onto the provider base URL, keeping the base path.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    Ok(url)
}

/// Provider client bound to one backend and a shared HTTP client.
pub struct Upstream<'a> {
    backend: &'a dyn Backend,
    http_client: &'a reqwest::Client,
}

impl<'a> Upstream<'a> {
    pub fn new(backend: &'a dyn Backend, http_client: &'a reqwest::Client) -> Self {
        Self {
            backend,
            http_client,
        }
    }

    /// Non-streaming chat completion.
    pub async fn chat_completion(
        &self,
        credentials: &Credentials,
        body: &ChatCompletionBody,
    ) -> Result<ChatCompletion, UpstreamError> {
        let resp = self
            .send(Method::POST, CHAT_COMPLETIONS_PATH, credentials, Some(body))
            .await?;
        read_json(resp).await
    }

    /// Streaming chat completion. Returns the response once headers arrive.
    pub async fn chat_stream(
        &self,
        credentials: &Credentials,
        body: &ChatCompletionBody,
    ) -> Result<reqwest::Response, UpstreamError> {
        self.send(Method::POST, CHAT_COMPLETIONS_PATH, credentials, Some(body))
            .await
    }

    pub async fn list_models(&self, credentials: &Credentials) -> Result<ModelList, UpstreamError> {
        let resp = self.send(Method::GET, MODELS_PATH, credentials, None).await?;
        read_json(resp).await
    }

    /// List models with the given credentials. On failure returns the
    /// messages to show the user, plus a hint when no project is set.
    pub async fn check_connection(&self, credentials: &Credentials) -> Result<usize, Vec<String>> {
        let err = match self.list_models(credentials).await {
            Ok(list) => return Ok(list.data.len()),
            Err(e) => e,
        };

        let mut messages = vec![match err {
            UpstreamError::Status { message, .. } => message,
            other => other.to_string(),
        }];
        if credentials.project.is_none() {
            messages.push(PROJECT_TIP.to_string());
        }
        Err(messages)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
        body: Option<&ChatCompletionBody>,
    ) -> Result<reqwest::Response, UpstreamError> {
        let upstream_url = endpoint_url(self.backend.base_url(), path)?;

        let mut req_builder = self
            .http_client
            .request(method, upstream_url)
            .header("content-type", "application/json");
        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let mut proxy_req = req_builder.build()?;
        self.backend
            .authorize_request(proxy_req.headers_mut(), credentials)?;

        let resp = self.http_client.execute(proxy_req).await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_summary(&error_text),
            });
        }

        Ok(resp)
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, UpstreamError> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))
}

/// Best-effort one-line summary of a provider error body.
pub fn error_summary(error_text: &str) -> String {
    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let summary = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .or_else(|| value.get("error").and_then(|v| v.as_str()))
                .or_else(|| value.get("message").and_then(|v| v.as_str()))
                .or_else(|| value.get("detail").and_then(|v| v.as_str()))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| trimmed.to_string());

    summary.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let got = endpoint_url("https://api.inference.wandb.ai/v1/", "/chat/completions").unwrap();
        assert_eq!(
            got.as_str(),
            "https://api.inference.wandb.ai/v1/chat/completions"
        );

        let got = endpoint_url("http://127.0.0.1:8080", "models").unwrap();
        assert_eq!(got.as_str(), "http://127.0.0.1:8080/models");
    }

    #[test]
    fn test_endpoint_drops_base_query() {
        let got = endpoint_url("https://api.inference.wandb.ai/v1?region=eu", "/models").unwrap();
        assert_eq!(got.as_str(), "https://api.inference.wandb.ai/v1/models");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(endpoint_url("://bad", "/models").is_err());
    }

    #[test]
    fn test_error_summary_variants() {
        assert_eq!(
            error_summary(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#),
            "Invalid API key"
        );
        assert_eq!(error_summary(r#"{"error":"quota exceeded"}"#), "quota exceeded");
        assert_eq!(error_summary(r#"{"detail":"model not found"}"#), "model not found");
        assert_eq!(error_summary("  Bad\n  Gateway "), "Bad Gateway");
        assert_eq!(error_summary(""), "<empty>");
    }
}
