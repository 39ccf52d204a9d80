use http::header::{HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION};

use super::{Backend, Capabilities};
use crate::codegen::DEFAULT_BASE_URL;
use crate::credentials::Credentials;

/// W&B Inference backend configuration.
pub struct WandbInferenceConfig {
    pub base_url: Option<String>,
}

/// W&B Inference: OpenAI-compatible endpoints scoped by an optional project header.
pub struct WandbInference {
    base_url: String,
}

impl WandbInference {
    pub fn new(config: WandbInferenceConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        }
    }
}

impl Backend for WandbInference {
    fn name(&self) -> &str {
        "wandb"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize_request(
        &self,
        headers: &mut http::HeaderMap,
        credentials: &Credentials,
    ) -> Result<(), InvalidHeaderValue> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        if let Some(project) = &credentials.project {
            headers.insert(
                HeaderName::from_static("openai-project"),
                HeaderValue::from_str(project)?,
            );
        }
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            chat_completions: true,
            vision: true,
            models: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::PROJECT_HEADER;

    #[test]
    fn test_authorize_request_sets_bearer_and_project() {
        let backend = WandbInference::new(WandbInferenceConfig { base_url: None });
        let creds = Credentials::new("abcd1234efgh", Some("acme/demo")).unwrap();

        let mut headers = http::HeaderMap::new();
        backend.authorize_request(&mut headers, &creds).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abcd1234efgh");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(PROJECT_HEADER).unwrap(), "acme/demo");
        assert_eq!(backend.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_authorize_request_without_project() {
        let backend = WandbInference::new(WandbInferenceConfig {
            base_url: Some("http://127.0.0.1:9/v1".into()),
        });
        let creds = Credentials::new("abcd1234efgh", None).unwrap();

        let mut headers = http::HeaderMap::new();
        backend.authorize_request(&mut headers, &creds).unwrap();

        assert!(headers.get(PROJECT_HEADER).is_none());
        assert_eq!(backend.base_url(), "http://127.0.0.1:9/v1");
    }

    #[test]
    fn test_authorize_request_rejects_control_characters() {
        let backend = WandbInference::new(WandbInferenceConfig { base_url: None });
        let creds = Credentials {
            api_key: "abcd1234\nefgh".into(),
            project: None,
        };

        let mut headers = http::HeaderMap::new();
        assert!(backend.authorize_request(&mut headers, &creds).is_err());
    }
}
