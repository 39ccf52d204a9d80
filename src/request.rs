use http::Method;
use serde::Deserialize;

use crate::catalog::{Category, TaskTemplate};
use crate::credentials::{Credentials, PROJECT_HEADER};
use crate::protocol::{ChatCompletionBody, ChatMessage};

/// System prompt used in blank mode and when a template has none.
pub const GENERIC_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const TEMPLATE_MAX_TOKENS: u32 = 500;
pub const EXTENDED_MAX_TOKENS: u32 = 1000;

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
pub const MODELS_PATH: &str = "/models";

/// Playground mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Templates,
    Blank,
}

/// A provider request, described independently of how it is sent or rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescription {
    pub endpoint: &'static str,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<ChatCompletionBody>,
    pub credentials: Credentials,
}

impl RequestDescription {
    /// Description of the model-listing call.
    pub fn list_models(credentials: &Credentials) -> Self {
        Self {
            endpoint: MODELS_PATH,
            method: Method::GET,
            headers: provider_headers(credentials),
            body: None,
            credentials: credentials.clone(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Headers every provider request carries.
pub fn provider_headers(credentials: &Credentials) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        (
            "Authorization".to_string(),
            format!("Bearer {}", credentials.api_key),
        ),
    ];
    if let Some(project) = &credentials.project {
        headers.push((PROJECT_HEADER.to_string(), project.clone()));
    }
    headers
}

/// True when the request takes the vision path.
pub fn is_vision_request(mode: Mode, task: Option<&TaskTemplate>, image_url: Option<&str>) -> bool {
    mode == Mode::Templates
        && task.is_some_and(|t| t.category == Category::Vision)
        && image_url.is_some_and(|url| !url.trim().is_empty())
}

/// Build the chat-completion request for a playground action.
pub fn build(
    mode: Mode,
    task: Option<&TaskTemplate>,
    prompt: &str,
    model: &str,
    image_url: Option<&str>,
    credentials: &Credentials,
) -> RequestDescription {
    let body = match image_url.filter(|_| is_vision_request(mode, task, image_url)) {
        Some(url) => ChatCompletionBody {
            model: model.to_string(),
            messages: vec![ChatMessage::user_with_image(prompt, url.trim())],
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(EXTENDED_MAX_TOKENS),
            stream: None,
        },
        None => {
            let (system_prompt, max_tokens) = match mode {
                Mode::Templates => (
                    task.and_then(|t| t.system_prompt)
                        .unwrap_or(GENERIC_SYSTEM_PROMPT),
                    TEMPLATE_MAX_TOKENS,
                ),
                Mode::Blank => (GENERIC_SYSTEM_PROMPT, EXTENDED_MAX_TOKENS),
            };
            ChatCompletionBody {
                model: model.to_string(),
                messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)],
                temperature: Some(DEFAULT_TEMPERATURE),
                max_tokens: Some(max_tokens),
                stream: None,
            }
        }
    };

    RequestDescription {
        endpoint: CHAT_COMPLETIONS_PATH,
        method: Method::POST,
        headers: provider_headers(credentials),
        body: Some(body),
        credentials: credentials.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{task_by_id, TASKS};
    use crate::protocol::{ContentPart, MessageContent};
    use serde_json::json;

    fn creds(project: Option<&str>) -> Credentials {
        Credentials::new("abcd1234efgh", project).unwrap()
    }

    #[test]
    fn test_chat_template_body() {
        let task = task_by_id("chat").unwrap();
        let req = build(Mode::Templates, Some(task), "Hi", task.model, None, &creds(None));

        assert_eq!(req.endpoint, "/chat/completions");
        assert_eq!(req.method, Method::POST);
        assert_eq!(
            serde_json::to_value(req.body.as_ref().unwrap()).unwrap(),
            json!({
                "model": "openai/gpt-oss-120b",
                "messages": [
                    {"role": "system", "content": "You are a helpful, friendly, and knowledgeable assistant."},
                    {"role": "user", "content": "Hi"}
                ],
                "temperature": 0.7,
                "max_tokens": 500
            })
        );
    }

    #[test]
    fn test_non_vision_templates_have_system_then_user() {
        for task in TASKS.iter().filter(|t| t.category != Category::Vision) {
            let req = build(Mode::Templates, Some(task), "x", task.model, None, &creds(None));
            let body = req.body.unwrap();
            assert_eq!(body.messages.len(), 2, "{}", task.id);
            assert_eq!(body.messages[0].role, "system");
            assert_eq!(body.messages[1].role, "user");
            assert_eq!(body.max_tokens, Some(500));
        }
    }

    #[test]
    fn test_vision_template_with_image() {
        let task = task_by_id("image-analysis").unwrap();
        let req = build(
            Mode::Templates,
            Some(task),
            "Describe",
            task.model,
            Some("https://example.com/a.png"),
            &creds(None),
        );
        let body = req.body.unwrap();

        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.max_tokens, Some(1000));
        match &body.messages[0].content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(&parts[0], ContentPart::Text { text } if text == "Describe"));
                assert!(matches!(
                    &parts[1],
                    ContentPart::ImageUrl { image_url } if image_url.url == "https://example.com/a.png"
                ));
            }
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn test_vision_template_without_image_falls_back_to_chat() {
        let task = task_by_id("image-analysis").unwrap();
        let req = build(Mode::Templates, Some(task), "Describe", task.model, Some("  "), &creds(None));
        let body = req.body.unwrap();
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.max_tokens, Some(500));
    }

    #[test]
    fn test_blank_mode_uses_generic_prompt() {
        let task = task_by_id("image-analysis").unwrap();
        let req = build(
            Mode::Blank,
            Some(task),
            "Hello",
            "openai/gpt-oss-20b",
            Some("https://example.com/a.png"),
            &creds(None),
        );
        let body = req.body.unwrap();
        assert_eq!(body.messages[0], ChatMessage::system(GENERIC_SYSTEM_PROMPT));
        assert_eq!(body.max_tokens, Some(1000));
        assert_eq!(body.temperature, Some(0.7));
    }

    #[test]
    fn test_headers_include_project_when_set() {
        let req = build(Mode::Blank, None, "Hi", "m", None, &creds(Some("acme/demo")));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("Authorization"), Some("Bearer abcd1234efgh"));
        assert_eq!(req.header("OpenAI-Project"), Some("acme/demo"));

        let req = build(Mode::Blank, None, "Hi", "m", None, &creds(None));
        assert_eq!(req.header("OpenAI-Project"), None);
    }

    #[test]
    fn test_list_models_description() {
        let req = RequestDescription::list_models(&creds(None));
        assert_eq!(req.endpoint, "/models");
        assert_eq!(req.method, Method::GET);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_build_is_deterministic() {
        let task = task_by_id("translate").unwrap();
        let a = build(Mode::Templates, Some(task), "p", task.model, None, &creds(None));
        let b = build(Mode::Templates, Some(task), "p", task.model, None, &creds(None));
        assert_eq!(a, b);
    }
}
