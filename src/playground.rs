use serde_json::{json, Value};
use thiserror::Error;

use crate::catalog::{self, ModelCatalog, ModelEntry, TaskTemplate, DEFAULT_MODEL, TASKS};
use crate::credentials::Credentials;
use crate::request::{self, Mode, RequestDescription, GENERIC_SYSTEM_PROMPT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaygroundError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),
}

/// UI-side playground state: what the user picked and typed.
#[derive(Debug, Clone)]
pub struct Playground {
    mode: Mode,
    task: &'static TaskTemplate,
    pub prompt: String,
    pub image_url: String,
    pub model: String,
    catalog: ModelCatalog,
}

impl Default for Playground {
    fn default() -> Self {
        let task = &TASKS[0];
        Self {
            mode: Mode::Templates,
            task,
            prompt: task.default_prompt.to_string(),
            image_url: String::new(),
            model: task.model.to_string(),
            catalog: ModelCatalog::new(),
        }
    }
}

impl Playground {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn task(&self) -> &'static TaskTemplate {
        self.task
    }

    /// Select a template, loading its default prompt and model.
    pub fn select_task(&mut self, id: &str) -> Result<(), PlaygroundError> {
        let task =
            catalog::task_by_id(id).ok_or_else(|| PlaygroundError::UnknownTask(id.to_string()))?;
        self.task = task;
        self.prompt = task.default_prompt.to_string();
        self.model = task.model.to_string();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        match mode {
            Mode::Blank => {
                self.prompt.clear();
                self.model = self
                    .available_models()
                    .into_iter()
                    .next()
                    .map(|m| m.id)
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string());
            }
            Mode::Templates => {
                let first = &TASKS[0];
                self.task = first;
                self.prompt = first.default_prompt.to_string();
                self.model = first.model.to_string();
            }
        }
    }

    /// Replace the provider-reported model ids.
    pub fn set_live_models<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog = ModelCatalog::with_live(ids);
    }

    /// Models offered in the picker. Live ids only apply in blank mode.
    pub fn available_models(&self) -> Vec<ModelEntry> {
        match self.mode {
            Mode::Blank => self.catalog.entries(),
            Mode::Templates => ModelCatalog::static_entries(),
        }
    }

    fn image_url(&self) -> Option<&str> {
        Some(self.image_url.trim()).filter(|url| !url.is_empty())
    }

    fn task_for_mode(&self) -> Option<&'static TaskTemplate> {
        match self.mode {
            Mode::Templates => Some(self.task),
            Mode::Blank => None,
        }
    }

    /// The provider request the current state would produce.
    pub fn request_description(&self, credentials: &Credentials) -> RequestDescription {
        request::build(
            self.mode,
            self.task_for_mode(),
            &self.prompt,
            &self.model,
            self.image_url(),
            credentials,
        )
    }

    /// The gateway route and JSON body the UI posts for "generate".
    pub fn gateway_call(&self) -> (&'static str, Value) {
        if request::is_vision_request(self.mode, self.task_for_mode(), self.image_url()) {
            return (
                "/api/vision",
                json!({
                    "imageUrl": self.image_url.trim(),
                    "prompt": self.prompt,
                    "model": self.model,
                }),
            );
        }

        let system_prompt = match self.mode {
            Mode::Templates => self.task.system_prompt.unwrap_or(GENERIC_SYSTEM_PROMPT),
            Mode::Blank => GENERIC_SYSTEM_PROMPT,
        };
        (
            "/api/generate",
            json!({
                "prompt": self.prompt,
                "model": self.model,
                "systemPrompt": system_prompt,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    #[test]
    fn test_starts_on_first_template() {
        let pg = Playground::new();
        assert_eq!(pg.mode(), Mode::Templates);
        assert_eq!(pg.task().id, "chat");
        assert_eq!(pg.prompt, TASKS[0].default_prompt);
        assert_eq!(pg.model, TASKS[0].model);
    }

    #[test]
    fn test_select_task_is_idempotent() {
        let mut pg = Playground::new();
        pg.select_task("summarize").unwrap();
        let (prompt, model) = (pg.prompt.clone(), pg.model.clone());
        pg.select_task("summarize").unwrap();

        assert_eq!(pg.prompt, prompt);
        assert_eq!(pg.model, model);
        assert_eq!(model, "meta-llama/Llama-3.1-8B-Instruct");
    }

    #[test]
    fn test_select_unknown_task_keeps_state() {
        let mut pg = Playground::new();
        pg.prompt = "edited".into();
        assert_eq!(
            pg.select_task("nope"),
            Err(PlaygroundError::UnknownTask("nope".into()))
        );
        assert_eq!(pg.prompt, "edited");
        assert_eq!(pg.task().id, "chat");
    }

    #[test]
    fn test_blank_mode_prefers_live_models() {
        let mut pg = Playground::new();
        pg.set_live_models(["zai-org/GLM-4.5", "openai/gpt-oss-20b"]);
        pg.set_mode(Mode::Blank);

        assert!(pg.prompt.is_empty());
        assert_eq!(pg.model, "zai-org/GLM-4.5");
        assert_eq!(pg.available_models()[0].name, "GLM-4.5");
    }

    #[test]
    fn test_blank_mode_without_live_models_uses_static_catalog() {
        let mut pg = Playground::new();
        pg.set_mode(Mode::Blank);
        assert_eq!(pg.model, ModelCatalog::static_entries()[0].id);
    }

    #[test]
    fn test_templates_mode_resets_to_first_template() {
        let mut pg = Playground::new();
        pg.select_task("summarize").unwrap();
        pg.set_mode(Mode::Blank);
        pg.set_mode(Mode::Templates);

        assert_eq!(pg.task().id, TASKS[0].id);
        assert_eq!(pg.prompt, TASKS[0].default_prompt);
        assert_eq!(pg.model, TASKS[0].model);
    }

    #[test]
    fn test_gateway_call_generate() {
        let mut pg = Playground::new();
        pg.prompt = "Hi".into();
        let (path, body) = pg.gateway_call();

        assert_eq!(path, "/api/generate");
        assert_eq!(body["prompt"], "Hi");
        assert_eq!(
            body["systemPrompt"],
            "You are a helpful, friendly, and knowledgeable assistant."
        );

        pg.set_mode(Mode::Blank);
        pg.prompt = "Hi".into();
        let (_, body) = pg.gateway_call();
        assert_eq!(body["systemPrompt"], GENERIC_SYSTEM_PROMPT);
    }

    #[test]
    fn test_gateway_call_vision_needs_image() {
        let vision = TASKS
            .iter()
            .find(|t| t.category == Category::Vision)
            .unwrap();
        let mut pg = Playground::new();
        pg.select_task(vision.id).unwrap();

        assert_eq!(pg.gateway_call().0, "/api/generate");

        pg.image_url = " https://example.com/cat.png ".into();
        let (path, body) = pg.gateway_call();
        assert_eq!(path, "/api/vision");
        assert_eq!(body["imageUrl"], "https://example.com/cat.png");
        assert_eq!(body["model"], vision.model);
    }

    #[test]
    fn test_request_description_follows_state() {
        let creds = Credentials::new("abcd1234efgh", None).unwrap();
        let mut pg = Playground::new();
        pg.prompt = "Hi".into();

        let req = pg.request_description(&creds);
        let body = req.body.unwrap();
        assert_eq!(body.model, "openai/gpt-oss-120b");
        assert_eq!(body.max_tokens, Some(500));
    }
}
