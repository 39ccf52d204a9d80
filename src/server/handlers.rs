use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

use crate::backend::Backend;
use crate::catalog::models::MODEL_GROUPS;
use crate::catalog::{self, Category, ModelCatalog, ModelEntry, TaskTemplate, TASKS};
use crate::codegen;
use crate::credentials::Credentials;
use crate::protocol::{
    ChatCompletionBody, ChatMessage, ChatRequest, ExportAction, ExportRequest, ExportResponse,
    GenerateRequest, HealthResponse, ModelsResponse, TextResponse, VisionRequest,
};
use crate::request::{
    self, Mode, RequestDescription, DEFAULT_TEMPERATURE, EXTENDED_MAX_TOKENS,
    GENERIC_SYSTEM_PROMPT, TEMPLATE_MAX_TOKENS,
};

use super::errors::GatewayError;
use super::middleware::ClientCredentials;
use super::proxy::{Upstream, UpstreamError};
use super::stream;

/// Model used by generate and chat when the caller names none.
pub const DEFAULT_CHAT_MODEL: &str = "moonshotai/Kimi-K2-Instruct";
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/Llama-4-Scout-17B-16E-Instruct";
pub const DEFAULT_VISION_PROMPT: &str = "Describe this image in detail.";
pub const NO_RESPONSE_TEXT: &str = "No response generated";

/// Header a caller sets to `1` to bypass caches on the model list.
pub const NO_CACHE_HEADER: &str = "X-No-Cache";

/// Shared application state.
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub http_client: reqwest::Client,
    /// Used when the caller sends no credential headers.
    pub default_credentials: Option<Credentials>,
    pub models_cache_max_age: u64,
}

impl AppState {
    fn upstream(&self) -> Upstream<'_> {
        Upstream::new(self.backend.as_ref(), &self.http_client)
    }

    fn credentials_for(&self, client: &ClientCredentials) -> Result<Credentials, GatewayError> {
        client
            .0
            .clone()
            .or_else(|| self.default_credentials.clone())
            .ok_or_else(|| GatewayError::Unauthorized {
                message: "API key is required".to_string(),
                details: None,
            })
    }
}

fn upstream_failure(
    backend: &dyn Backend,
    context: &'static str,
    source: UpstreamError,
) -> GatewayError {
    error!(backend = backend.name(), error = %source, "{context}");
    GatewayError::Upstream { context, source }
}

/// Health check handler.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: Some(state.backend.name().to_string()),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesResponse {
    pub templates: &'static [TaskTemplate],
    pub categories: Vec<CategoryTasks>,
    pub models: Vec<ModelEntry>,
    pub model_groups: Vec<ModelGroup>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTasks {
    pub category: Category,
    pub task_ids: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct ModelGroup {
    pub label: &'static str,
    pub models: Vec<ModelEntry>,
}

/// Task template and static model catalogs.
pub async fn templates() -> Json<TemplatesResponse> {
    let categories = Category::ALL
        .into_iter()
        .map(|category| CategoryTasks {
            category,
            task_ids: catalog::tasks_by_category(category).map(|t| t.id).collect(),
        })
        .collect();

    let model_groups = MODEL_GROUPS
        .iter()
        .map(|&(label, models)| ModelGroup {
            label,
            models: models
                .iter()
                .map(|(id, name)| ModelEntry {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        })
        .collect();

    Json(TemplatesResponse {
        templates: &TASKS,
        categories,
        models: ModelCatalog::static_entries(),
        model_groups,
    })
}

/// Single non-streaming completion.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientCredentials>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, GatewayError> {
    let Json(req) = payload?;
    if req.prompt.trim().is_empty() {
        return Err(GatewayError::bad_request("Prompt is required"));
    }
    let credentials = state.credentials_for(&client)?;

    let body = ChatCompletionBody {
        model: req.model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        messages: vec![
            ChatMessage::system(
                req.system_prompt
                    .unwrap_or_else(|| GENERIC_SYSTEM_PROMPT.to_string()),
            ),
            ChatMessage::user(req.prompt),
        ],
        temperature: Some(req.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
        max_tokens: Some(req.max_tokens.unwrap_or(TEMPLATE_MAX_TOKENS)),
        stream: None,
    };

    complete(&state, &credentials, &body, "Failed to generate text").await
}

/// Image + prompt completion.
pub async fn vision(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientCredentials>,
    payload: Result<Json<VisionRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, GatewayError> {
    let Json(req) = payload?;
    let image_url = match req.image_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Err(GatewayError::bad_request("Image URL is required")),
    };
    let credentials = state.credentials_for(&client)?;

    let messages = match req.messages {
        Some(messages) if !messages.is_empty() => messages,
        _ => {
            let prompt = req
                .prompt
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_VISION_PROMPT.to_string());
            vec![ChatMessage::user_with_image(prompt, image_url)]
        }
    };

    let body = ChatCompletionBody {
        model: req.model.unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        messages,
        temperature: Some(DEFAULT_TEMPERATURE),
        max_tokens: Some(EXTENDED_MAX_TOKENS),
        stream: None,
    };

    complete(&state, &credentials, &body, "Failed to process vision request").await
}

async fn complete(
    state: &AppState,
    credentials: &Credentials,
    body: &ChatCompletionBody,
    context: &'static str,
) -> Result<Json<TextResponse>, GatewayError> {
    let completion = state
        .upstream()
        .chat_completion(credentials, body)
        .await
        .map_err(|e| upstream_failure(state.backend.as_ref(), context, e))?;

    let text = completion
        .first_content()
        .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string());
    Ok(Json(TextResponse { text }))
}

/// Streaming chat: relays provider deltas as `data:` events.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientCredentials>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(req) = payload?;
    if req.messages.is_empty() {
        return Err(GatewayError::bad_request("Messages are required"));
    }
    let credentials = state.credentials_for(&client)?;

    let body = ChatCompletionBody {
        model: req.model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        messages: req.messages,
        temperature: Some(DEFAULT_TEMPERATURE),
        max_tokens: Some(EXTENDED_MAX_TOKENS),
        stream: Some(true),
    };

    let upstream = state
        .upstream()
        .chat_stream(&credentials, &body)
        .await
        .map_err(|e| {
            upstream_failure(state.backend.as_ref(), "Failed to process chat request", e)
        })?;

    info!(model = %body.model, "relaying chat stream");
    Ok(stream::relay(upstream))
}

/// Provider model catalog, cacheable unless the caller opts out.
pub async fn models(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientCredentials>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let credentials = state.credentials_for(&client)?;

    let list = state
        .upstream()
        .list_models(&credentials)
        .await
        .map_err(|e| upstream_failure(state.backend.as_ref(), "Failed to fetch models", e))?;

    let no_cache = headers
        .get(NO_CACHE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "1");

    let mut response = Json(ModelsResponse { models: list.data }).into_response();
    let response_headers = response.headers_mut();
    if no_cache {
        response_headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        );
        response_headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        response_headers.insert(EXPIRES, HeaderValue::from_static("0"));
    } else {
        let directive = format!("public, max-age={}", state.models_cache_max_age);
        if let Ok(value) = HeaderValue::from_str(&directive) {
            response_headers.insert(CACHE_CONTROL, value);
        }
    }

    Ok(response)
}

/// Render the equivalent request as shell, Python and TypeScript code.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientCredentials>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Json<ExportResponse>, GatewayError> {
    let Json(req) = payload?;
    let description = describe_export(&req, &state.credentials_for(&client)?)?;
    Ok(Json(codegen::render_all(state.backend.base_url(), &description)))
}

fn describe_export(
    req: &ExportRequest,
    credentials: &Credentials,
) -> Result<RequestDescription, GatewayError> {
    if req.action == ExportAction::ListModels {
        return Ok(RequestDescription::list_models(credentials));
    }

    let task = match req.task_id.as_deref() {
        Some(id) => Some(
            catalog::task_by_id(id)
                .ok_or_else(|| GatewayError::bad_request(format!("Unknown task: {id}")))?,
        ),
        None if req.mode == Mode::Templates => TASKS.first(),
        None => None,
    };
    if req.prompt.trim().is_empty() {
        return Err(GatewayError::bad_request("Prompt is required"));
    }

    let model = req
        .model
        .as_deref()
        .or(task.map(|t| t.model))
        .unwrap_or(catalog::DEFAULT_MODEL);

    Ok(request::build(
        req.mode,
        task,
        &req.prompt,
        model,
        req.image_url.as_deref(),
        credentials,
    ))
}
