pub mod wandb;

pub use wandb::{WandbInference, WandbInferenceConfig};

use crate::credentials::Credentials;

/// Backend trait for OpenAI-compatible inference providers.
pub trait Backend: Send + Sync {
    /// Human-readable name for this backend.
    fn name(&self) -> &str;

    /// Base URL for API requests.
    fn base_url(&self) -> &str;

    /// Add the caller's credentials to an outgoing request.
    fn authorize_request(
        &self,
        headers: &mut http::HeaderMap,
        credentials: &Credentials,
    ) -> Result<(), http::header::InvalidHeaderValue>;

    /// What features this backend supports.
    fn capabilities(&self) -> Capabilities;
}

/// Capabilities describes what features a backend supports.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub chat_completions: bool,
    pub vision: bool,
    pub models: bool,
}
