use serde::Serialize;

/// Fallback model when nothing else is available.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

/// A model id paired with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
}

/// Static model groups shown in the templates sidebar.
pub static MODEL_GROUPS: &[(&str, &[(&str, &str)])] = &[
    (
        "TEXT_GENERATION",
        &[
            ("openai/gpt-oss-20b", "GPT OSS 20B"),
            ("openai/gpt-oss-120b", "GPT OSS 120B"),
            ("meta-llama/Llama-3.3-70B-Instruct", "Llama 3.3 70B"),
            ("meta-llama/Llama-3.1-8B-Instruct", "Llama 3.1 8B"),
            ("moonshotai/Kimi-K2-Instruct", "Kimi K2 Instruct"),
            ("microsoft/Phi-4-mini-instruct", "Phi-4 Mini"),
        ],
    ),
    (
        "REASONING",
        &[
            ("deepseek-ai/DeepSeek-R1-0528", "DeepSeek R1"),
            ("deepseek-ai/DeepSeek-V3-0324", "DeepSeek V3"),
            ("Qwen/Qwen3-235B-A22B-Thinking-2507", "Qwen3 235B Thinking"),
            ("Qwen/Qwen3-235B-A22B-Instruct-2507", "Qwen3 235B Instruct"),
        ],
    ),
    (
        "CODE",
        &[
            ("Qwen/Qwen3-Coder-480B-A35B-Instruct", "Qwen3 Coder 480B"),
            ("deepseek-ai/DeepSeek-V3-0324", "DeepSeek V3"),
        ],
    ),
    (
        "VISION",
        &[(
            "meta-llama/Llama-4-Scout-17B-16E-Instruct",
            "Llama 4 Scout Vision",
        )],
    ),
];

/// Flat model list, in selector order.
pub static ALL_MODELS: &[(&str, &str)] = &[
    ("openai/gpt-oss-20b", "GPT OSS 20B"),
    ("openai/gpt-oss-120b", "GPT OSS 120B"),
    ("Qwen/Qwen3-235B-A22B-Instruct-2507", "Qwen3 235B Instruct"),
    ("deepseek-ai/DeepSeek-R1-0528", "DeepSeek R1"),
    ("deepseek-ai/DeepSeek-V3-0324", "DeepSeek V3"),
    (
        "meta-llama/Llama-4-Scout-17B-16E-Instruct",
        "Llama 4 Scout Vision",
    ),
    ("meta-llama/Llama-3.3-70B-Instruct", "Llama 3.3 70B"),
    ("moonshotai/Kimi-K2-Instruct", "Kimi K2 Instruct"),
    ("Qwen/Qwen3-235B-A22B-Thinking-2507", "Qwen3 235B Thinking"),
    ("meta-llama/Llama-3.1-8B-Instruct", "Llama 3.1 8B"),
    ("Qwen/Qwen3-Coder-480B-A35B-Instruct", "Qwen3 Coder 480B"),
    ("microsoft/Phi-4-mini-instruct", "Phi-4 Mini"),
];

/// Display name for a model id, falling back to the id's last path segment.
pub fn display_name(id: &str) -> String {
    ALL_MODELS
        .iter()
        .find(|(model_id, _)| *model_id == id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| short_name(id).to_string())
}

fn short_name(id: &str) -> &str {
    match id.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => id,
    }
}

/// Model choices: the static table, or a live list fetched from the provider.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    live: Vec<String>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog backed by live model ids from the provider.
    pub fn with_live<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            live: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_live(&self) -> bool {
        !self.live.is_empty()
    }

    /// Static entries.
    pub fn static_entries() -> Vec<ModelEntry> {
        ALL_MODELS
            .iter()
            .map(|(id, name)| ModelEntry {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    /// Live entries when present; their display names are the id's last segment.
    pub fn entries(&self) -> Vec<ModelEntry> {
        if !self.has_live() {
            return Self::static_entries();
        }
        self.live
            .iter()
            .map(|id| ModelEntry {
                id: id.clone(),
                name: short_name(id).to_string(),
            })
            .collect()
    }
}
