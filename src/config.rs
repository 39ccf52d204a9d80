use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::codegen::{Target, DEFAULT_BASE_URL};
use crate::request::Mode;

/// Inference Playground: gateway and tooling for OpenAI-compatible hosted inference.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Listen address (e.g. ":3000" or "0.0.0.0:3000")
    #[arg(long, default_value = ":3000", env = "ADDR", global = true)]
    pub addr: String,

    /// Log format: "text" or "json"
    #[arg(long, default_value = "text", env = "LOG_FORMAT", global = true)]
    pub log_format: String,

    /// Provider API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "WANDB_BASE_URL", global = true)]
    pub base_url: String,

    /// Server-side API key used when callers send none
    #[arg(long, env = "WANDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Project qualifier (entity/project) paired with --api-key
    #[arg(long, env = "WANDB_PROJECT")]
    pub project: Option<String>,

    /// Settings file location (defaults to the platform config directory)
    #[arg(long, env = "SETTINGS_PATH", global = true)]
    pub settings_path: Option<PathBuf>,

    /// Cache lifetime in seconds advertised for the model list
    #[arg(long, default_value_t = 300, env = "MODELS_CACHE_MAX_AGE", global = true)]
    pub models_cache_max_age: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP gateway (default)
    Serve,

    /// Manage the persisted credentials record
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Print code for a provider request built from the stored credentials
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show the stored record with the key masked
    Show,

    /// Validate and store credentials
    Set {
        #[arg(long)]
        api_key: String,

        /// entity/project qualifier
        #[arg(long)]
        project: Option<String>,

        /// List models with the new credentials before saving them
        #[arg(long)]
        verify: bool,
    },

    /// Check the configured credentials against the provider
    Test,

    /// Remove the stored record
    Clear,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Task template id
    #[arg(long, conflicts_with = "blank")]
    pub task: Option<String>,

    /// Blank mode: generic system prompt, no template
    #[arg(long)]
    pub blank: bool,

    /// Prompt text (defaults to the template's default prompt)
    #[arg(long)]
    pub prompt: Option<String>,

    /// Model id (defaults to the template's model)
    #[arg(long)]
    pub model: Option<String>,

    /// Image URL for vision templates
    #[arg(long)]
    pub image_url: Option<String>,

    /// Which code to print
    #[arg(long, value_enum, default_value_t = ExportTarget::All)]
    pub target: ExportTarget,

    /// Render the model-listing call instead of a chat completion
    #[arg(long)]
    pub list_models: bool,
}

impl ExportArgs {
    pub fn mode(&self) -> Mode {
        if self.blank {
            Mode::Blank
        } else {
            Mode::Templates
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Shell,
    Python,
    #[value(name = "typescript")]
    TypeScript,
    All,
}

impl ExportTarget {
    pub fn targets(self) -> &'static [Target] {
        match self {
            ExportTarget::Shell => &[Target::Shell],
            ExportTarget::Python => &[Target::Python],
            ExportTarget::TypeScript => &[Target::TypeScript],
            ExportTarget::All => &Target::ALL,
        }
    }
}

/// Convert Go-style ":3000" to "0.0.0.0:3000".
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}
