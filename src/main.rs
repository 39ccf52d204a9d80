mod backend;
mod catalog;
mod codegen;
mod config;
mod credentials;
mod playground;
mod protocol;
mod request;
mod server;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use backend::{Backend, WandbInference, WandbInferenceConfig};
use config::{normalize_addr, Command, Config, ExportArgs, SettingsCommand};
use credentials::{
    is_configured, resolve, CredentialError, CredentialSource, Credentials, FileSettingsStore,
    SettingsStore,
};
use playground::Playground;
use request::{Mode, RequestDescription};
use server::proxy::Upstream;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Logs go to stderr so exported code on stdout stays clean.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let result = match &config.command {
        None | Some(Command::Serve) => {
            serve(&config).await;
            Ok(())
        }
        Some(Command::Settings(cmd)) => settings(&config, cmd).await,
        Some(Command::Export(args)) => export(&config, args),
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn serve(config: &Config) {
    let store = match settings_store(config) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "settings store unavailable, relying on caller credentials");
            None
        }
    };

    let default_credentials =
        match default_credentials(config, store.as_ref().map(|s| s as &dyn SettingsStore)) {
            Ok(creds) => creds,
            Err(e) => {
                error!(errors = ?e.messages(), "invalid server credentials");
                std::process::exit(1);
            }
        };

    match &default_credentials {
        Some(creds) => info!(project = ?creds.project, "default credentials configured"),
        None => info!("no default credentials, callers must send their own"),
    }

    let backend = Arc::new(backend(config));

    info!(
        backend = backend.name(),
        base_url = backend.base_url(),
        "using backend"
    );

    let http_client = match http_client() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let app = server::build_router(
        backend,
        http_client,
        default_credentials,
        config.models_cache_max_age,
    );

    let addr = normalize_addr(&config.addr);
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!(addr = addr, error = %e, "failed to bind");
        std::process::exit(1);
    });

    info!(addr = addr, "server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "server error");
            std::process::exit(1);
        });

    info!("server stopped");
}

fn backend(config: &Config) -> WandbInference {
    WandbInference::new(WandbInferenceConfig {
        base_url: Some(config.base_url.clone()),
    })
}

/// HTTP client for the provider: connection pool limits, connect timeout.
fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .build()
}

fn settings_store(config: &Config) -> Result<FileSettingsStore, credentials::StoreError> {
    match &config.settings_path {
        Some(path) => Ok(FileSettingsStore::new(path.clone())),
        None => FileSettingsStore::default_location(),
    }
}

/// Server-side credentials: flags and env first, then the persisted record.
fn default_credentials(
    config: &Config,
    store: Option<&dyn SettingsStore>,
) -> Result<Option<Credentials>, CredentialError> {
    if config.api_key.is_some() || config.project.is_some() {
        if config.api_key.is_some() && std::env::var("WANDB_API_KEY").is_err() {
            warn!("API key provided via command-line flag - use WANDB_API_KEY env var in production");
        }
        match Credentials::new(
            config.api_key.as_deref().unwrap_or_default(),
            config.project.as_deref(),
        ) {
            Ok(creds) => return Ok(Some(creds)),
            Err(CredentialError::NotConfigured) => {}
            Err(e) => return Err(e),
        }
    }

    let Some(store) = store else {
        return Ok(None);
    };
    match resolve(CredentialSource::Store(store)) {
        Ok(creds) => Ok(Some(creds)),
        Err(CredentialError::NotConfigured) => Ok(None),
        Err(e) => {
            warn!(errors = ?e.messages(), "ignoring invalid stored settings");
            Ok(None)
        }
    }
}

async fn settings(config: &Config, cmd: &SettingsCommand) -> Result<(), Box<dyn Error>> {
    let store = settings_store(config)?;

    match cmd {
        SettingsCommand::Show => {
            println!("settings:   {}", store.path().display());
            println!("configured: {}", is_configured(&store));
            match store.load() {
                Ok(creds) => {
                    println!("api key:    {}", codegen::mask_api_key(&creds.api_key));
                    println!("project:    {}", creds.project.as_deref().unwrap_or("(none)"));
                }
                Err(e) => {
                    for message in e.messages() {
                        println!("invalid:    {message}");
                    }
                }
            }
        }
        SettingsCommand::Set {
            api_key,
            project,
            verify,
        } => {
            let creds = Credentials::supplied(api_key, project.as_deref())?;
            if *verify {
                check_connection(config, &creds).await?;
            }
            store.save(&creds)?;
            info!(path = %store.path().display(), "settings saved");
        }
        SettingsCommand::Test => {
            let creds = default_credentials(config, Some(&store))?
                .ok_or("API key is required: run `inference-playground settings set --api-key <KEY>`")?;
            check_connection(config, &creds).await?;
        }
        SettingsCommand::Clear => {
            store.clear()?;
            info!(path = %store.path().display(), "settings cleared");
        }
    }

    Ok(())
}

/// List models with the given credentials and report the outcome.
async fn check_connection(config: &Config, creds: &Credentials) -> Result<(), Box<dyn Error>> {
    let backend = backend(config);
    let http_client = http_client()?;
    match Upstream::new(&backend, &http_client)
        .check_connection(creds)
        .await
    {
        Ok(count) => {
            println!("connection ok: {count} models available");
            Ok(())
        }
        Err(messages) => {
            for message in &messages {
                println!("failed:     {message}");
            }
            Err(format!("connection test failed: {}", messages.join("; ")).into())
        }
    }
}

fn export(config: &Config, args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    let store = settings_store(config)?;
    let creds = default_credentials(config, Some(&store))?.ok_or(
        "API key is required: run `inference-playground settings set --api-key <KEY>`",
    )?;

    let description = if args.list_models {
        RequestDescription::list_models(&creds)
    } else {
        let mut playground = Playground::new();
        match (args.mode(), &args.task) {
            (Mode::Blank, _) => playground.set_mode(Mode::Blank),
            (Mode::Templates, Some(task)) => playground.select_task(task)?,
            (Mode::Templates, None) => {}
        }
        if let Some(prompt) = &args.prompt {
            playground.prompt = prompt.clone();
        }
        if let Some(model) = &args.model {
            playground.model = model.clone();
        }
        if let Some(image_url) = &args.image_url {
            playground.image_url = image_url.clone();
        }
        if playground.prompt.trim().is_empty() {
            return Err("Prompt is required".into());
        }
        playground.request_description(&creds)
    };

    let targets = args.target.targets();
    for (i, target) in targets.iter().enumerate() {
        if targets.len() > 1 {
            if i > 0 {
                println!();
            }
            match &description.body {
                Some(body) => println!(
                    "# --- {} ({}) ---",
                    target.label(),
                    catalog::display_name(&body.model)
                ),
                None => println!("# --- {} ---", target.label()),
            }
        }
        println!(
            "{}",
            codegen::render_with_base_url(&config.base_url, &description, *target)
        );
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
