use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use directories::ProjectDirs;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::warn;

use super::resolver::{validate_legacy, Credentials};
use super::{CredentialError, StoreError};

/// File name of the persisted settings record.
pub const SETTINGS_FILE: &str = "wandb-settings.json";

/// Client-local persisted settings: one record, read, written and cleared as a unit.
pub trait SettingsStore: Send + Sync {
    /// Load the record. Absent, unreadable and invalid records are all "not configured".
    fn load(&self) -> Result<Credentials, CredentialError>;

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk shape. Older records carried a separate `team` next to `project`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    team: Option<String>,
}

impl StoredRecord {
    fn into_credentials(self) -> Result<Credentials, CredentialError> {
        match self.team {
            Some(team) => {
                let project = self.project.unwrap_or_default();
                let errors = validate_legacy(&self.api_key, &team, &project);
                if !errors.is_empty() {
                    return Err(CredentialError::Invalid(errors));
                }
                let qualifier = format!("{}/{}", team.trim(), project.trim());
                Credentials::new(&self.api_key, Some(&qualifier))
            }
            None => Credentials::new(&self.api_key, self.project.as_deref()),
        }
    }
}

/// Parse a stored record.
pub fn parse_record(raw: &str) -> Result<Credentials, CredentialError> {
    match serde_json::from_str::<StoredRecord>(raw) {
        Ok(record) => record.into_credentials(),
        Err(e) => {
            warn!(error = %e, "failed to parse stored settings");
            Err(CredentialError::NotConfigured)
        }
    }
}

/// JSON file store, written atomically.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the platform config directory.
    pub fn default_location() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("ai", "wandb", "inference-playground")
            .ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(dirs.config_dir().join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Credentials, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::NotConfigured);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read stored settings");
                return Err(CredentialError::NotConfigured);
            }
        };
        parse_record(&raw)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(credentials)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file.write_all(contents.as_bytes()).map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|e| write_err(e.error))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-memory store holding the serialized record.
#[derive(Default)]
pub struct MemorySettingsStore {
    record: Mutex<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw record, as if written by another client.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(raw.into())),
        }
    }

    fn record(&self) -> MutexGuard<'_, Option<String>> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Credentials, CredentialError> {
        match self.record().as_deref() {
            Some(raw) => parse_record(raw),
            None => Err(CredentialError::NotConfigured),
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let raw = serde_json::to_string(credentials)?;
        *self.record() = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record() = None;
        Ok(())
    }
}
