use http::HeaderMap;
use serde::{Deserialize, Serialize};

use super::{CredentialError, SettingsStore};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "X-WandB-API-Key";

/// Header carrying the `entity/project` qualifier, both inbound and upstream.
pub const PROJECT_HEADER: &str = "OpenAI-Project";

const MIN_API_KEY_LEN: usize = 10;

/// API credentials for the inference provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

// Keep the raw key out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &crate::codegen::mask_api_key(&self.api_key))
            .field("project", &self.project)
            .finish()
    }
}

impl Credentials {
    /// Build credentials after trimming and validating the raw inputs.
    ///
    /// Two empty inputs mean nothing was configured rather than a bad value.
    pub fn new(api_key: &str, project: Option<&str>) -> Result<Self, CredentialError> {
        let blank = api_key.trim().is_empty() && project.is_none_or(|p| p.trim().is_empty());
        if blank {
            return Err(CredentialError::NotConfigured);
        }
        Self::supplied(api_key, project)
    }

    /// Build credentials the caller explicitly supplied. Empty input is invalid.
    pub fn supplied(api_key: &str, project: Option<&str>) -> Result<Self, CredentialError> {
        let api_key = api_key.trim();
        let project = project.map(str::trim).filter(|p| !p.is_empty());

        let errors = validate(api_key, project);
        if !errors.is_empty() {
            return Err(CredentialError::Invalid(errors));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            project: project.map(str::to_string),
        })
    }
}

/// Where credentials are read from.
pub enum CredentialSource<'a> {
    Headers(&'a HeaderMap),
    Store(&'a dyn SettingsStore),
}

/// Resolve credentials from a source. Validation failures come back as data.
pub fn resolve(source: CredentialSource<'_>) -> Result<Credentials, CredentialError> {
    match source {
        CredentialSource::Headers(headers) => from_headers(headers),
        CredentialSource::Store(store) => store.load(),
    }
}

/// True when the store holds a complete, valid record.
pub fn is_configured(store: &dyn SettingsStore) -> bool {
    resolve(CredentialSource::Store(store)).is_ok()
}

// A present credential header counts as supplied, even when blank or unreadable,
// so it never falls through to the server's own credentials.
fn from_headers(headers: &HeaderMap) -> Result<Credentials, CredentialError> {
    if !headers.contains_key(API_KEY_HEADER) && !headers.contains_key(PROJECT_HEADER) {
        return Err(CredentialError::NotConfigured);
    }

    let mut errors = Vec::new();
    let api_key = header_str(headers, API_KEY_HEADER, "API Key", &mut errors);
    let project = header_str(headers, PROJECT_HEADER, "Project", &mut errors);
    if !errors.is_empty() {
        return Err(CredentialError::Invalid(errors));
    }

    Credentials::supplied(api_key.unwrap_or_default(), project)
}

fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    let value = headers.get(name)?;
    match value.to_str() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(format!("{label} header must be visible ASCII text"));
            None
        }
    }
}

/// Validate an API key and optional project qualifier.
pub fn validate(api_key: &str, project: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();

    let api_key = api_key.trim();
    if api_key.is_empty() {
        errors.push("API Key is required".to_string());
    } else if api_key.chars().count() < MIN_API_KEY_LEN {
        errors.push("API Key appears to be invalid (too short)".to_string());
    }

    if let Some(project) = project.map(str::trim).filter(|p| !p.is_empty()) {
        if !project.contains('/') {
            errors.push("Project must be in the format entity_name/project_name".to_string());
        }
    }

    errors
}

/// Validate the older separate team/project pair.
pub fn validate_legacy(api_key: &str, team: &str, project: &str) -> Vec<String> {
    let mut errors = validate(api_key, None);

    for (label, value) in [("Team", team), ("Project", project)] {
        let value = value.trim();
        if value.is_empty() {
            errors.push(format!("{label} is required"));
        } else if !is_slug(value) {
            errors.push(format!(
                "{label} may only contain letters, numbers, '_' or '-'"
            ));
        }
    }

    errors
}

fn is_slug(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
