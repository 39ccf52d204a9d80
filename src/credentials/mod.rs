pub mod errors;
pub mod resolver;
pub mod store;

pub use errors::{CredentialError, StoreError};
pub use resolver::{
    is_configured, resolve, validate, CredentialSource, Credentials, API_KEY_HEADER,
    PROJECT_HEADER,
};
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};
