use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::credentials::{resolve, CredentialError, CredentialSource, Credentials};

use super::errors::GatewayError;

/// Credentials supplied by the caller's headers, if any. Stored in request extensions.
#[derive(Debug, Clone)]
pub struct ClientCredentials(pub Option<Credentials>);

/// Credentials middleware: resolves caller headers and injects `ClientCredentials`.
///
/// Headers that are present but invalid are rejected here; absent headers pass
/// through so handlers can fall back to the server's default credentials.
pub async fn credentials_middleware(mut req: Request<Body>, next: Next) -> Response {
    match resolve(CredentialSource::Headers(req.headers())) {
        Ok(credentials) => {
            req.extensions_mut()
                .insert(ClientCredentials(Some(credentials)));
            next.run(req).await
        }
        Err(CredentialError::NotConfigured) => {
            req.extensions_mut().insert(ClientCredentials(None));
            next.run(req).await
        }
        Err(CredentialError::Invalid(errors)) => {
            debug!(errors = ?errors, "rejecting invalid caller credentials");
            GatewayError::Unauthorized {
                message: "Invalid credentials".to_string(),
                details: Some(errors.join("; ")),
            }
            .into_response()
        }
    }
}
