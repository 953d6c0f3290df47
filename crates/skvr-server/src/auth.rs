use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine as _;

use crate::state::AppState;

const CHALLENGE: &str = "Basic realm=\"Restricted\"";

/// Credential verification capability for the auth gate.
///
/// The gate only extracts and sanity-checks the Basic credentials; deciding
/// whether a pair is valid is delegated here, so a real backend (file,
/// database, external service) can be substituted without touching the
/// gate logic.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> bool;
}

/// Verifier backed by a single fixed credential pair.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Auth gate middleware. Applied only when credentials are configured;
/// rejects with 401 and a `WWW-Authenticate` challenge when the request
/// carries no Basic credentials, blank fields, or a pair the verifier
/// does not accept.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(verifier) = state.verifier.clone() else {
        return next.run(request).await;
    };
    let Some((username, password)) = basic_credentials(request.headers()) else {
        return unauthorized();
    };
    if username.trim().is_empty() || password.trim().is_empty() {
        return unauthorized();
    }
    if !verifier.verify(&username, &password).await {
        tracing::warn!(username = %username, "rejected credentials");
        return unauthorized();
    }
    next.run(request).await
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, CHALLENGE)],
    )
        .into_response()
}
