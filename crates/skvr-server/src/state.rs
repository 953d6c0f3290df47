use std::sync::Arc;

use skvr_store::KvStore;

use crate::auth::CredentialVerifier;

/// Shared request-handling state: one store handle for the process
/// lifetime, the configured fallback identifiers, and the optional
/// credential verifier for the auth gate.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub default_namespace: String,
    pub default_key: String,
    pub verifier: Option<Arc<dyn CredentialVerifier>>,
}
