use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use skvr_store::StoreError;

use crate::resolve::Address;
use crate::state::AppState;

const NAMESPACE_LIST_PREFIX: &str = "List Namespaces:\n---\n";
const KEY_LIST_PREFIX: &str = "List Keys:\n---\n";

/// Catch-all handler: resolve the path, then select the store operation
/// for the verb. Anything outside GET/OPTIONS/POST/PUT/DELETE is a 405.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let address = Address::resolve(request.uri().path(), &state.default_namespace);
    let method = request.method().clone();
    if method == Method::GET {
        handle_get(&state, &address)
    } else if method == Method::OPTIONS {
        handle_probe(&state, &address)
    } else if method == Method::POST || method == Method::PUT {
        handle_write(&state, &address, &method, request.into_body()).await
    } else if method == Method::DELETE {
        handle_delete(&state, &address)
    } else {
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    }
}

/// GET: read with probe fallback.
fn handle_get(state: &AppState, address: &Address) -> Response {
    let (namespace, key) = address.effective(&state.default_namespace, &state.default_key);
    match state.store.get(&namespace, &key) {
        Ok(value) => {
            tracing::info!(method = "GET", %namespace, %key, "served value");
            (StatusCode::OK, value).into_response()
        }
        // The key is absent: fall back to an existence/listing probe on the
        // original, unresolved address rather than failing outright.
        Err(StoreError::KeyNotFound { .. }) => handle_probe(state, address),
        Err(err @ StoreError::NamespaceNotFound(_)) => {
            tracing::warn!(method = "GET", %namespace, %key, error = %err, "read failed");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => {
            tracing::error!(method = "GET", %namespace, %key, error = %err, "read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// OPTIONS: existence and listing probe. No body semantics beyond the
/// status, the `List` header, and the informational listing text.
fn handle_probe(state: &AppState, address: &Address) -> Response {
    let namespace = address.namespace.as_str();
    let key = address.key.as_str();
    if !key.is_empty() {
        // Key probe: present or absent, with no distinction between a
        // missing namespace and a missing key.
        return match state.store.exists(namespace, Some(key)) {
            Ok(true) => StatusCode::OK.into_response(),
            Ok(false) => StatusCode::NOT_FOUND.into_response(),
            Err(err) => {
                tracing::warn!(method = "OPTIONS", %namespace, %key, error = %err, "probe failed");
                StatusCode::NOT_FOUND.into_response()
            }
        };
    }
    if namespace.is_empty() {
        return match state.store.list_namespaces() {
            Ok(namespaces) => {
                tracing::info!(method = "OPTIONS", count = namespaces.len(), "listed namespaces");
                let body = listing_body(NAMESPACE_LIST_PREFIX, &namespaces);
                (StatusCode::OK, [("List", "Namespaces")], body).into_response()
            }
            Err(err) => {
                tracing::error!(method = "OPTIONS", error = %err, "namespace listing failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }
    match state.store.list_keys(namespace) {
        Ok(keys) => {
            tracing::info!(method = "OPTIONS", %namespace, count = keys.len(), "listed keys");
            let status = if keys.is_empty() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            let body = listing_body(KEY_LIST_PREFIX, &keys);
            (status, [("List", "Keys")], body).into_response()
        }
        Err(err) => {
            tracing::error!(method = "OPTIONS", %namespace, error = %err, "key listing failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST and PUT: write, with identical semantics for both verbs.
async fn handle_write(state: &AppState, address: &Address, method: &Method, body: Body) -> Response {
    let namespace = address.namespace.as_str();
    let key = address.key.as_str();
    if namespace.is_empty() {
        // No writable address.
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    if key.is_empty() {
        // Namespace-creation-only: no key is written and the body is not read.
        return match state.store.put(namespace, None, None) {
            Ok(()) => {
                tracing::info!(method = %method, %namespace, "ensured namespace");
                StatusCode::OK.into_response()
            }
            Err(err) => {
                tracing::error!(method = %method, %namespace, error = %err, "namespace creation failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }
    let value = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(method = %method, %namespace, %key, error = %err, "body read failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    match state.store.put(namespace, Some(key), Some(value.as_ref())) {
        Ok(()) => {
            tracing::info!(method = %method, %namespace, %key, bytes = value.len(), "stored value");
            StatusCode::OK.into_response()
        }
        Err(err) => {
            tracing::error!(method = %method, %namespace, %key, error = %err, "write failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// DELETE: a key, or a whole namespace when the key is unspecified.
fn handle_delete(state: &AppState, address: &Address) -> Response {
    let namespace = address.namespace.as_str();
    let key = address.key.as_str();
    if namespace.is_empty() {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    if key.is_empty() {
        return match state.store.delete_namespace(namespace) {
            Ok(()) => {
                tracing::info!(method = "DELETE", %namespace, "deleted namespace");
                StatusCode::OK.into_response()
            }
            Err(err @ StoreError::NamespaceNotFound(_)) => {
                tracing::warn!(method = "DELETE", %namespace, error = %err, "delete failed");
                StatusCode::NOT_FOUND.into_response()
            }
            Err(err) => {
                tracing::error!(method = "DELETE", %namespace, error = %err, "delete failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }
    match state.store.delete(namespace, key) {
        Ok(()) => {
            tracing::info!(method = "DELETE", %namespace, %key, "deleted key");
            StatusCode::OK.into_response()
        }
        Err(err) if err.is_not_found() => {
            tracing::warn!(method = "DELETE", %namespace, %key, error = %err, "delete failed");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => {
            tracing::error!(method = "DELETE", %namespace, %key, error = %err, "delete failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn listing_body(prefix: &str, entries: &[String]) -> String {
    let mut body = String::from(prefix);
    for entry in entries {
        body.push_str(entry);
        body.push('\n');
    }
    body
}
