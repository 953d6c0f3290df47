//! HTTP surface for skvr.
//!
//! Turns an HTTP request (method + path + body) into one of a small set of
//! store operations: the path is parsed by the address resolver, the verb
//! dispatcher selects the operation and maps outcomes to status codes, and
//! an optional basic-auth gate wraps the whole thing. The store itself is
//! an injected [`skvr_store::KvStore`] handle.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod resolve;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{CredentialVerifier, StaticCredentials};
pub use config::{AuthConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use resolve::Address;
pub use router::build_router;
pub use server::SkvrServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use base64::Engine as _;
    use tower::util::ServiceExt;

    use skvr_store::{InMemoryStore, KvStore};

    use super::*;

    /// Router over a fresh in-memory store with the default namespace
    /// created, mirroring server startup.
    fn test_router() -> Router {
        router_with_verifier(None)
    }

    fn router_with_verifier(verifier: Option<Arc<dyn CredentialVerifier>>) -> Router {
        let store = Arc::new(InMemoryStore::new());
        store.put("default", None, None).unwrap();
        build_router(AppState {
            store,
            default_namespace: "default".to_owned(),
            default_key: "index.html".to_owned(),
            verifier,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: &[u8]) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_vec()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    // -----------------------------------------------------------------------
    // End-to-end flow
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_get_probe_delete_flow() {
        let app = test_router();

        let response = send(&app, Method::PUT, "/shop/apple", b"red").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/shop/apple", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"red");

        let response = send(&app, Method::OPTIONS, "/shop/apple", b"").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::DELETE, "/shop/apple", b"").await;
        assert_eq!(response.status(), StatusCode::OK);

        // The read falls back to the existence probe, which now misses.
        let response = send(&app, Method::GET, "/shop/apple", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_and_put_are_identical() {
        let app = test_router();
        let response = send(&app, Method::POST, "/shop/pear", b"green").await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, Method::GET, "/shop/pear", b"").await;
        assert_eq!(body_bytes(response).await, b"green");
    }

    #[tokio::test]
    async fn value_is_fully_overwritten() {
        let app = test_router();
        send(&app, Method::PUT, "/shop/apple", b"a much longer first value").await;
        send(&app, Method::PUT, "/shop/apple", b"v2").await;
        let response = send(&app, Method::GET, "/shop/apple", b"").await;
        assert_eq!(body_bytes(response).await, b"v2");
    }

    #[tokio::test]
    async fn extra_path_segments_are_ignored() {
        let app = test_router();
        send(&app, Method::PUT, "/a/b/ignored/also-ignored", b"v").await;
        let response = send(&app, Method::GET, "/a/b", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"v");
    }

    // -----------------------------------------------------------------------
    // GET fallbacks
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_root_serves_default_key_in_default_namespace() {
        let app = test_router();
        send(&app, Method::PUT, "/default/index.html", b"<html>").await;
        let response = send(&app, Method::GET, "/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<html>");
    }

    #[tokio::test]
    async fn get_namespace_slash_serves_default_key() {
        let app = test_router();
        send(&app, Method::PUT, "/shop/index.html", b"storefront").await;
        let response = send(&app, Method::GET, "/shop/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"storefront");
    }

    #[tokio::test]
    async fn get_single_segment_reads_default_namespace() {
        let app = test_router();
        send(&app, Method::PUT, "/default/greeting", b"hi").await;
        let response = send(&app, Method::GET, "/greeting", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"hi");
    }

    #[tokio::test]
    async fn get_root_without_default_key_falls_back_to_namespace_listing() {
        let app = test_router();
        let response = send(&app, Method::GET, "/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("List").unwrap(), "Namespaces");
    }

    #[tokio::test]
    async fn get_missing_namespace_is_not_found() {
        let app = test_router();
        let response = send(&app, Method::GET, "/nowhere/key", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -----------------------------------------------------------------------
    // OPTIONS listings
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn options_root_lists_namespaces() {
        let app = test_router();
        let response = send(&app, Method::OPTIONS, "/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("List").unwrap(), "Namespaces");
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("List Namespaces:\n---\n"));
        assert!(body.contains("default\n"));
    }

    #[tokio::test]
    async fn options_namespace_lists_keys() {
        let app = test_router();
        send(&app, Method::PUT, "/shop/apple", b"red").await;
        send(&app, Method::PUT, "/shop/pear", b"green").await;
        let response = send(&app, Method::OPTIONS, "/shop/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("List").unwrap(), "Keys");
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("List Keys:\n---\n"));
        assert!(body.contains("apple\n"));
        assert!(body.contains("pear\n"));
    }

    #[tokio::test]
    async fn options_empty_namespace_is_not_found_with_empty_listing() {
        let app = test_router();
        send(&app, Method::POST, "/emptyns/", b"").await;
        let response = send(&app, Method::OPTIONS, "/emptyns/", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("List").unwrap(), "Keys");
        assert_eq!(body_bytes(response).await, b"List Keys:\n---\n");
    }

    #[tokio::test]
    async fn options_missing_namespace_is_server_error() {
        let app = test_router();
        let response = send(&app, Method::OPTIONS, "/nowhere/", b"").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn options_key_probe_has_no_body() {
        let app = test_router();
        send(&app, Method::PUT, "/shop/apple", b"red").await;

        let response = send(&app, Method::OPTIONS, "/shop/apple", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_bytes(response).await.is_empty());

        let response = send(&app, Method::OPTIONS, "/shop/absent", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Missing namespace and missing key are indistinguishable here.
        let response = send(&app, Method::OPTIONS, "/nowhere/absent", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -----------------------------------------------------------------------
    // Writes and deletes at unwritable addresses
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn write_to_root_is_method_not_allowed() {
        let app = test_router();
        let response = send(&app, Method::PUT, "/", b"x").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let response = send(&app, Method::POST, "/", b"x").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn delete_root_is_method_not_allowed() {
        let app = test_router();
        let response = send(&app, Method::DELETE, "/", b"").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_allowed() {
        let app = test_router();
        let response = send(&app, Method::PATCH, "/shop/apple", b"x").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn namespace_creation_only_put() {
        let app = test_router();
        let response = send(&app, Method::PUT, "/fresh/", b"ignored body").await;
        assert_eq!(response.status(), StatusCode::OK);

        // Exists with zero keys: listing probe says 404 with the empty body.
        let response = send(&app, Method::OPTIONS, "/fresh/", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // And it shows up in the namespace listing.
        let response = send(&app, Method::OPTIONS, "/", b"").await;
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("fresh\n"));
    }

    #[tokio::test]
    async fn delete_namespace_removes_everything() {
        let app = test_router();
        send(&app, Method::PUT, "/shop/apple", b"red").await;
        let response = send(&app, Method::DELETE, "/shop/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, Method::OPTIONS, "/shop/", b"").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn delete_missing_namespace_is_not_found() {
        let app = test_router();
        let response = send(&app, Method::DELETE, "/nowhere/", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_key_is_not_found() {
        let app = test_router();
        let response = send(&app, Method::DELETE, "/default/absent", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -----------------------------------------------------------------------
    // Auth gate
    // -----------------------------------------------------------------------

    fn authed_router() -> Router {
        router_with_verifier(Some(Arc::new(StaticCredentials::new("hello", "world"))))
    }

    fn basic_header(username: &str, password: &str) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        format!("Basic {encoded}")
    }

    async fn send_authed(app: &Router, authorization: Option<String>) -> Response {
        let mut builder = Request::builder().method(Method::OPTIONS).uri("/");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app.clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_credentials_are_challenged() {
        let app = authed_router();
        let response = send_authed(&app, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"Restricted\""
        );
    }

    #[tokio::test]
    async fn blank_credentials_are_challenged() {
        let app = authed_router();
        let response = send_authed(&app, Some(basic_header("  ", "world"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_credentials_are_challenged() {
        let app = authed_router();
        let response = send_authed(&app, Some(basic_header("hello", "wrong"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_credentials_pass_through_to_dispatch() {
        let app = authed_router();
        let response = send_authed(&app, Some(basic_header("hello", "world"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("List").unwrap(), "Namespaces");
    }

    #[tokio::test]
    async fn unconfigured_gate_lets_everything_through() {
        let app = test_router();
        let response = send_authed(&app, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
