use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use skvr_store::{FlushCoordinator, KvStore, RedbStore};

use crate::auth::{CredentialVerifier, StaticCredentials};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Serve attempts before a transient failure is treated as fatal.
const MAX_SERVE_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// The skvr HTTP server: one store handle opened at startup and shared for
/// the process lifetime, passed explicitly into the dispatcher.
#[derive(Debug)]
pub struct SkvrServer {
    config: ServerConfig,
    store: Arc<RedbStore>,
}

impl SkvrServer {
    /// Open the store and prepare the server.
    ///
    /// Startup failures are fatal: an uncreatable storage directory, an
    /// unopenable store file, or an engine error while ensuring the default
    /// namespace all surface here. The default namespace is created if
    /// absent, so `OPTIONS /` on a fresh store lists at least one entry.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        if config.storage_dir.as_os_str().is_empty() {
            return Err(ServerError::Config("storage directory is empty".to_owned()));
        }
        let store = Arc::new(RedbStore::open(&config.storage_dir)?);
        store.put(&config.default_namespace, None, None)?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn state(&self) -> AppState {
        let verifier = self.config.auth.as_ref().map(|auth| {
            Arc::new(StaticCredentials::new(&auth.username, &auth.password))
                as Arc<dyn CredentialVerifier>
        });
        AppState {
            store: Arc::clone(&self.store) as Arc<dyn KvStore>,
            default_namespace: self.config.default_namespace.clone(),
            default_key: self.config.default_key.clone(),
            verifier,
        }
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state())
    }

    /// Start serving requests.
    ///
    /// Transient failures (bind or accept-loop I/O) are retried a bounded
    /// number of times with exponential backoff; anything else is fatal.
    pub async fn serve(self) -> ServerResult<()> {
        let flush = FlushCoordinator::spawn(Arc::clone(&self.store) as Arc<dyn KvStore>);
        self.store.set_flush_handle(flush);
        let app = self.router();
        let addr = self.config.bind_addr();
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;
        loop {
            let result = match TcpListener::bind(addr).await {
                Ok(listener) => {
                    tracing::info!(%addr, "skvr listening");
                    axum::serve(listener, app.clone())
                        .await
                        .map_err(|err| ServerError::Internal(err.to_string()))
                }
                Err(err) => Err(ServerError::Io(err)),
            };
            let err = match result {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            if !err.is_transient() || attempt >= MAX_SERVE_ATTEMPTS {
                return Err(err);
            }
            tracing::warn!(error = %err, attempt, backoff_ms = backoff.as_millis() as u64, "serve failed; retrying");
            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
        }
    }
}
