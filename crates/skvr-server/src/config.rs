use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const ENV_DIR: &str = "SKVR_DIR";
pub const ENV_DEFAULT_NAMESPACE: &str = "SKVR_DEFAULT_NAMESPACE";
pub const ENV_INDEX_KEY: &str = "SKVR_INDEX_KEY";
pub const ENV_PORT: &str = "SKVR_PORT";
pub const ENV_AUTH_USER: &str = "SKVR_AUTH_USER";
pub const ENV_AUTH_PASS: &str = "SKVR_AUTH_PASS";

/// Process configuration, read once at startup and fixed for the lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Location of the persisted store. Fatal if it cannot be created.
    pub storage_dir: PathBuf,
    /// Namespace substituted when the request path omits one.
    pub default_namespace: String,
    /// Key substituted for `GET /` and `GET /<namespace>/`.
    pub default_key: String,
    /// HTTP listen port, bound on 0.0.0.0.
    pub port: u16,
    /// Credentials for the basic-auth gate. `None` disables the gate.
    pub auth: Option<AuthConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("/var/lib/skvr"),
            default_namespace: "default".to_owned(),
            default_key: "index.html".to_owned(),
            port: 8077,
            auth: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, logging each value and
    /// whether a default was substituted.
    pub fn from_env() -> ServerResult<Self> {
        let storage_dir = PathBuf::from(env_or(ENV_DIR, "/var/lib/skvr"));
        if storage_dir.as_os_str().is_empty() {
            return Err(ServerError::Config(format!("{ENV_DIR} must not be empty")));
        }
        let default_namespace = env_or(ENV_DEFAULT_NAMESPACE, "default");
        let default_key = env_or(ENV_INDEX_KEY, "index.html");
        let raw_port = env_or(ENV_PORT, "8077");
        let port = raw_port
            .parse()
            .map_err(|_| ServerError::Config(format!("invalid {ENV_PORT}: {raw_port}")))?;
        let auth = match (std::env::var(ENV_AUTH_USER), std::env::var(ENV_AUTH_PASS)) {
            (Ok(username), Ok(password)) => Some(AuthConfig { username, password }),
            (Err(_), Err(_)) => None,
            _ => {
                return Err(ServerError::Config(format!(
                    "{ENV_AUTH_USER} and {ENV_AUTH_PASS} must be set together"
                )))
            }
        };
        tracing::info!(
            enabled = auth.is_some(),
            "config: auth gate {}",
            if auth.is_some() { "enabled" } else { "disabled" }
        );
        Ok(Self {
            storage_dir,
            default_namespace,
            default_key,
            port,
            auth,
        })
    }

    /// Listen address: the configured port on all interfaces.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) => {
            tracing::info!("config: {key} = {value}");
            value
        }
        Err(_) => {
            tracing::info!("config: {key} = {default} (default value)");
            default.to_owned()
        }
    }
}
