//! Process configuration read from the environment at startup.

use crate::client::{ClientConfig, ResolvedClientConfig};
use crate::client::config::ConfigError;
use crate::storage::resolve_database_url;
use std::{env, net::SocketAddr};

pub const DEFAULT_API_KEY: &str = "dev-key";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub api_key: String,
    pub database_url: String,
    pub client: ResolvedClientConfig,
}

impl ServerConfig {
    /// Reads `PORT`, `API_KEY`, `DATABASE_URL` and `CLIENT_CONFIG`, after
    /// loading an optional `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        let api_key = env::var("API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        let client = ClientConfig::load_or_default(None, "CLIENT_CONFIG")?.resolve()?;

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            api_key,
            database_url: resolve_database_url(),
            client,
        })
    }
}
