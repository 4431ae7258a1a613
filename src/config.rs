use crate::storage::resolve_data_path;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub notification_ttl: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, std::io::Error> {
        let api_url = env::var("API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let notification_ttl = env::var("NOTIFICATION_TTL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(crate::notify::DEFAULT_TTL);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            port,
            data_path: resolve_data_path()?,
            notification_ttl,
        })
    }
}
