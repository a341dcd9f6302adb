use std::path::PathBuf;

use anyhow::{Context, Result};
use products_hr::ClientConfig;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub seed_file: Option<PathBuf>,
    pub session_file: Option<PathBuf>,
    pub client: ClientConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            seed_file: None,
            session_file: None,
            client: ClientConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = split_origins(
            &std::env::var("ROSTER_CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.into()),
        );

        let seed_file = env_path("ROSTER_SEED_FILE");
        if let Some(path) = &seed_file {
            std::fs::metadata(path)
                .with_context(|| format!("ROSTER_SEED_FILE {} not readable", path.display()))?;
        }

        Ok(Self {
            cors_allowed_origins,
            seed_file,
            session_file: env_path("ROSTER_SESSION_FILE"),
            client: ClientConfig::from_env(),
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
