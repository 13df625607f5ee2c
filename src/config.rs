use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Runtime settings. Layered as defaults, then an optional config file, then
/// environment variables (`OLLAMA_URL`, `DEFAULT_MODEL`, `PORT`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ollama_url: String,
    pub default_model: String,
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub num_predict: u32,
    pub assets_dir: String,
}

const DEFAULT_CONFIG_FILES: &[&str] = &["conf.yaml", "conf.json"];

impl Config {
    /// Loads from `CONFIG_PATH` or the first default file found, plus the
    /// process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                DEFAULT_CONFIG_FILES
                    .iter()
                    .map(PathBuf::from)
                    .find(|path| path.exists())
            });

        Self::from_sources(path.as_deref(), config::Environment::default().try_parsing(true))
    }

    pub fn from_sources(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("ollama_url", "http://localhost:11434")?
            .set_default("default_model", "translategemma:27b")?
            .set_default("request_timeout_secs", 300)?
            .set_default("temperature", 0.1)?
            .set_default("num_predict", 4096)?
            .set_default("assets_dir", "dist/client")?;

        if let Some(path) = path {
            tracing::debug!("Reading config file {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(env)
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("HOST/PORT do not form a socket address: {}:{}", self.host, self.port))
    }

    pub fn assets_path(&self) -> PathBuf {
        PathBuf::from(&self.assets_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ollama_url: "http://localhost:11434".to_string(),
            default_model: "translategemma:27b".to_string(),
            request_timeout_secs: 300,
            temperature: 0.1,
            num_predict: 4096,
            assets_dir: "dist/client".to_string(),
        }
    }
}
