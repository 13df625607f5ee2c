use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::session::TranslationPanel;
use crate::translate::{OllamaTranslator, Translator};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<dyn Translator>,
    pub ollama: Arc<OllamaTranslator>,
    pub sessions: Arc<DashMap<String, Arc<TranslationPanel>>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        let ollama = Arc::new(OllamaTranslator::from_config(client, &config));

        Ok(Self {
            config: Arc::new(config),
            translator: ollama.clone(),
            ollama,
            sessions: Arc::new(DashMap::new()),
        })
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
