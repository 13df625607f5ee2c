use serde::{Deserialize, Serialize};

use super::sequencer::Generation;
use crate::translate::TranslationStats;

/// Where the panel is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "generation", rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    InFlight(Generation),
    Settled(Generation),
}

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Stats line shown under the translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayStats {
    /// Whole seconds.
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

impl DisplayStats {
    /// Nothing is shown unless the service reported a non-zero total duration.
    pub fn from_stats(stats: &TranslationStats) -> Option<Self> {
        let total = stats.total_duration.filter(|nanos| *nanos > 0)?;
        Some(Self {
            duration: total / NANOS_PER_SEC + u64::from(total % NANOS_PER_SEC >= NANOS_PER_SEC / 2),
            tokens: stats.eval_count,
        })
    }
}

/// Everything a client needs to render the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub source_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub stats: Option<DisplayStats>,
    pub generation: Generation,
    pub phase: Phase,
}

/// Messages a client sends over the session socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    SetSourceText { text: String },
    SetSourceLanguage { code: String },
    SetTargetLanguage { code: String },
    Translate,
    SwapLanguages,
    Clear,
    Cancel,
}

/// Messages the server pushes to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    PanelState(PanelView),
    Error { message: String },
}
