use std::sync::Arc;
use tracing::{debug, warn};

use crate::session::{ClientMessage, TranslationPanel};

/// Applies one client message to the session's panel.
pub async fn handle_message(panel: &Arc<TranslationPanel>, client_uid: &str, text: &str) -> anyhow::Result<()> {
    let msg: ClientMessage = serde_json::from_str(text)?;
    debug!("Client {} sent {:?}", client_uid, msg);

    match msg {
        ClientMessage::SetSourceText { text } => panel.set_source_text(text).await,
        ClientMessage::SetSourceLanguage { code } => panel.set_source_language(code).await,
        ClientMessage::SetTargetLanguage { code } => panel.set_target_language(code).await,
        ClientMessage::Translate => {
            // The result reaches the client through the panel sink.
            match panel.submit().await {
                Some(pending) => {
                    let generation = pending.generation;
                    debug!("Client {} started translation {}", client_uid, generation);
                    let client_uid = client_uid.to_string();
                    tokio::spawn(async move {
                        if pending.settled().await {
                            debug!("Client {} translation {} delivered", client_uid, generation);
                        } else {
                            debug!("Client {} translation {} superseded", client_uid, generation);
                        }
                    });
                }
                None => warn!("Client {} asked to translate empty text", client_uid),
            }
        }
        ClientMessage::SwapLanguages => panel.swap_languages().await,
        ClientMessage::Clear => panel.clear().await,
        ClientMessage::Cancel => panel.cancel().await,
    }

    Ok(())
}
