use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::sequencer::{Generation, RequestSequencer};
use super::types::{DisplayStats, PanelView, Phase};
use crate::translate::{TranslateError, TranslationRequest, TranslationResult, Translator};

/// Channel the panel pushes snapshots into.
pub type PanelSink = mpsc::UnboundedSender<PanelView>;

const DEFAULT_SOURCE_LANGUAGE: &str = "en";

struct PanelState {
    sequencer: RequestSequencer,
    phase: Phase,
    source_text: String,
    translated_text: String,
    source_language: String,
    target_language: String,
    error: Option<String>,
    stats: Option<DisplayStats>,
}

impl PanelState {
    fn new() -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            phase: Phase::Idle,
            source_text: String::new(),
            translated_text: String::new(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: String::new(),
            error: None,
            stats: None,
        }
    }

    fn view(&self) -> PanelView {
        PanelView {
            source_text: self.source_text.clone(),
            translated_text: self.translated_text.clone(),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            is_loading: matches!(self.phase, Phase::InFlight(_)),
            error: self.error.clone(),
            stats: self.stats,
            generation: self.sequencer.current(),
            phase: self.phase,
        }
    }

    fn cancel(&mut self) {
        self.sequencer.invalidate();
        self.phase = Phase::Idle;
    }
}

/// A submitted translation that is still running in the background.
pub struct PendingTranslation {
    pub generation: Generation,
    handle: JoinHandle<bool>,
}

impl PendingTranslation {
    /// Waits for the call to finish. `true` if its outcome reached the panel,
    /// `false` if it was superseded in the meantime.
    pub async fn settled(self) -> bool {
        match self.handle.await {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Translation task {} did not complete: {}", self.generation, e);
                false
            }
        }
    }
}

/// One user's translation panel: the texts, the language pair and the
/// request in flight.
pub struct TranslationPanel {
    translator: Arc<dyn Translator>,
    state: Mutex<PanelState>,
    sink: PanelSink,
}

impl TranslationPanel {
    pub fn new(translator: Arc<dyn Translator>, sink: PanelSink) -> Arc<Self> {
        Arc::new(Self {
            translator,
            state: Mutex::new(PanelState::new()),
            sink,
        })
    }

    pub async fn view(&self) -> PanelView {
        self.state.lock().await.view()
    }

    /// Sends the current snapshot to the client.
    pub async fn publish(&self) {
        let view = self.view().await;
        self.push(view);
    }

    pub async fn set_source_text(&self, text: String) {
        self.update(|state| state.source_text = text).await;
    }

    pub async fn set_source_language(&self, code: String) {
        self.update(|state| state.source_language = code).await;
    }

    pub async fn set_target_language(&self, code: String) {
        self.update(|state| state.target_language = code).await;
    }

    /// Starts translating the current source text, superseding any request
    /// still in flight. Returns `None` when there is nothing to translate.
    pub async fn submit(self: &Arc<Self>) -> Option<PendingTranslation> {
        let (generation, request, view) = {
            let mut state = self.state.lock().await;
            if state.source_text.trim().is_empty() {
                return None;
            }

            let generation = state.sequencer.begin();
            state.phase = Phase::InFlight(generation);
            state.translated_text.clear();
            state.error = None;
            state.stats = None;

            let request = TranslationRequest::new(
                state.source_text.clone(),
                state.source_language.clone(),
                state.target_language.clone(),
            );
            (generation, request, state.view())
        };
        self.push(view);

        debug!("Submitting translation {}", generation);
        let panel = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = panel.translator.translate(request).await;
            panel.complete(generation, outcome).await
        });

        Some(PendingTranslation { generation, handle })
    }

    /// Applies an outcome if `generation` is still current; otherwise drops it.
    pub async fn complete(
        &self,
        generation: Generation,
        outcome: Result<TranslationResult, TranslateError>,
    ) -> bool {
        let view = {
            let mut state = self.state.lock().await;
            if !state.sequencer.is_current(generation) {
                debug!(
                    "Discarding stale translation {} (current {})",
                    generation,
                    state.sequencer.current()
                );
                return false;
            }

            state.phase = Phase::Settled(generation);
            match outcome {
                Ok(result) => {
                    state.stats = DisplayStats::from_stats(&result.stats);
                    state.translated_text = result.translation;
                }
                Err(e) => {
                    warn!("Translation {} failed: {}", generation, e);
                    state.error = Some(e.user_message());
                }
            }
            state.view()
        };
        self.push(view);
        true
    }

    /// Forgets the request in flight. Its network call keeps running, but its
    /// outcome will be discarded.
    pub async fn cancel(&self) {
        self.update(PanelState::cancel).await;
    }

    pub async fn clear(&self) {
        self.update(|state| {
            state.cancel();
            state.source_text.clear();
            state.translated_text.clear();
            state.error = None;
            state.stats = None;
        })
        .await;
    }

    /// Swaps the language pair and moves the translation into the source pane.
    pub async fn swap_languages(&self) {
        self.update(|state| {
            state.cancel();
            std::mem::swap(&mut state.source_language, &mut state.target_language);
            std::mem::swap(&mut state.source_text, &mut state.translated_text);
            state.error = None;
            state.stats = None;
        })
        .await;
    }

    async fn update(&self, f: impl FnOnce(&mut PanelState)) {
        let view = {
            let mut state = self.state.lock().await;
            f(&mut *state);
            state.view()
        };
        self.push(view);
    }

    fn push(&self, view: PanelView) {
        if self.sink.send(view).is_err() {
            debug!("Panel snapshot dropped, client is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{TranslationStats, UpstreamError, ValidationError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    type Outcome = Result<TranslationResult, TranslateError>;

    /// Translator whose calls finish only when the test says so.
    #[derive(Default)]
    struct ScriptedTranslator {
        pending: std::sync::Mutex<VecDeque<oneshot::Receiver<Outcome>>>,
        requests: std::sync::Mutex<Vec<TranslationRequest>>,
    }

    impl ScriptedTranslator {
        fn expect_call(&self) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push_back(rx);
            tx
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(&self, request: TranslationRequest) -> Outcome {
            self.requests.lock().unwrap().push(request);
            let rx = self
                .pending
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected translate call");
            rx.await.expect("test dropped the outcome sender")
        }
    }

    fn translated(text: &str) -> Outcome {
        Ok(TranslationResult {
            translation: text.to_string(),
            model: "m".to_string(),
            stats: TranslationStats {
                total_duration: Some(2_000_000_000),
                eval_count: Some(5),
                eval_duration: None,
            },
        })
    }

    async fn panel_with(
        translator: &Arc<ScriptedTranslator>,
    ) -> (Arc<TranslationPanel>, mpsc::UnboundedReceiver<PanelView>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let panel = TranslationPanel::new(translator.clone(), tx);
        panel.set_source_text("hello".to_string()).await;
        panel.set_target_language("es".to_string()).await;
        (panel, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<PanelView>) -> Vec<PanelView> {
        let mut views = Vec::new();
        while let Ok(view) = rx.try_recv() {
            views.push(view);
        }
        views
    }

    #[tokio::test]
    async fn starts_idle_with_english_source() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let view = TranslationPanel::new(translator, tx).view().await;

        assert_eq!(view.source_language, "en");
        assert_eq!(view.target_language, "");
        assert_eq!(view.phase, Phase::Idle);
        assert!(!view.is_loading);
    }

    #[tokio::test]
    async fn blank_source_text_is_not_submitted() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;
        panel.set_source_text("  \n ".to_string()).await;

        assert!(panel.submit().await.is_none());
        assert_eq!(translator.calls(), 0);
        assert!(!panel.view().await.is_loading);
    }

    #[tokio::test]
    async fn submit_shows_loading_and_settles_with_result() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, mut rx) = panel_with(&translator).await;
        let reply = translator.expect_call();

        let pending = panel.submit().await.unwrap();
        let view = panel.view().await;
        assert!(view.is_loading);
        assert_eq!(view.phase, Phase::InFlight(pending.generation));

        reply.send(translated("hola")).unwrap();
        assert!(pending.settled().await);

        let view = panel.view().await;
        assert!(!view.is_loading);
        assert_eq!(view.translated_text, "hola");
        assert_eq!(view.stats, Some(DisplayStats { duration: 2, tokens: Some(5) }));
        assert_eq!(view.error, None);
        assert_eq!(drain(&mut rx).last(), Some(&view));

        let requests = translator.requests.lock().unwrap();
        assert_eq!(requests[0], TranslationRequest::new("hello", "en", "es"));
    }

    #[tokio::test]
    async fn submit_clears_previous_result() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;

        let first = translator.expect_call();
        let pending = panel.submit().await.unwrap();
        first.send(translated("hola")).unwrap();
        pending.settled().await;

        let _second = translator.expect_call();
        panel.submit().await.unwrap();
        let view = panel.view().await;
        assert_eq!(view.translated_text, "");
        assert_eq!(view.stats, None);
        assert!(view.is_loading);
    }

    #[tokio::test]
    async fn late_result_of_superseded_request_is_ignored() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, mut rx) = panel_with(&translator).await;

        let reply_one = translator.expect_call();
        let first = panel.submit().await.unwrap();
        let reply_two = translator.expect_call();
        let second = panel.submit().await.unwrap();
        assert!(second.generation > first.generation);

        reply_two.send(translated("segundo")).unwrap();
        assert!(second.settled().await);
        drain(&mut rx);

        reply_one.send(translated("primero")).unwrap();
        assert!(!first.settled().await);

        let view = panel.view().await;
        assert_eq!(view.translated_text, "segundo");
        assert_eq!(view.phase, Phase::Settled(view.generation));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn early_result_of_superseded_request_is_ignored() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;

        let reply_one = translator.expect_call();
        let first = panel.submit().await.unwrap();
        let reply_two = translator.expect_call();
        let second = panel.submit().await.unwrap();

        reply_one.send(translated("primero")).unwrap();
        assert!(!first.settled().await);
        let view = panel.view().await;
        assert!(view.is_loading);
        assert_eq!(view.translated_text, "");

        reply_two.send(translated("segundo")).unwrap();
        assert!(second.settled().await);
        assert_eq!(panel.view().await.translated_text, "segundo");
    }

    #[tokio::test]
    async fn cancel_stops_loading_and_drops_the_outcome() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, mut rx) = panel_with(&translator).await;
        let reply = translator.expect_call();

        let pending = panel.submit().await.unwrap();
        panel.cancel().await;

        let view = panel.view().await;
        assert!(!view.is_loading);
        assert_eq!(view.phase, Phase::Idle);
        drain(&mut rx);

        reply.send(translated("hola")).unwrap();
        assert!(!pending.settled().await);
        assert_eq!(panel.view().await, view);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn cancelled_error_is_not_shown() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;
        let reply = translator.expect_call();

        let pending = panel.submit().await.unwrap();
        panel.clear().await;
        reply
            .send(Err(UpstreamError::Status {
                status: 500,
                body: "oops".into(),
            }
            .into()))
            .unwrap();

        assert!(!pending.settled().await);
        assert_eq!(panel.view().await.error, None);
    }

    #[tokio::test]
    async fn current_error_is_shown_briefly() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;
        let reply = translator.expect_call();

        let pending = panel.submit().await.unwrap();
        reply
            .send(Err(UpstreamError::Status {
                status: 500,
                body: "oops".into(),
            }
            .into()))
            .unwrap();
        assert!(pending.settled().await);

        let view = panel.view().await;
        assert_eq!(view.error.as_deref(), Some("Translation failed"));
        assert!(!view.is_loading);
        assert_eq!(view.translated_text, "");
    }

    #[tokio::test]
    async fn validation_error_reason_is_shown() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let panel = TranslationPanel::new(translator.clone(), tx);
        panel.set_source_text("hello".to_string()).await;
        let reply = translator.expect_call();

        let pending = panel.submit().await.unwrap();
        reply
            .send(Err(ValidationError::MissingTargetLanguage.into()))
            .unwrap();
        pending.settled().await;

        assert_eq!(
            panel.view().await.error.as_deref(),
            Some("Target language is required")
        );
    }

    #[tokio::test]
    async fn clear_resets_texts_and_stats() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;
        let reply = translator.expect_call();
        let pending = panel.submit().await.unwrap();
        reply.send(translated("hola")).unwrap();
        pending.settled().await;

        panel.clear().await;

        let view = panel.view().await;
        assert_eq!(view.source_text, "");
        assert_eq!(view.translated_text, "");
        assert_eq!(view.stats, None);
        assert_eq!(view.target_language, "es");
    }

    #[tokio::test]
    async fn swap_exchanges_languages_and_texts() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;
        let reply = translator.expect_call();
        let pending = panel.submit().await.unwrap();
        reply.send(translated("hola")).unwrap();
        pending.settled().await;

        panel.swap_languages().await;

        let view = panel.view().await;
        assert_eq!(view.source_language, "es");
        assert_eq!(view.target_language, "en");
        assert_eq!(view.source_text, "hola");
        assert_eq!(view.translated_text, "hello");
        assert_eq!(view.stats, None);
        assert_eq!(view.error, None);
    }

    #[tokio::test]
    async fn swap_while_in_flight_drops_the_outcome() {
        let translator = Arc::new(ScriptedTranslator::default());
        let (panel, _rx) = panel_with(&translator).await;
        let reply = translator.expect_call();
        let pending = panel.submit().await.unwrap();

        panel.swap_languages().await;
        assert!(!panel.view().await.is_loading);

        reply.send(translated("hola")).unwrap();
        assert!(!pending.settled().await);
        assert_eq!(panel.view().await.source_language, "es");
        assert_eq!(panel.view().await.translated_text, "hello");
    }
}
