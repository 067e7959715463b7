//! Chat session: transcript plus the user's current settings
//!
//! A turn is split into [`ChatSession::begin_turn`] and
//! [`ChatSession::finish_turn`] so a UI can keep drawing while the request is
//! in flight. [`ChatSession::submit`] runs both halves back to back.

use std::sync::Arc;

use crate::client::RecommendClient;
use crate::config::AppConfig;
use crate::error::Result;
use crate::i18n::{Labels, Locale};
use crate::render::{render_transcript, RenderedLine};
use crate::transcript::Transcript;
use crate::types::{ModelType, RecommendRequest, RecommendationResult};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for input
    Idle,
    /// A request is in flight
    Busy,
}

/// A request that has been recorded in the transcript but not answered yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTurn {
    pub generation: u64,
    pub request: RecommendRequest,
}

pub struct ChatSession {
    client: Arc<dyn RecommendClient>,
    transcript: Transcript,
    locale: Locale,
    top_k: u32,
    min_top_k: u32,
    max_top_k: u32,
    model_type: ModelType,
    send_model_type: bool,
    /// Generation of the turn currently in flight
    in_flight: Option<u64>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn RecommendClient>, config: &AppConfig) -> Self {
        let min_top_k = config.min_top_k.max(1);
        let max_top_k = config.max_top_k.max(min_top_k);
        Self {
            client,
            transcript: Transcript::with_welcome(config.locale),
            locale: config.locale,
            top_k: config.top_k.clamp(min_top_k, max_top_k),
            min_top_k,
            max_top_k,
            model_type: config.model_type,
            send_model_type: config.send_model_type,
            in_flight: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn labels(&self) -> &'static Labels {
        self.locale.labels()
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight.is_some() {
            SessionState::Busy
        } else {
            SessionState::Idle
        }
    }

    pub fn render(&self) -> Vec<RenderedLine> {
        render_transcript(&self.transcript, self.labels())
    }

    /// Record the user's text and build the request for it.
    ///
    /// Returns `None` without touching the transcript when the text is blank
    /// or another turn is still in flight.
    pub fn begin_turn(&mut self, text: &str) -> Option<PendingTurn> {
        let text = text.trim();
        if text.is_empty() || self.in_flight.is_some() {
            return None;
        }

        self.transcript.push_user(text);

        let mut request = RecommendRequest::new(text).with_top_k(self.top_k);
        if self.send_model_type {
            request = request.with_model_type(self.model_type);
        }

        let generation = self.transcript.generation();
        self.in_flight = Some(generation);
        Some(PendingTurn {
            generation,
            request,
        })
    }

    /// Append the outcome of `turn`. Returns `false` if the turn was stale
    /// (the transcript was reset while it was in flight) and got dropped.
    pub fn finish_turn(&mut self, turn: PendingTurn, outcome: Result<RecommendationResult>) -> bool {
        if turn.generation != self.transcript.generation() {
            tracing::debug!(
                turn_generation = turn.generation,
                current_generation = self.transcript.generation(),
                "dropping reply for a reset transcript"
            );
            return false;
        }

        self.in_flight = None;
        match outcome {
            Ok(result) => {
                self.transcript.push_result(result);
            }
            Err(error) => {
                tracing::warn!(kind = ?error.kind(), "turn failed: {error}");
                let text = self.labels().describe_error(&error);
                self.transcript.push_error(text, Some(self.locale));
            }
        }
        true
    }

    /// Run a full turn against the client
    pub async fn submit(&mut self, text: &str) -> bool {
        let Some(turn) = self.begin_turn(text) else {
            return false;
        };
        let client = Arc::clone(&self.client);
        let outcome = client.recommend(&turn.request).await;
        self.finish_turn(turn, outcome)
    }

    pub fn client(&self) -> Arc<dyn RecommendClient> {
        Arc::clone(&self.client)
    }

    /// Switch locale, resetting the transcript to the new welcome message
    pub fn set_locale(&mut self, locale: Locale) {
        if locale == self.locale {
            return;
        }
        self.locale = locale;
        self.in_flight = None;
        self.transcript.reset(locale);
    }

    pub fn toggle_locale(&mut self) {
        self.set_locale(self.locale.toggle());
    }

    pub fn set_top_k(&mut self, top_k: u32) {
        self.top_k = top_k.clamp(self.min_top_k, self.max_top_k);
    }

    pub fn increase_top_k(&mut self) {
        self.set_top_k(self.top_k.saturating_add(1));
    }

    pub fn decrease_top_k(&mut self) {
        self.set_top_k(self.top_k.saturating_sub(1));
    }

    pub fn toggle_model(&mut self) {
        self.model_type = self.model_type.toggle();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("endpoint", &self.client.endpoint())
            .field("locale", &self.locale)
            .field("top_k", &self.top_k)
            .field("model_type", &self.model_type)
            .field("messages", &self.transcript.len())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use crate::transcript::{MessageContent, Role};
    use crate::types::Persona;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Client that replays canned outcomes and records requests
    struct ScriptedClient {
        replies: Mutex<Vec<Result<RecommendationResult>>>,
        seen: Mutex<Vec<RecommendRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<RecommendationResult>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RecommendClient for ScriptedClient {
        async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendationResult> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().remove(0)
        }

        fn endpoint(&self) -> &str {
            "http://scripted/recommend-persona/"
        }
    }

    fn sample_result() -> RecommendationResult {
        RecommendationResult {
            persona: Persona {
                preference_text: "cozy cafes".to_string(),
                ..Default::default()
            },
            recs: Vec::new(),
            model_used: None,
        }
    }

    fn session_with(client: Arc<ScriptedClient>, config: AppConfig) -> ChatSession {
        ChatSession::new(client, &config)
    }

    #[test]
    fn successful_turn_appends_user_then_result() {
        let client = ScriptedClient::new(vec![Ok(sample_result())]);
        let mut session = session_with(client.clone(), AppConfig::default().with_top_k(3));

        let appended = tokio_test::block_on(session.submit("  I love quiet cafes  "));
        assert!(appended);

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            MessageContent::Text("I love quiet cafes".to_string())
        );
        assert!(matches!(messages[2].content, MessageContent::Recommendation(_)));
        assert_eq!(session.state(), SessionState::Idle);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].free_text, "I love quiet cafes");
        assert_eq!(seen[0].top_k, Some(3));
        assert_eq!(seen[0].model_type, Some(ModelType::Review));
    }

    #[test]
    fn failed_turn_appends_localized_error_text() {
        let client = ScriptedClient::new(vec![Err(RecommendError::from_status(
            503,
            r#"{"detail":"warming up"}"#.to_string(),
        ))]);
        let mut session = session_with(client, AppConfig::default().with_locale(Locale::En));

        tokio_test::block_on(session.submit("anything"));

        let last = session.transcript().last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.locale, Some(Locale::En));
        let MessageContent::Error(text) = &last.content else {
            panic!("expected error content");
        };
        assert!(text.starts_with("Server error (503): warming up"));
    }

    #[test]
    fn blank_input_is_ignored() {
        let client = ScriptedClient::new(Vec::new());
        let mut session = session_with(client.clone(), AppConfig::default());

        assert!(session.begin_turn("   \n ").is_none());
        assert_eq!(session.transcript().len(), 1);
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn second_turn_is_refused_while_busy() {
        let client = ScriptedClient::new(Vec::new());
        let mut session = session_with(client, AppConfig::default());

        let turn = session.begin_turn("first").unwrap();
        assert_eq!(session.state(), SessionState::Busy);
        assert!(session.begin_turn("second").is_none());

        assert!(session.finish_turn(turn, Ok(sample_result())));
        assert!(session.begin_turn("second").is_some());
    }

    #[test]
    fn locale_switch_resets_and_drops_stale_reply() {
        let client = ScriptedClient::new(Vec::new());
        let mut session = session_with(client, AppConfig::default().with_locale(Locale::Ko));

        let turn = session.begin_turn("매운 음식 좋아요").unwrap();
        session.toggle_locale();

        assert_eq!(session.locale(), Locale::En);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(
            session.transcript().last().unwrap().content,
            MessageContent::Text(Locale::En.labels().welcome.to_string())
        );

        assert!(!session.finish_turn(turn, Ok(sample_result())));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn same_locale_does_not_reset() {
        let client = ScriptedClient::new(Vec::new());
        let mut session = session_with(client, AppConfig::default().with_locale(Locale::Ko));
        session.begin_turn("hello");

        session.set_locale(Locale::Ko);
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().generation(), 0);
    }

    #[test]
    fn model_type_can_be_withheld() {
        let client = ScriptedClient::new(Vec::new());
        let mut config = AppConfig::default();
        config.send_model_type = false;
        let mut session = session_with(client, config);

        session.toggle_model();
        assert_eq!(session.model_type(), ModelType::Hybrid);
        let turn = session.begin_turn("steak").unwrap();
        assert_eq!(turn.request.model_type, None);
    }

    #[test]
    fn top_k_steps_stay_in_bounds() {
        let client = ScriptedClient::new(Vec::new());
        let mut session = session_with(client, AppConfig::default().with_top_k(1));

        session.decrease_top_k();
        assert_eq!(session.top_k(), 1);
        session.set_top_k(100);
        assert_eq!(session.top_k(), 20);
        session.increase_top_k();
        assert_eq!(session.top_k(), 20);
    }

    proptest! {
        #[test]
        fn top_k_is_always_clamped(value in any::<u32>(), min in 1u32..10, span in 0u32..30) {
            let mut config = AppConfig::default();
            config.min_top_k = min;
            config.max_top_k = min + span;
            config.top_k = min;
            let mut session = session_with(ScriptedClient::new(Vec::new()), config);

            session.set_top_k(value);
            prop_assert!(session.top_k() >= min);
            prop_assert!(session.top_k() <= min + span);
        }
    }
}
