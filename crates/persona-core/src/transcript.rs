//! Session-scoped chat transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::i18n::Locale;
use crate::types::RecommendationResult;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Message payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text
    Text(String),
    /// Plain text describing a failed turn
    Error(String),
    /// Structured recommendation payload
    Recommendation(RecommendationResult),
}

/// One transcript entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: MessageContent,
    /// Locale the text was produced in, for localized assistant text
    pub locale: Option<Locale>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: MessageContent, locale: Option<Locale>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            locale,
            created_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.content, MessageContent::Error(_))
    }
}

/// Ordered chat history for one session. Never persisted.
#[derive(Debug, Clone)]
pub struct Transcript {
    session_id: Uuid,
    /// Bumped on every reset so late replies can be told apart
    generation: u64,
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            generation: 0,
            messages: Vec::new(),
        }
    }

    /// A transcript holding only the welcome message for `locale`
    pub fn with_welcome(locale: Locale) -> Self {
        let mut transcript = Self::new();
        transcript.push_welcome(locale);
        transcript
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> Uuid {
        self.push(Message::new(Role::User, MessageContent::Text(text.into()), None))
    }

    pub fn push_assistant_text(&mut self, text: impl Into<String>, locale: Option<Locale>) -> Uuid {
        self.push(Message::new(
            Role::Assistant,
            MessageContent::Text(text.into()),
            locale,
        ))
    }

    pub fn push_result(&mut self, result: RecommendationResult) -> Uuid {
        self.push(Message::new(
            Role::Assistant,
            MessageContent::Recommendation(result),
            None,
        ))
    }

    pub fn push_error(&mut self, text: impl Into<String>, locale: Option<Locale>) -> Uuid {
        self.push(Message::new(
            Role::Assistant,
            MessageContent::Error(text.into()),
            locale,
        ))
    }

    /// Drop the history and start over with the welcome for `locale`
    pub fn reset(&mut self, locale: Locale) {
        self.messages.clear();
        self.generation += 1;
        self.push_welcome(locale);
        tracing::debug!(
            session = %self.session_id,
            generation = self.generation,
            locale = %locale,
            "transcript reset"
        );
    }

    fn push_welcome(&mut self, locale: Locale) {
        self.push_assistant_text(locale.labels().welcome, Some(locale));
    }

    fn push(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        id
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
