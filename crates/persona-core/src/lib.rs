//! Persona Core - chat transcript and recommendation client
//!
//! Everything the persona chat front-end needs apart from the terminal
//! itself. The recommendation service is an external HTTP endpoint; this
//! crate only shapes requests, classifies failures and keeps the session
//! transcript.
//!
//! # Architecture
//!
//! ```text
//!  user text ──► ChatSession ──► RecommendClient ──► POST /recommend-persona/
//!                    │                                      │
//!                    ▼                                      ▼
//!               Transcript ◄──── result / error text ◄──────┘
//!                    │
//!                    ▼
//!           render (Labels per Locale) ──► RenderedLine
//! ```
//!
//! # Quick Start
//!
//! ```
//! use persona_core::{Locale, Transcript, render_transcript};
//!
//! let transcript = Transcript::with_welcome(Locale::En);
//! let lines = render_transcript(&transcript, Locale::En.labels());
//! assert!(!lines.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod i18n;
pub mod render;
pub mod session;
pub mod transcript;
pub mod types;

pub use client::{HttpRecommendClient, RecommendClient, SKIP_BROWSER_WARNING_HEADER};
pub use config::AppConfig;
pub use error::{ErrorKind, RecommendError, Result};
pub use i18n::{Labels, Locale};
pub use render::{render_message, render_transcript, LineStyle, RenderedLine};
pub use session::{ChatSession, PendingTurn, SessionState};
pub use transcript::{Message, MessageContent, Role, Transcript};
pub use types::{ModelType, Persona, RecommendRequest, RecommendationItem, RecommendationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
