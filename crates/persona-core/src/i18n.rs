//! Korean/English label dictionary
//!
//! Each [`Locale`] maps to one static [`Labels`] table. Strings that embed
//! runtime values are built by the formatting methods on [`Labels`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecommendError;

/// Supported UI locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Ko => Self::En,
            Self::En => Self::Ko,
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Self::Ko => &KO,
            Self::En => &EN,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ko" | "kr" | "korean" => Ok(Self::Ko),
            "en" | "english" => Ok(Self::En),
            other => Err(format!("unsupported locale '{other}' (expected ko or en)")),
        }
    }
}

/// Fixed label set for one locale
#[derive(Debug)]
pub struct Labels {
    pub locale: Locale,
    pub locale_name: &'static str,
    pub title: &'static str,
    pub sidebar_header: &'static str,
    pub input_caption: &'static str,
    pub submit: &'static str,
    pub pending: &'static str,
    pub welcome: &'static str,
    pub persona_heading: &'static str,
    pub reason_heading: &'static str,
    pub predicted_score: &'static str,
    pub actual_rating: &'static str,
    pub model_used: &'static str,
    pub top_k: &'static str,
    pub model: &'static str,
    pub model_review: &'static str,
    pub model_hybrid: &'static str,
    pub role_user: &'static str,
    pub role_assistant: &'static str,
    pub unknown: &'static str,
    pub not_available: &'static str,
    pub footer: &'static str,
    pub error_server: &'static str,
    pub error_server_body: &'static str,
    pub error_connection_hint: &'static str,
    pub error_no_detail: &'static str,
}

pub static KO: Labels = Labels {
    locale: Locale::Ko,
    locale_name: "한국어",
    title: "🤖 리뷰 기반 페르소나 추천 시스템",
    sidebar_header: "👤 페르소나 생성기",
    input_caption: "자신에 대해 자유롭게 설명해주세요 (예: 선호 음식, 선호 분위기 등)",
    submit: "추천 받기 (Enter)",
    pending: "페르소나 분석 및 추천 진행 중... (서버 응답 대기)",
    welcome: "아래 입력창에 자신을 설명하고 Enter를 눌러 추천을 받아보세요.",
    persona_heading: "LLM이 분석한 페르소나",
    reason_heading: "추천 사유:",
    predicted_score: "예측 평점 (Our Score)",
    actual_rating: "실제 평점 (Actual Rating)",
    model_used: "사용 모델",
    top_k: "추천 개수",
    model: "모델",
    model_review: "리뷰 기반",
    model_hybrid: "하이브리드",
    role_user: "나",
    role_assistant: "추천 봇",
    unknown: "알 수 없음",
    not_available: "N/A",
    footer: "Enter: 전송 | F2: 언어 | F3: 모델 | F4/F5: 개수 | PgUp/PgDn: 스크롤 | Esc: 종료",
    error_server: "서버 오류 발생",
    error_server_body: "▼ 서버가 보낸 에러 메시지 ▼",
    error_connection_hint: "API 서버와 터널(ngrok)이 실행 중인지 확인하세요.",
    error_no_detail: "상세 정보 없음",
};

pub static EN: Labels = Labels {
    locale: Locale::En,
    locale_name: "English",
    title: "🤖 Review-Based Persona Recommender",
    sidebar_header: "👤 Persona Builder",
    input_caption: "Describe yourself freely (e.g. favourite food, preferred atmosphere)",
    submit: "Recommend (Enter)",
    pending: "Analysing persona and ranking restaurants... (waiting for server)",
    welcome: "Describe yourself in the input box below and press Enter to get recommendations.",
    persona_heading: "Persona analysed by the LLM",
    reason_heading: "Why this place:",
    predicted_score: "Predicted score",
    actual_rating: "Actual rating",
    model_used: "Model used",
    top_k: "Results",
    model: "Model",
    model_review: "Review",
    model_hybrid: "Hybrid",
    role_user: "You",
    role_assistant: "Recommender",
    unknown: "Unknown",
    not_available: "N/A",
    footer: "Enter: send | F2: language | F3: model | F4/F5: results | PgUp/PgDn: scroll | Esc: quit",
    error_server: "Server error",
    error_server_body: "▼ Error body sent by the server ▼",
    error_connection_hint: "Check that the API server and its tunnel (ngrok) are running.",
    error_no_detail: "no detail",
};

impl Labels {
    pub fn top_n(&self, n: usize) -> String {
        match self.locale {
            Locale::Ko => format!("페르소나 기반 Top {n} 추천"),
            Locale::En => format!("Top {n} recommendations for your persona"),
        }
    }

    pub fn model_name(&self, model: crate::types::ModelType) -> &'static str {
        match model {
            crate::types::ModelType::Review => self.model_review,
            crate::types::ModelType::Hybrid => self.model_hybrid,
        }
    }

    pub fn error_connection(&self, endpoint: &str) -> String {
        match self.locale {
            Locale::Ko => format!("서버({endpoint}) 연결에 실패했습니다."),
            Locale::En => format!("Failed to connect to the server ({endpoint})."),
        }
    }

    pub fn error_timeout(&self, endpoint: &str) -> String {
        match self.locale {
            Locale::Ko => format!("서버({endpoint}) 응답 시간이 초과되었습니다."),
            Locale::En => format!("The server ({endpoint}) did not answer in time."),
        }
    }

    pub fn error_invalid_body(&self, reason: &str) -> String {
        match self.locale {
            Locale::Ko => format!("서버 응답을 해석할 수 없습니다: {reason}"),
            Locale::En => format!("Could not read the server response: {reason}"),
        }
    }

    pub fn error_unexpected(&self, reason: &str) -> String {
        match self.locale {
            Locale::Ko => format!("예상치 못한 오류 발생: {reason}"),
            Locale::En => format!("Unexpected error: {reason}"),
        }
    }

    /// User-facing text for a failed turn
    pub fn describe_error(&self, error: &RecommendError) -> String {
        match error {
            RecommendError::Status {
                status,
                detail,
                body,
            } => {
                let detail = detail.as_deref().unwrap_or(self.error_no_detail);
                let mut text = format!("{} ({status}): {detail}", self.error_server);
                if !body.trim().is_empty() {
                    text.push('\n');
                    text.push_str(self.error_server_body);
                    text.push('\n');
                    text.push_str(body.trim());
                }
                text
            }
            RecommendError::Connection { endpoint, .. } => {
                format!("{}\n{}", self.error_connection(endpoint), self.error_connection_hint)
            }
            RecommendError::Timeout { endpoint } => self.error_timeout(endpoint),
            RecommendError::InvalidBody(reason) => self.error_invalid_body(reason),
            other => self.error_unexpected(&other.to_string()),
        }
    }
}
