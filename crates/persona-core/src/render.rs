//! Transcript to presentation lines
//!
//! Rendering is UI-agnostic: every message becomes a list of styled text
//! lines. The terminal front-ends decide what each [`LineStyle`] looks like.

use crate::i18n::Labels;
use crate::transcript::{Message, MessageContent, Role, Transcript};
use crate::types::{RecommendationItem, RecommendationResult};

/// Longest category string shown under a recommendation, in characters
pub const MAX_CATEGORY_CHARS: usize = 100;

/// Visual role of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    /// Speaker label ("You", "Recommender")
    Role,
    Body,
    Heading,
    Caption,
    /// Quoted explanation line
    Quote,
    /// Score readout
    Metric,
    Error,
    Separator,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub style: LineStyle,
    pub text: String,
}

impl RenderedLine {
    pub fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(LineStyle::Blank, String::new())
    }
}

/// Render the whole transcript, one blank line between messages.
pub fn render_transcript(transcript: &Transcript, labels: &Labels) -> Vec<RenderedLine> {
    let mut lines = Vec::new();
    for (index, message) in transcript.messages().iter().enumerate() {
        if index > 0 {
            lines.push(RenderedLine::blank());
        }
        lines.extend(render_message(message, labels));
    }
    lines
}

pub fn render_message(message: &Message, labels: &Labels) -> Vec<RenderedLine> {
    let speaker = match message.role {
        Role::User => labels.role_user,
        Role::Assistant => labels.role_assistant,
    };
    let mut lines = vec![RenderedLine::new(LineStyle::Role, speaker)];

    match &message.content {
        MessageContent::Text(text) => {
            lines.extend(text.lines().map(|line| RenderedLine::new(LineStyle::Body, line)));
        }
        MessageContent::Error(text) => {
            lines.extend(text.lines().map(|line| RenderedLine::new(LineStyle::Error, line)));
        }
        MessageContent::Recommendation(result) => {
            lines.extend(render_result(result, labels));
        }
    }

    lines
}

fn render_result(result: &RecommendationResult, labels: &Labels) -> Vec<RenderedLine> {
    let mut lines = vec![RenderedLine::new(LineStyle::Heading, labels.persona_heading)];

    if !result.persona.preference_text.trim().is_empty() {
        lines.extend(
            result
                .persona
                .preference_text
                .lines()
                .map(|line| RenderedLine::new(LineStyle::Body, line)),
        );
    }

    let mut extra: Vec<_> = result.persona.extra.iter().collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in extra {
        let value = match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        lines.push(RenderedLine::new(LineStyle::Body, format!("{key}: {value}")));
    }

    if let Some(model) = result.model_used.as_deref() {
        lines.push(RenderedLine::new(
            LineStyle::Caption,
            format!("{}: {model}", labels.model_used),
        ));
    }

    lines.push(RenderedLine::blank());
    lines.push(RenderedLine::new(
        LineStyle::Heading,
        labels.top_n(result.recs.len()),
    ));

    for (index, item) in result.recs.iter().enumerate() {
        lines.extend(render_item(index + 1, item, labels));
    }

    lines
}

fn render_item(rank: usize, item: &RecommendationItem, labels: &Labels) -> Vec<RenderedLine> {
    let name = non_empty_or(&item.name, labels.unknown);
    let city = non_empty_or(&item.city, labels.unknown);
    let categories = non_empty_or(&item.categories, labels.not_available);

    let mut lines = vec![
        RenderedLine::new(LineStyle::Separator, "---"),
        RenderedLine::new(LineStyle::Heading, format!("#{rank}: {name}")),
        RenderedLine::new(
            LineStyle::Caption,
            format!("{city} | {}", truncate_chars(categories, MAX_CATEGORY_CHARS)),
        ),
        RenderedLine::new(LineStyle::Body, labels.reason_heading),
    ];

    lines.extend(
        item.explanation
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| RenderedLine::new(LineStyle::Quote, format!("> {line}"))),
    );

    lines.push(RenderedLine::new(
        LineStyle::Metric,
        format!("{}: {:.2} / 5.0", labels.predicted_score, item.predicted_score),
    ));
    if let Some(stars) = item.stars {
        lines.push(RenderedLine::new(
            LineStyle::Metric,
            format!("{}: {:.1} / 5.0", labels.actual_rating, stars),
        ));
    }

    lines
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::types::Persona;
    use proptest::prelude::*;

    fn item(name: &str, explanation: &str, stars: Option<f64>) -> RecommendationItem {
        RecommendationItem {
            name: name.to_string(),
            city: "Seoul".to_string(),
            categories: "Korean, BBQ".to_string(),
            explanation: explanation.to_string(),
            predicted_score: 4.3,
            stars,
        }
    }

    fn result_with(recs: Vec<RecommendationItem>) -> RecommendationResult {
        RecommendationResult {
            persona: Persona {
                preference_text: "Enjoys grilled meat with friends".to_string(),
                ..Default::default()
            },
            recs,
            model_used: Some("hybrid".to_string()),
        }
    }

    fn texts(lines: &[RenderedLine], style: LineStyle) -> Vec<String> {
        lines
            .iter()
            .filter(|l| l.style == style)
            .map(|l| l.text.clone())
            .collect()
    }

    #[test]
    fn renders_items_with_rank_scores_and_quotes() {
        let mut transcript = Transcript::new();
        transcript.push_result(result_with(vec![
            item("Maple BBQ", "Great for groups\n\n  Open late  ", Some(4.5)),
            item("Noodle Bar", "", None),
        ]));

        let lines = render_transcript(&transcript, Locale::En.labels());

        let headings = texts(&lines, LineStyle::Heading);
        assert_eq!(
            headings,
            vec![
                "Persona analysed by the LLM",
                "Top 2 recommendations for your persona",
                "#1: Maple BBQ",
                "#2: Noodle Bar",
            ]
        );
        assert_eq!(
            texts(&lines, LineStyle::Quote),
            vec!["> Great for groups", "> Open late"]
        );
        assert_eq!(
            texts(&lines, LineStyle::Metric),
            vec![
                "Predicted score: 4.30 / 5.0",
                "Actual rating: 4.5 / 5.0",
                "Predicted score: 4.30 / 5.0",
            ]
        );
        assert!(texts(&lines, LineStyle::Caption).contains(&"Model used: hybrid".to_string()));
    }

    #[test]
    fn missing_fields_use_locale_fallbacks() {
        let mut blank = item("", "", None);
        blank.city.clear();
        blank.categories.clear();

        let mut transcript = Transcript::new();
        transcript.push_result(result_with(vec![blank]));
        let lines = render_transcript(&transcript, Locale::Ko.labels());

        assert!(texts(&lines, LineStyle::Heading).contains(&"#1: 알 수 없음".to_string()));
        assert!(texts(&lines, LineStyle::Caption).contains(&"알 수 없음 | N/A".to_string()));
    }

    #[test]
    fn empty_recs_render_zero_heading() {
        let mut transcript = Transcript::new();
        transcript.push_result(result_with(Vec::new()));
        let lines = render_transcript(&transcript, Locale::En.labels());

        assert!(texts(&lines, LineStyle::Heading)
            .contains(&"Top 0 recommendations for your persona".to_string()));
        assert!(texts(&lines, LineStyle::Separator).is_empty());
    }

    #[test]
    fn persona_extra_fields_are_sorted() {
        let mut result = result_with(Vec::new());
        result.persona.extra.insert("zone".into(), serde_json::json!("downtown"));
        result.persona.extra.insert("budget".into(), serde_json::json!(2));

        let mut transcript = Transcript::new();
        transcript.push_result(result);
        let lines = render_transcript(&transcript, Locale::En.labels());
        let body = texts(&lines, LineStyle::Body);

        let budget = body.iter().position(|l| l == "budget: 2").unwrap();
        let zone = body.iter().position(|l| l == "zone: downtown").unwrap();
        assert!(budget < zone);
    }

    #[test]
    fn error_and_user_messages_keep_their_lines() {
        let mut transcript = Transcript::new();
        transcript.push_user("spicy\nand cheap");
        transcript.push_error("Server error (500): boom\nbody", Some(Locale::En));
        let lines = render_transcript(&transcript, Locale::En.labels());

        assert_eq!(texts(&lines, LineStyle::Role), vec!["You", "Recommender"]);
        assert_eq!(texts(&lines, LineStyle::Body), vec!["spicy", "and cheap"]);
        assert_eq!(texts(&lines, LineStyle::Error).len(), 2);
        assert_eq!(texts(&lines, LineStyle::Blank).len(), 1);
    }

    #[test]
    fn long_categories_are_cut_at_char_boundary() {
        let categories = "한식".repeat(80);
        assert_eq!(truncate_chars(&categories, MAX_CATEGORY_CHARS).chars().count(), 100);
    }

    proptest! {
        #[test]
        fn truncate_never_exceeds_limit(text in ".{0,300}", max in 0usize..150) {
            let cut = truncate_chars(&text, max);
            prop_assert!(cut.chars().count() <= max);
            prop_assert!(text.starts_with(cut));
            if text.chars().count() <= max {
                prop_assert_eq!(cut, text.as_str());
            }
        }
    }
}
