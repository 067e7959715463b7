//! Wire types exchanged with the recommendation endpoint

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scoring model requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Review-text similarity only
    #[default]
    Review,
    /// Review similarity blended with collaborative signals
    Hybrid,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Review => Self::Hybrid,
            Self::Hybrid => Self::Review,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "review" => Ok(Self::Review),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown model type '{other}' (expected review or hybrid)")),
        }
    }
}

/// Request body for `POST /recommend-persona/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub free_text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model_type: Option<ModelType>,
}

impl RecommendRequest {
    pub fn new(free_text: impl Into<String>) -> Self {
        Self {
            free_text: free_text.into(),
            top_k: None,
            model_type: None,
        }
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = Some(model_type);
        self
    }
}

/// Preference summary inferred by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Persona {
    #[serde(default, deserialize_with = "null_as_default")]
    pub preference_text: String,

    /// Any other persona fields the service sends back
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One ranked restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub predicted_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<f64>,
}

/// Python backends send `None` as `null`; treat it like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Successful response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub persona: Persona,
    pub recs: Vec<RecommendationItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_absent_options() {
        let body = serde_json::to_value(RecommendRequest::new("spicy noodles")).unwrap();
        assert_eq!(body, json!({ "free_text": "spicy noodles" }));
    }

    #[test]
    fn request_carries_top_k_and_model() {
        let request = RecommendRequest::new("quiet cafe")
            .with_top_k(3)
            .with_model_type(ModelType::Hybrid);
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(
            body,
            json!({ "free_text": "quiet cafe", "top_k": 3, "model_type": "hybrid" })
        );
    }

    #[test]
    fn result_tolerates_missing_item_fields() {
        let raw = json!({
            "persona": { "preference_text": "likes brunch", "budget": "low" },
            "recs": [ { "name": "Cafe A", "predicted_score": 4.25 } ]
        });
        let result: RecommendationResult = serde_json::from_value(raw).unwrap();

        assert_eq!(result.persona.preference_text, "likes brunch");
        assert_eq!(result.persona.extra.get("budget"), Some(&json!("low")));
        assert_eq!(result.recs[0].city, "");
        assert_eq!(result.recs[0].stars, None);
        assert!(result.model_used.is_none());
    }

    #[test]
    fn result_tolerates_null_item_fields() {
        let raw = json!({
            "persona": { "preference_text": null },
            "recs": [{
                "name": null,
                "city": null,
                "categories": null,
                "explanation": null,
                "predicted_score": null,
                "stars": null
            }]
        });
        let result: RecommendationResult = serde_json::from_value(raw).unwrap();

        let item = &result.recs[0];
        assert_eq!(item.name, "");
        assert_eq!(item.city, "");
        assert_eq!(item.categories, "");
        assert_eq!(item.explanation, "");
        assert_eq!(item.predicted_score, 0.0);
        assert_eq!(item.stars, None);
        assert_eq!(result.persona.preference_text, "");
    }

    #[test]
    fn result_requires_recs() {
        let raw = json!({ "persona": { "preference_text": "x" } });
        assert!(serde_json::from_value::<RecommendationResult>(raw).is_err());
    }

    #[test]
    fn model_type_parses_and_toggles() {
        assert_eq!("Hybrid".parse::<ModelType>().unwrap(), ModelType::Hybrid);
        assert!("vector".parse::<ModelType>().is_err());
        assert_eq!(ModelType::Review.toggle(), ModelType::Hybrid);
        assert_eq!(ModelType::Hybrid.toggle(), ModelType::Review);
    }
}
