//! The structured opportunity query accepted by the search pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Category;

/// Inclusive budget bounds in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    /// Returns `true` if `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Answer to a guided-search question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    Choices(Vec<String>),
}

impl AnswerValue {
    /// Textual parts of this answer (empty for numbers).
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Number(_) => Vec::new(),
            Self::Text(text) => vec![text.as_str()],
            Self::Choices(choices) => choices.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Choices(_) => None,
        }
    }
}

/// One guided-search answer, keyed by question id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidedAnswer {
    pub question_id: String,
    pub value: AnswerValue,
}

/// An investment-opportunity search request.
///
/// `category` and `query` are always present; everything else refines
/// scoring and synthetic generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityQuery {
    pub category: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<BudgetRange>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_filters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guided_answers: Vec<GuidedAnswer>,
}

/// A `"City, ST"` location split into parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    pub city: Option<String>,
    pub state: Option<String>,
}

impl OpportunityQuery {
    pub fn new(category: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_budget(mut self, min: f64, max: f64) -> Self {
        self.budget_range = Some(BudgetRange { min, max });
        self
    }

    pub fn with_answer(mut self, question_id: impl Into<String>, value: AnswerValue) -> Self {
        self.guided_answers.push(GuidedAnswer {
            question_id: question_id.into(),
            value,
        });
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional_filters.insert(key.into(), value);
        self
    }

    /// The routing category parsed from the free-form `category` string.
    pub fn category_kind(&self) -> Category {
        Category::parse(&self.category)
    }

    /// Lowercased, whitespace-split search terms.
    pub fn terms(&self) -> Vec<String> {
        self.query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    /// Returns `true` if `term` is one of the query's search terms.
    pub fn has_term(&self, term: &str) -> bool {
        self.terms().iter().any(|t| t == term)
    }

    /// First answer whose question id matches any of `ids` (case-insensitive).
    pub fn answer(&self, ids: &[&str]) -> Option<&AnswerValue> {
        self.guided_answers
            .iter()
            .find(|a| ids.iter().any(|id| a.question_id.eq_ignore_ascii_case(id)))
            .map(|a| &a.value)
    }

    /// First textual answer for any of `ids`, lowercased.
    pub fn answer_text(&self, ids: &[&str]) -> Option<String> {
        self.answer(ids)
            .and_then(|v| v.texts().first().map(|t| t.to_lowercase()))
    }

    /// Returns `true` if any keyword appears in the query text, a guided
    /// answer, or a string-valued filter (case-insensitive substring).
    pub fn mentions(&self, keywords: &[&str]) -> bool {
        let haystack = self.hint_text();
        keywords.iter().any(|k| haystack.contains(&k.to_lowercase()))
    }

    /// All free text attached to the query, lowercased and space-joined.
    pub fn hint_text(&self) -> String {
        let mut parts: Vec<String> = vec![self.query.to_lowercase()];
        for answer in &self.guided_answers {
            parts.extend(answer.value.texts().iter().map(|t| t.to_lowercase()));
        }
        for value in self.additional_filters.values() {
            if let Some(text) = value.as_str() {
                parts.push(text.to_lowercase());
            }
        }
        parts.join(" ")
    }

    /// Split `location` into city and state.
    ///
    /// `"Austin, TX"` yields both parts; a lone two-letter token is treated
    /// as a state, anything else as a city.
    pub fn parsed_location(&self) -> Option<ParsedLocation> {
        let raw = self.location.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let mut parts = raw.split(',').map(str::trim).filter(|p| !p.is_empty());
        let first = parts.next()?.to_owned();
        match parts.next() {
            Some(state) => Some(ParsedLocation {
                city: Some(first),
                state: Some(state.to_owned()),
            }),
            None if first.len() == 2 && first.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(ParsedLocation {
                    city: None,
                    state: Some(first.to_uppercase()),
                })
            }
            None => Some(ParsedLocation {
                city: Some(first),
                state: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_lowercased_and_split() {
        let q = OpportunityQuery::new("stocks", "  AI   Chip makers ");
        assert_eq!(q.terms(), vec!["ai", "chip", "makers"]);
        assert!(q.has_term("ai"));
        assert!(!q.has_term("a"));
    }

    #[test]
    fn budget_range_is_inclusive() {
        let budget = BudgetRange {
            min: 100.0,
            max: 200.0,
        };
        assert!(budget.contains(100.0));
        assert!(budget.contains(200.0));
        assert!(!budget.contains(99.99));
        assert!(!budget.contains(200.01));
    }

    #[test]
    fn parsed_location_city_and_state() {
        let q = OpportunityQuery::new("real estate", "rental").with_location("Austin, TX");
        let loc = q.parsed_location().expect("location");
        assert_eq!(loc.city.as_deref(), Some("Austin"));
        assert_eq!(loc.state.as_deref(), Some("TX"));
    }

    #[test]
    fn parsed_location_state_only() {
        let q = OpportunityQuery::new("energy", "solar").with_location("tx");
        let loc = q.parsed_location().expect("location");
        assert!(loc.city.is_none());
        assert_eq!(loc.state.as_deref(), Some("TX"));
    }

    #[test]
    fn parsed_location_blank_is_none() {
        let q = OpportunityQuery::new("energy", "solar").with_location("   ");
        assert!(q.parsed_location().is_none());
    }

    #[test]
    fn answers_feed_mentions() {
        let q = OpportunityQuery::new("real estate", "investment").with_answer(
            "propertyType",
            AnswerValue::Choices(vec!["Vacation Rental".into(), "Condo".into()]),
        );
        assert!(q.mentions(&["vacation"]));
        assert_eq!(q.answer_text(&["property_type", "propertytype"]).as_deref(), Some("vacation rental"));
    }

    #[test]
    fn answer_value_deserialises_untagged() {
        let n: AnswerValue = serde_json::from_str("250000").expect("number");
        assert_eq!(n.as_number(), Some(250_000.0));
        let t: AnswerValue = serde_json::from_str("\"high\"").expect("text");
        assert_eq!(t.texts(), vec!["high"]);
        let c: AnswerValue = serde_json::from_str("[\"a\",\"b\"]").expect("choices");
        assert_eq!(c.texts(), vec!["a", "b"]);
    }

    #[test]
    fn query_deserialises_from_ui_shape() {
        let json = r#"{
            "category": "real estate",
            "query": "duplex",
            "budgetRange": {"min": 100000, "max": 400000},
            "guidedAnswers": [{"questionId": "cashFlow", "value": "positive"}]
        }"#;
        let q: OpportunityQuery = serde_json::from_str(json).expect("query");
        assert_eq!(q.category_kind(), Category::RealEstate);
        assert!(q.budget_range.is_some());
        assert_eq!(q.guided_answers.len(), 1);
        assert!(q.location.is_none());
    }
}
