//! Core types for normalised investment opportunities and query categories.
//!
//! [`Opportunity`] is the universal result shape handed back to callers.
//! Field names serialise in camelCase because the consuming UI reads them
//! directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Investment category a query is routed by.
///
/// Anything that does not parse to one of the specific categories is
/// [`Category::General`], which takes the diversified fallback route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Residential and commercial property.
    RealEstate,
    /// Listed equities.
    Stocks,
    /// Metals, energy and agricultural commodities.
    Commodities,
    /// Energy projects (solar, wind, storage, royalties).
    Energy,
    /// Businesses for sale and private ventures.
    Business,
    /// Unclassified; routed through general search plus every category.
    General,
}

impl Category {
    /// Parse a free-form category string (case-insensitive).
    ///
    /// Never fails: unrecognised input maps to [`Category::General`].
    pub fn parse(raw: &str) -> Self {
        let normalised: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();
        match normalised.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "real estate" | "realestate" | "property" | "properties" => Self::RealEstate,
            "stocks" | "stock" | "equities" | "equity" => Self::Stocks,
            "commodities" | "commodity" => Self::Commodities,
            "energy" => Self::Energy,
            "business" | "businesses" => Self::Business,
            _ => Self::General,
        }
    }

    /// Human-readable label, also used as [`Opportunity::category`].
    pub fn label(&self) -> &'static str {
        match self {
            Self::RealEstate => "Real Estate",
            Self::Stocks => "Stocks",
            Self::Commodities => "Commodities",
            Self::Energy => "Energy",
            Self::Business => "Business",
            Self::General => "General",
        }
    }

    /// Stable machine key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::RealEstate => "real_estate",
            Self::Stocks => "stocks",
            Self::Commodities => "commodities",
            Self::Energy => "energy",
            Self::Business => "business",
            Self::General => "general",
        }
    }

    /// The category-specific routes, in fan-out order.
    pub fn specific() -> &'static [Category] {
        &[
            Self::RealEstate,
            Self::Stocks,
            Self::Commodities,
            Self::Energy,
            Self::Business,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed set of opportunity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    RealEstate,
    Business,
    Commodity,
    Stock,
    Startup,
    Energy,
}

impl OpportunityType {
    /// Category label an opportunity of this kind is filed under.
    pub fn category(&self) -> Category {
        match self {
            Self::RealEstate => Category::RealEstate,
            Self::Business | Self::Startup => Category::Business,
            Self::Commodity => Category::Commodities,
            Self::Stock => Category::Stocks,
            Self::Energy => Category::Energy,
        }
    }

    /// Best-effort guess of the kind from free text. Defaults to business.
    pub fn infer(text: &str) -> Self {
        let text = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));
        if has(&["real estate", "property", "rental", "apartment", "duplex", "home"]) {
            Self::RealEstate
        } else if has(&["stock", "shares", "equity", "etf", "nasdaq", "nyse"]) {
            Self::Stock
        } else if has(&["solar", "wind", "battery", "energy", "power"]) {
            Self::Energy
        } else if has(&["gold", "silver", "oil", "commodit", "wheat", "copper"]) {
            Self::Commodity
        } else if has(&["startup", "seed round", "venture"]) {
            Self::Startup
        } else {
            Self::Business
        }
    }
}

/// Risk band attached to every opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// How fresh the underlying data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFreshness {
    /// Pulled from a live provider during this request.
    RealTime,
    /// Provider data published on a daily or slower cadence.
    Daily,
    /// Generated locally because the provider was unavailable.
    Synthetic,
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Structured address of an opportunity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// A US city/state location with no street address.
    pub fn city_state(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: "US".to_owned(),
            ..Self::default()
        }
    }
}

/// A labelled figure shown on the opportunity card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl KeyMetric {
    pub fn new(label: impl Into<String>, value: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: unit.map(str::to_owned),
        }
    }
}

/// Who to contact about an opportunity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A normalised, investable opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Display category, e.g. `"Real Estate"`.
    pub category: String,
    #[serde(rename = "type")]
    pub kind: OpportunityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Estimated annual return in percent.
    #[serde(rename = "estimatedROI", default, skip_serializing_if = "Option::is_none")]
    pub estimated_roi: Option<f64>,
    /// Estimated monthly cash flow in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub risk_level: RiskLevel,
    pub investment_type: String,
    pub time_horizon: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub market_analysis: String,
    #[serde(default)]
    pub key_metrics: Vec<KeyMetric>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    /// Provider that produced this opportunity.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub data_freshness: DataFreshness,
    pub proposal_ready: bool,
    pub estimated_funding_required: f64,
    /// Transient ranking score in `[0.0, 1.0]`; only meaningful after scoring.
    #[serde(default)]
    pub relevance_score: f64,
}

impl Opportunity {
    /// Start an opportunity with neutral defaults for every optional field.
    ///
    /// The display category is derived from `kind`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: OpportunityType,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category: kind.category().label().to_owned(),
            kind,
            price: None,
            estimated_roi: None,
            cash_flow: None,
            market_value: None,
            location: None,
            risk_level: RiskLevel::Medium,
            investment_type: String::new(),
            time_horizon: String::new(),
            images: Vec::new(),
            market_analysis: String::new(),
            key_metrics: Vec::new(),
            next_steps: Vec::new(),
            contact_info: None,
            source: source.into(),
            source_url: None,
            data_freshness: DataFreshness::RealTime,
            proposal_ready: false,
            estimated_funding_required: 0.0,
            relevance_score: 0.0,
        }
    }
}
