//! Deterministic synthetic opportunity generators.
//!
//! These are the degraded-mode output of every adapter and the last-resort
//! output of every route. They are production behaviour, so they must be:
//!
//! - **Deterministic**: the same query and source always produce the same
//!   results within a process run (seeded [`StdRng`], no clock or entropy).
//! - **Query-sensitive**: location, budget range, and guided answers shape
//!   titles, descriptions, and figures.

pub mod business;
pub mod commodities;
pub mod energy;
pub mod general;
pub mod real_estate;
pub mod stocks;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::query::OpportunityQuery;
use crate::types::{Category, DataFreshness, Location, Opportunity, OpportunityType};

/// Source label for route-level fallback output, when no provider spoke.
pub const FALLBACK_SOURCE: &str = "CF1 Market Intelligence";

/// US metros used when the query carries no location.
const MARKETS: &[(&str, &str)] = &[
    ("Austin", "TX"),
    ("Dallas", "TX"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("Tampa", "FL"),
    ("Orlando", "FL"),
    ("Atlanta", "GA"),
    ("Charlotte", "NC"),
    ("Raleigh", "NC"),
    ("Nashville", "TN"),
    ("Denver", "CO"),
    ("Columbus", "OH"),
    ("Indianapolis", "IN"),
    ("Kansas City", "MO"),
    ("Salt Lake City", "UT"),
    ("Boise", "ID"),
];

/// Generate `count` results for `category` with each category's default
/// flavour. Used by route fallbacks and the general route.
pub fn generate(
    category: Category,
    source: &str,
    query: &OpportunityQuery,
    count: usize,
) -> Vec<Opportunity> {
    match category {
        Category::RealEstate => real_estate::generate(None, source, query, count),
        Category::Stocks => stocks::generate(source, query, count),
        Category::Commodities => commodities::generate(commodities::Vehicle::Spot, source, query, count),
        Category::Energy => energy::generate(source, query, count),
        Category::Business => business::generate(business::Channel::Marketplace, source, query, count),
        Category::General => general::generate(source, query, count),
    }
}

/// Per-call generation state: the seeded RNG plus query-derived helpers.
pub(crate) struct Draft<'a> {
    pub query: &'a OpportunityQuery,
    pub source: &'a str,
    pub rng: StdRng,
    prefix: String,
}

impl<'a> Draft<'a> {
    pub fn new(source: &'a str, category: Category, query: &'a OpportunityQuery) -> Self {
        let seed = seed_for(source, category, query);
        let prefix = format!("{}-{}-{seed:016x}", slug(source), category.key());
        Self {
            query,
            source,
            rng: StdRng::seed_from_u64(seed),
            prefix,
        }
    }

    /// Start a synthetic opportunity with a stable id for `index`.
    pub fn opportunity(
        &self,
        index: usize,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: OpportunityType,
    ) -> Opportunity {
        let mut opp = Opportunity::new(
            format!("{}-{index}", self.prefix),
            title,
            description,
            kind,
            self.source,
        );
        opp.data_freshness = DataFreshness::Synthetic;
        opp
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())]
    }

    /// Uniform value in `[lo, hi]`, rounded to one decimal place.
    pub fn between(&mut self, lo: f64, hi: f64) -> f64 {
        round_to(self.rng.gen_range(lo..=hi), 0.1)
    }

    /// Location from the query when present, otherwise a default market.
    pub fn location(&mut self) -> Location {
        match self.query.parsed_location() {
            Some(parsed) => {
                let state = parsed.state.unwrap_or_default();
                let city = match parsed.city {
                    Some(city) => city,
                    None => MARKETS
                        .iter()
                        .find(|(_, st)| st.eq_ignore_ascii_case(&state))
                        .map_or_else(|| format!("{state} Metro"), |(c, _)| (*c).to_owned()),
                };
                Location::city_state(city, state)
            }
            None => {
                let (city, state) = self.pick(MARKETS);
                Location::city_state(city, state)
            }
        }
    }

    /// Capital required, inside the query's budget range when it has a usable
    /// one, otherwise inside `[lo, hi]`. Rounded to `step`.
    pub fn funding(&mut self, lo: f64, hi: f64, step: f64) -> f64 {
        let (lo, hi) = match self.query.budget_range {
            Some(b) if b.min.is_finite() && b.max.is_finite() && b.min <= b.max && b.max > 0.0 => {
                (b.min.max(0.0), b.max)
            }
            _ => (lo, hi),
        };
        round_to(self.rng.gen_range(lo..=hi), step).clamp(lo, hi)
    }

    /// The query text tidied for display, or `fallback` when blank.
    pub fn focus(&self, fallback: &str) -> String {
        let text = self.query.terms().join(" ");
        if text.is_empty() {
            fallback.to_owned()
        } else {
            title_case(&text)
        }
    }
}

fn seed_for(source: &str, category: Category, query: &OpportunityQuery) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    category.hash(&mut hasher);
    query.query.trim().to_lowercase().hash(&mut hasher);
    query
        .location
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .hash(&mut hasher);
    if let Some(budget) = query.budget_range {
        budget.min.to_bits().hash(&mut hasher);
        budget.max.to_bits().hash(&mut hasher);
    }
    for answer in &query.guided_answers {
        answer.question_id.to_lowercase().hash(&mut hasher);
        for text in answer.value.texts() {
            text.to_lowercase().hash(&mut hasher);
        }
        if let Some(n) = answer.value.as_number() {
            n.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

pub(crate) fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_owned()
}

pub(crate) fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `$1,234,567` style formatting for metric values.
pub(crate) fn usd(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
