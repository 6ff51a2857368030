//! Relevance scoring against the originating query.
//!
//! Additive signals, capped at 1.0:
//!
//! | Signal | Weight |
//! |---|---|
//! | each query term found in the title | 0.3 |
//! | each query term found in the description | 0.2 |
//! | result category contains the query category | 0.2 |
//! | funding required within the budget range | 0.2 |
//! | location matches the result's city or state | 0.1 |
//!
//! Term matches are case-insensitive substring matches.

use std::cmp::Ordering;

use crate::query::OpportunityQuery;
use crate::types::Opportunity;

const TITLE_TERM: f64 = 0.3;
const DESCRIPTION_TERM: f64 = 0.2;
const CATEGORY_MATCH: f64 = 0.2;
const BUDGET_MATCH: f64 = 0.2;
const LOCATION_MATCH: f64 = 0.1;

/// Relevance of one opportunity in `[0.0, 1.0]`.
pub fn relevance(opportunity: &Opportunity, query: &OpportunityQuery) -> f64 {
    let terms = query.terms();
    relevance_with_terms(opportunity, query, &terms)
}

fn relevance_with_terms(opportunity: &Opportunity, query: &OpportunityQuery, terms: &[String]) -> f64 {
    let title = opportunity.title.to_lowercase();
    let description = opportunity.description.to_lowercase();

    let mut score = 0.0;
    for term in terms {
        if title.contains(term.as_str()) {
            score += TITLE_TERM;
        }
        if description.contains(term.as_str()) {
            score += DESCRIPTION_TERM;
        }
    }

    let category = query.category.trim().to_lowercase();
    if !category.is_empty() && opportunity.category.to_lowercase().contains(&category) {
        score += CATEGORY_MATCH;
    }

    if query
        .budget_range
        .is_some_and(|b| b.contains(opportunity.estimated_funding_required))
    {
        score += BUDGET_MATCH;
    }

    if location_matches(opportunity, query) {
        score += LOCATION_MATCH;
    }

    score.clamp(0.0, 1.0)
}

/// The query location matches when the result's city or state contains the
/// whole location string, or when any comma-separated part of it equals the
/// city or state. `"Austin, TX"` therefore matches a result in Austin and
/// one elsewhere in TX.
fn location_matches(opportunity: &Opportunity, query: &OpportunityQuery) -> bool {
    let Some(wanted) = query
        .location
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
    else {
        return false;
    };
    let Some(location) = &opportunity.location else {
        return false;
    };
    let city = location.city.trim().to_lowercase();
    let state = location.state.trim().to_lowercase();
    let fields = [city, state];
    let fields: Vec<&String> = fields.iter().filter(|f| !f.is_empty()).collect();

    fields.iter().any(|f| f.contains(wanted.as_str()))
        || wanted
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .any(|part| fields.iter().any(|f| f.as_str() == part))
}

/// Annotate every opportunity with its relevance and sort descending.
///
/// The sort is stable: ties keep their incoming (provider declaration)
/// order.
pub fn score(mut results: Vec<Opportunity>, query: &OpportunityQuery) -> Vec<Opportunity> {
    let terms = query.terms();
    for opportunity in &mut results {
        opportunity.relevance_score = relevance_with_terms(opportunity, query, &terms);
    }
    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, OpportunityType};

    fn make(title: &str, description: &str, kind: OpportunityType) -> Opportunity {
        Opportunity::new(title.to_lowercase(), title, description, kind, "Test")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn title_terms_weigh_more_than_description_terms() {
        let q = OpportunityQuery::new("other", "duplex");
        let in_title = make("Duplex in Tampa", "", OpportunityType::RealEstate);
        let in_description = make("Tampa rental", "A duplex", OpportunityType::RealEstate);
        assert!(approx(relevance(&in_title, &q), 0.3));
        assert!(approx(relevance(&in_description, &q), 0.2));
    }

    #[test]
    fn category_bonus_is_case_insensitive_containment() {
        let q = OpportunityQuery::new("REAL ESTATE", "nothing-matches");
        let opp = make("Home", "", OpportunityType::RealEstate);
        assert!(approx(relevance(&opp, &q), 0.2));
        let q = OpportunityQuery::new("stocks", "nothing-matches");
        assert!(approx(relevance(&opp, &q), 0.0));
    }

    #[test]
    fn budget_bonus_only_within_bounds() {
        let q = OpportunityQuery::new("x", "zzz").with_budget(50_000.0, 100_000.0);
        let mut opp = make("Deal", "", OpportunityType::Business);
        for (funding, expected) in [(50_000.0, 0.2), (100_000.0, 0.2), (49_999.0, 0.0), (100_001.0, 0.0)] {
            opp.estimated_funding_required = funding;
            assert!(approx(relevance(&opp, &q), expected), "{funding}");
        }
    }

    #[test]
    fn location_matches_city_or_state_part() {
        let q = OpportunityQuery::new("x", "zzz").with_location("Austin, TX");
        let mut opp = make("Deal", "", OpportunityType::RealEstate);
        opp.location = Some(Location::city_state("Austin", "TX"));
        assert!(approx(relevance(&opp, &q), 0.1));
        opp.location = Some(Location::city_state("Dallas", "TX"));
        assert!(approx(relevance(&opp, &q), 0.1));
        opp.location = Some(Location::city_state("Denver", "CO"));
        assert!(approx(relevance(&opp, &q), 0.0));
        opp.location = None;
        assert!(approx(relevance(&opp, &q), 0.0));
    }

    #[test]
    fn bare_state_location_matches() {
        let q = OpportunityQuery::new("x", "zzz").with_location("fl");
        let mut opp = make("Deal", "", OpportunityType::Business);
        opp.location = Some(Location::city_state("Tampa", "FL"));
        assert!(approx(relevance(&opp, &q), 0.1));
    }

    #[test]
    fn score_is_capped_at_one() {
        let q = OpportunityQuery::new("stocks", "ai chip growth leader").with_budget(0.0, 1e9);
        let opp = make(
            "AI chip growth leader",
            "ai chip growth leader",
            OpportunityType::Stock,
        );
        assert!(approx(relevance(&opp, &q), 1.0));
    }

    #[test]
    fn score_is_monotonic_in_title_overlap() {
        let q = OpportunityQuery::new("x", "solar farm texas");
        let scores: Vec<f64> = ["Wind park", "Solar park", "Solar farm", "Solar farm Texas"]
            .iter()
            .map(|t| relevance(&make(t, "", OpportunityType::Energy), &q))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{scores:?}");
    }

    #[test]
    fn score_sorts_descending_and_keeps_tie_order() {
        let q = OpportunityQuery::new("x", "laundromat");
        let results = vec![
            make("Car wash A", "", OpportunityType::Business),
            make("Laundromat", "", OpportunityType::Business),
            make("Car wash B", "", OpportunityType::Business),
        ];
        let scored = score(results, &q);
        let titles: Vec<_> = scored.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Laundromat", "Car wash A", "Car wash B"]);
        assert!(scored.iter().all(|o| (0.0..=1.0).contains(&o.relevance_score)));
    }

    #[test]
    fn scoring_is_deterministic() {
        let q = OpportunityQuery::new("business", "coffee shop");
        let results = vec![
            make("Coffee Shop", "busy corner", OpportunityType::Business),
            make("Bakery", "coffee and bread", OpportunityType::Business),
        ];
        assert_eq!(score(results.clone(), &q), score(results, &q));
    }
}
