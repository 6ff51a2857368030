//! Web-search style leads for unclassified queries.

use super::{usd, Draft};
use crate::query::OpportunityQuery;
use crate::types::{Category, KeyMetric, Opportunity, OpportunityType, RiskLevel};

const ANGLES: &[&str] = &[
    "Market Report",
    "Investor Guide",
    "Deal Roundup",
    "Emerging Opportunities",
    "Regional Outlook",
];

pub fn generate(source: &str, query: &OpportunityQuery, count: usize) -> Vec<Opportunity> {
    let mut draft = Draft::new(source, Category::General, query);
    let kind = OpportunityType::infer(&query.hint_text());
    let focus = draft.focus("Alternative Investments");
    let first = draft.pick(&[0usize, 1, 2, 3, 4]);

    (0..count)
        .map(|i| {
            let angle = ANGLES[(first + i) % ANGLES.len()];
            let location = draft.location();
            let funding = draft.funding(5_000.0, 150_000.0, 1_000.0);
            let roi = draft.between(5.0, 15.0);
            let slug: String = focus
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-");

            let title = format!("{focus} {angle}: {}", location.state);
            let description = format!(
                "Curated {} lead covering {} in {}. Typical entry tickets start near {}.",
                kind.category().label().to_lowercase(),
                focus.to_lowercase(),
                location.city,
                usd(funding),
            );

            let mut opp = draft.opportunity(i, title, description, kind);
            opp.estimated_roi = Some(roi);
            opp.risk_level = if roi > 12.0 {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            opp.investment_type = "Research Lead".to_owned();
            opp.time_horizon = "Varies".to_owned();
            opp.market_analysis = format!(
                "Search interest in {} is {} this quarter.",
                focus.to_lowercase(),
                draft.pick(&["climbing", "stable", "accelerating"]),
            );
            opp.key_metrics = vec![
                KeyMetric::new("Indicative Return", format!("{roi:.1}"), Some("%")),
                KeyMetric::new("Entry Ticket", usd(funding), None),
            ];
            opp.next_steps = vec![
                "Open the source article".to_owned(),
                "Refine the search with a category and budget".to_owned(),
            ];
            opp.source_url = Some(format!(
                "https://www.google.com/search?q={slug}+{}",
                angle.to_lowercase().replace(' ', "+")
            ));
            opp.location = Some(location);
            opp.estimated_funding_required = funding;
            opp
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_query_text() {
        let q = OpportunityQuery::new("misc", "vineyard rental homes");
        let results = generate("SerpApi", &q, 2);
        assert!(results.iter().all(|r| r.kind == OpportunityType::RealEstate));
        assert!(results[0].title.starts_with("Vineyard Rental Homes"));
    }

    #[test]
    fn blank_query_gets_generic_focus() {
        let q = OpportunityQuery::new("misc", "   ");
        let results = generate("SerpApi", &q, 1);
        assert!(results[0].title.starts_with("Alternative Investments"));
        assert_eq!(results[0].kind, OpportunityType::Business);
    }

    #[test]
    fn leads_have_distinct_source_urls() {
        let q = OpportunityQuery::new("misc", "art");
        let results = generate("SerpApi", &q, 3);
        let urls: std::collections::HashSet<_> =
            results.iter().filter_map(|r| r.source_url.clone()).collect();
        assert_eq!(urls.len(), 3);
    }
}
