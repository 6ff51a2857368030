//! Removal of duplicate opportunities from concatenated route output.
//!
//! Providers that serve overlapping inventory (LoopNet on both the real
//! estate and business routes, SerpApi surfacing listing pages) can return
//! the same opportunity twice. The first occurrence wins so provider
//! declaration order is preserved.

use std::collections::HashSet;

use crate::types::Opportunity;

use super::url_normalize::normalize_url;

/// Identity of an opportunity: its normalised source URL, or its id when it
/// has no URL.
pub fn dedup_key(opportunity: &Opportunity) -> String {
    match opportunity.source_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => format!("url:{}", normalize_url(url)),
        _ => format!("id:{}", opportunity.id),
    }
}

/// Drop later duplicates, keeping input order.
pub fn deduplicate(results: Vec<Opportunity>) -> Vec<Opportunity> {
    let mut seen = HashSet::with_capacity(results.len());
    let before = results.len();
    let kept: Vec<Opportunity> = results
        .into_iter()
        .filter(|opp| seen.insert(dedup_key(opp)))
        .collect();
    if kept.len() < before {
        tracing::debug!(removed = before - kept.len(), "dropped duplicate opportunities");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpportunityType;

    fn make(id: &str, url: Option<&str>, source: &str) -> Opportunity {
        let mut opp = Opportunity::new(id, format!("Title {id}"), "", OpportunityType::Business, source);
        opp.source_url = url.map(str::to_owned);
        opp
    }

    #[test]
    fn unique_results_pass_through_in_order() {
        let results = vec![
            make("a", Some("https://a.com/1"), "LoopNet"),
            make("b", None, "BizBuySell"),
            make("c", Some("https://c.com/3"), "SerpApi"),
        ];
        let ids: Vec<_> = deduplicate(results).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn first_occurrence_wins_for_equivalent_urls() {
        let results = vec![
            make("loopnet-1", Some("https://www.loopnet.com/Listing/1/"), "LoopNet"),
            make("serpapi-x", Some("https://WWW.loopnet.com/Listing/1?utm_source=g"), "SerpApi"),
        ];
        let deduped = deduplicate(results);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].source, "LoopNet");
    }

    #[test]
    fn results_without_url_dedup_by_id() {
        let results = vec![
            make("rentcast-7", None, "RentCast"),
            make("rentcast-7", Some("   "), "RentCast"),
            make("rentcast-8", None, "RentCast"),
        ];
        assert_eq!(deduplicate(results).len(), 2);
    }

    #[test]
    fn url_and_id_namespaces_do_not_collide() {
        let results = vec![
            make("https://a.com/x", None, "A"),
            make("other", Some("https://a.com/x"), "B"),
        ];
        assert_eq!(deduplicate(results).len(), 2);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
