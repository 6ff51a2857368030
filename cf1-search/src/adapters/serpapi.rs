//! SerpApi Google search: research leads for general queries.

use serde::Deserialize;

use super::{decode, funding_hint};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::query::OpportunityQuery;
use crate::synthetic::general;
use crate::types::{Opportunity, OpportunityType, RiskLevel};

pub struct SerpApiAdapter;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    position: Option<u32>,
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// The search phrase sent to Google.
fn search_phrase(query: &OpportunityQuery) -> String {
    let category = query.category.trim();
    let text = query.query.trim();
    if category.is_empty() {
        format!("{text} investment opportunities")
    } else {
        format!("{text} {category} investment opportunities")
    }
}

impl ProviderAdapter for SerpApiAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::SerpApi
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let mut params = vec![
            ("engine", "google".to_owned()),
            ("q", search_phrase(request.query)),
            ("num", request.limit.to_string()),
            ("api_key", api_key.to_owned()),
        ];
        if let Some(location) = request
            .query
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
        {
            params.push(("location", location.to_owned()));
        }
        client
            .get(endpoint(&descriptor.base_url, "search.json"))
            .query(&params)
    }

    fn parse_response(
        &self,
        body: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let response: SearchResponse = decode(self.provider(), body)?;
        if let Some(error) = response.error {
            return Err(SearchError::Parse(format!("SerpApi error: {error}")));
        }
        Ok(response
            .organic_results
            .into_iter()
            .enumerate()
            .map(|(i, result)| to_opportunity(i, result, request.query))
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        general::generate(self.provider().name(), request.query, request.limit)
    }
}

fn to_opportunity(index: usize, result: OrganicResult, query: &OpportunityQuery) -> Opportunity {
    let snippet = result.snippet.unwrap_or_default();
    let kind = OpportunityType::infer(&format!("{} {snippet} {}", result.title, query.query));
    let position = result.position.map_or(index + 1, |p| p as usize);
    let site = result
        .source
        .or_else(|| {
            url::Url::parse(&result.link)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_owned()))
        })
        .unwrap_or_else(|| "the web".to_owned());

    let mut opp = Opportunity::new(
        format!("serpapi-{}", crate::synthetic::slug(&result.link)),
        result.title,
        snippet,
        kind,
        ProviderId::SerpApi.name(),
    );
    opp.risk_level = RiskLevel::Medium;
    opp.investment_type = "Research Lead".to_owned();
    opp.time_horizon = "Varies".to_owned();
    opp.market_analysis = format!("Ranked #{position} on Google via {site}.");
    opp.next_steps = vec![
        "Read the source article and verify the offering".to_owned(),
        "Contact the sponsor for offering documents".to_owned(),
    ];
    opp.source_url = Some(result.link);
    opp.estimated_funding_required = funding_hint(query, 10_000.0);
    opp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    const MOCK_SERPAPI_JSON: &str = r#"{
        "search_metadata": {"status": "Success"},
        "organic_results": [
            {
                "position": 1,
                "title": "10 Farmland Investment Opportunities for 2024",
                "link": "https://www.example-invest.com/farmland-2024",
                "snippet": "Farmland has delivered steady returns with low volatility.",
                "source": "Example Invest"
            },
            {
                "position": 2,
                "title": "Best Dividend Stock ETFs",
                "link": "https://news.example.org/dividend-etfs"
            }
        ]
    }"#;

    fn request(query: &OpportunityQuery) -> FetchRequest<'_> {
        FetchRequest {
            query,
            category: Category::General,
            limit: 5,
        }
    }

    #[test]
    fn parses_organic_results_in_rank_order() {
        let q = OpportunityQuery::new("alternative", "farmland");
        let results = SerpApiAdapter
            .parse_response(MOCK_SERPAPI_JSON, &request(&q))
            .expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].investment_type, "Research Lead");
        assert_eq!(
            results[0].source_url.as_deref(),
            Some("https://www.example-invest.com/farmland-2024")
        );
        assert!(results[0].market_analysis.contains("Example Invest"));
        assert_eq!(results[1].kind, OpportunityType::Stock);
        assert!(results[1].market_analysis.contains("news.example.org"));
        assert_ne!(results[0].id, results[1].id);
    }

    #[test]
    fn error_field_is_parse_error() {
        let q = OpportunityQuery::new("general", "farmland");
        let body = r#"{"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"}"#;
        let err = SerpApiAdapter.parse_response(body, &request(&q)).unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn search_phrase_includes_category() {
        let q = OpportunityQuery::new("alternative", " farmland ");
        assert_eq!(search_phrase(&q), "farmland alternative investment opportunities");
    }

    #[test]
    fn request_carries_engine_and_location() {
        let q = OpportunityQuery::new("general", "vending machines").with_location("Denver, CO");
        let built = SerpApiAdapter
            .build_request(
                &reqwest::Client::new(),
                &ProviderId::SerpApi.default_descriptor(),
                "sk",
                &request(&q),
            )
            .build()
            .expect("request");
        assert_eq!(built.url().path(), "/search.json");
        let pairs: Vec<(String, String)> = built.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("engine".into(), "google".into())));
        assert!(pairs.contains(&("location".into(), "Denver, CO".into())));
        assert!(pairs.contains(&("api_key".into(), "sk".into())));
    }
}
