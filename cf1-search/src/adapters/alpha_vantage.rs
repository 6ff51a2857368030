//! Alpha Vantage: equity symbol search and commodity price series.
//!
//! On the stocks route the adapter calls `SYMBOL_SEARCH`; on the
//! commodities route it calls the matching commodity function (`WTI`,
//! `COPPER`, ...). Alpha Vantage reports quota exhaustion as HTTP 200 with
//! a `Note` or `Information` field, which is treated as a parse failure.

use serde::Deserialize;

use super::{decode, funding_hint, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::query::OpportunityQuery;
use crate::synthetic::commodities::{self, Vehicle};
use crate::synthetic::stocks::{self, Theme};
use crate::types::{Category, DataFreshness, KeyMetric, Opportunity, OpportunityType, RiskLevel};

pub struct AlphaVantageAdapter;

#[derive(Debug, Deserialize)]
struct Throttled {
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SymbolSearch {
    #[serde(rename = "bestMatches")]
    best_matches: Vec<SymbolMatch>,
}

#[derive(Debug, Deserialize)]
struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "3. type")]
    kind: String,
    #[serde(rename = "4. region")]
    region: String,
    #[serde(rename = "8. currency", default)]
    currency: Option<String>,
    #[serde(rename = "9. matchScore", default, deserialize_with = "lenient_f64")]
    match_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CommoditySeries {
    name: String,
    #[serde(default)]
    interval: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    data: Vec<SeriesPoint>,
}

#[derive(Debug, Deserialize)]
struct SeriesPoint {
    date: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
}

/// Commodity function for the query, defaulting to the all-commodities index.
fn commodity_function(query: &OpportunityQuery) -> &'static str {
    const FUNCTIONS: &[(&str, &str)] = &[
        ("brent", "BRENT"),
        ("natural gas", "NATURAL_GAS"),
        ("oil", "WTI"),
        ("crude", "WTI"),
        ("copper", "COPPER"),
        ("aluminum", "ALUMINUM"),
        ("wheat", "WHEAT"),
        ("corn", "CORN"),
        ("cotton", "COTTON"),
        ("sugar", "SUGAR"),
        ("coffee", "COFFEE"),
    ];
    FUNCTIONS
        .iter()
        .find(|(keyword, _)| query.mentions(&[*keyword]))
        .map_or("ALL_COMMODITIES", |(_, function)| *function)
}

impl ProviderAdapter for AlphaVantageAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::AlphaVantage
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let params: Vec<(&str, String)> = match request.category {
            Category::Commodities => vec![
                ("function", commodity_function(request.query).to_owned()),
                ("interval", "monthly".to_owned()),
            ],
            _ => vec![
                ("function", "SYMBOL_SEARCH".to_owned()),
                ("keywords", request.query.query.trim().to_owned()),
            ],
        };
        client
            .get(endpoint(&descriptor.base_url, "query"))
            .query(&params)
            .query(&[("apikey", api_key)])
    }

    fn parse_response(
        &self,
        body: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        if let Ok(throttled) = serde_json::from_str::<Throttled>(body) {
            if let Some(message) = throttled.note.or(throttled.information).or(throttled.error) {
                return Err(SearchError::Parse(format!("Alpha Vantage refused: {message}")));
            }
        }
        match request.category {
            Category::Commodities => {
                let series: CommoditySeries = decode(self.provider(), body)?;
                Ok(series_to_opportunity(series, request.query).into_iter().collect())
            }
            _ => {
                let search: SymbolSearch = decode(self.provider(), body)?;
                let theme = Theme::infer(request.query);
                Ok(search
                    .best_matches
                    .into_iter()
                    .filter(|m| m.kind == "Equity" || m.kind == "ETF")
                    .map(|m| match_to_opportunity(m, theme, request.query))
                    .collect())
            }
        }
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        let source = self.provider().name();
        match request.category {
            Category::Commodities => {
                commodities::generate(Vehicle::Etf, source, request.query, request.limit)
            }
            _ => stocks::generate(source, request.query, request.limit),
        }
    }
}

fn match_to_opportunity(m: SymbolMatch, theme: Theme, query: &OpportunityQuery) -> Opportunity {
    let currency = m.currency.unwrap_or_else(|| "USD".to_owned());
    let mut opp = Opportunity::new(
        format!("alpha-vantage-{}", m.symbol.to_lowercase()),
        format!("{} ({}) {} Stock", m.name, m.symbol, theme.label()),
        format!("{} listed in {}, quoted in {currency}.", m.kind, m.region),
        OpportunityType::Stock,
        ProviderId::AlphaVantage.name(),
    );
    opp.risk_level = theme.risk();
    opp.investment_type = format!("Public Equity ({})", theme.label());
    opp.time_horizon = "3-5 years".to_owned();
    opp.market_analysis = format!(
        "Matched by Alpha Vantage symbol search with a relevance of {:.0}%.",
        m.match_score.unwrap_or_default() * 100.0
    );
    opp.key_metrics = vec![
        KeyMetric::new("Ticker", m.symbol.clone(), None),
        KeyMetric::new("Region", m.region, None),
    ];
    opp.next_steps = vec![
        format!("Pull a live quote for {}", m.symbol),
        "Review the latest earnings report".to_owned(),
    ];
    opp.source_url = Some(format!("https://finance.yahoo.com/quote/{}", m.symbol));
    opp.estimated_funding_required = funding_hint(query, 1_000.0);
    opp
}

fn series_to_opportunity(series: CommoditySeries, query: &OpportunityQuery) -> Option<Opportunity> {
    let mut points = series.data.iter().filter_map(|p| p.value.map(|v| (p.date.as_str(), v)));
    let (date, latest) = points.next()?;
    let previous = points.next().map(|(_, v)| v);
    let change = previous
        .filter(|p| *p != 0.0)
        .map(|p| (latest - p) / p * 100.0);
    let unit = series.unit.unwrap_or_default();

    let mut opp = Opportunity::new(
        format!("alpha-vantage-{}-{date}", series.name.to_lowercase().replace(' ', "-")),
        series.name.clone(),
        format!(
            "{} at {latest:.2} {unit} as of {date}{}.",
            series.name,
            change
                .map(|c| format!(", {c:+.1}% on the prior period"))
                .unwrap_or_default()
        ),
        OpportunityType::Commodity,
        ProviderId::AlphaVantage.name(),
    );
    opp.price = Some(latest);
    opp.market_value = Some(latest);
    opp.estimated_roi = change.map(|c| (c * 10.0).round() / 10.0);
    opp.risk_level = match change {
        Some(c) if c.abs() > 10.0 => RiskLevel::High,
        _ => RiskLevel::Medium,
    };
    opp.investment_type = "Commodity Exposure".to_owned();
    opp.time_horizon = "1-3 years".to_owned();
    opp.market_analysis = format!(
        "{} series from Alpha Vantage.",
        series.interval.as_deref().unwrap_or("monthly")
    );
    opp.key_metrics = vec![KeyMetric::new("Latest Price", format!("{latest:.2}"), Some(unit.as_str()))];
    opp.next_steps = vec!["Choose an ETF or futures vehicle for exposure".to_owned()];
    opp.data_freshness = DataFreshness::Daily;
    opp.estimated_funding_required = funding_hint(query, 2_500.0);
    Some(opp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_SYMBOL_SEARCH_JSON: &str = r#"{
        "bestMatches": [
            {
                "1. symbol": "NVDA",
                "2. name": "NVIDIA Corp",
                "3. type": "Equity",
                "4. region": "United States",
                "5. marketOpen": "09:30",
                "6. marketClose": "16:00",
                "7. timezone": "UTC-04",
                "8. currency": "USD",
                "9. matchScore": "0.8889"
            },
            {
                "1. symbol": "NVD.DEX",
                "2. name": "NVIDIA Corp Warrant",
                "3. type": "Warrant",
                "4. region": "XETRA",
                "8. currency": "EUR",
                "9. matchScore": "0.5"
            }
        ]
    }"#;

    const MOCK_WTI_JSON: &str = r#"{
        "name": "Crude Oil Prices WTI",
        "interval": "monthly",
        "unit": "dollars per barrel",
        "data": [
            {"date": "2024-05-01", "value": "80.02"},
            {"date": "2024-04-01", "value": "85.35"},
            {"date": "2024-03-01", "value": "."}
        ]
    }"#;

    fn request(query: &OpportunityQuery, category: Category) -> FetchRequest<'_> {
        FetchRequest {
            query,
            category,
            limit: 3,
        }
    }

    #[test]
    fn parses_equity_matches_only() {
        let q = OpportunityQuery::new("stocks", "ai");
        let results = AlphaVantageAdapter
            .parse_response(MOCK_SYMBOL_SEARCH_JSON, &request(&q, Category::Stocks))
            .expect("should parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "NVIDIA Corp (NVDA) AI Stock");
        assert_eq!(results[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn parses_commodity_series() {
        let q = OpportunityQuery::new("commodities", "oil");
        let results = AlphaVantageAdapter
            .parse_response(MOCK_WTI_JSON, &request(&q, Category::Commodities))
            .expect("should parse");
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.kind, OpportunityType::Commodity);
        assert_eq!(r.price, Some(80.02));
        assert_eq!(r.estimated_roi, Some(-6.2));
        assert_eq!(r.data_freshness, DataFreshness::Daily);
    }

    #[test]
    fn quota_note_is_an_error() {
        let q = OpportunityQuery::new("stocks", "ai");
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = AlphaVantageAdapter
            .parse_response(body, &request(&q, Category::Stocks))
            .unwrap_err();
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn commodity_function_follows_keywords() {
        assert_eq!(commodity_function(&OpportunityQuery::new("commodities", "crude oil")), "WTI");
        assert_eq!(commodity_function(&OpportunityQuery::new("commodities", "copper")), "COPPER");
        assert_eq!(commodity_function(&OpportunityQuery::new("commodities", "gold")), "ALL_COMMODITIES");
    }

    #[test]
    fn request_passes_key_as_query_param() {
        let q = OpportunityQuery::new("stocks", "dividend kings");
        let built = AlphaVantageAdapter
            .build_request(
                &reqwest::Client::new(),
                &ProviderId::AlphaVantage.default_descriptor(),
                "demo",
                &request(&q, Category::Stocks),
            )
            .build()
            .expect("request");
        let query = built.url().query().unwrap_or_default();
        assert!(query.contains("function=SYMBOL_SEARCH"));
        assert!(query.contains("keywords=dividend+kings"));
        assert!(query.contains("apikey=demo"));
    }

    #[test]
    fn synthetic_follows_route() {
        let q = OpportunityQuery::new("commodities", "silver");
        let etfs = AlphaVantageAdapter.synthesize(&request(&q, Category::Commodities));
        assert!(etfs.iter().all(|r| r.investment_type == "Commodity ETF"));
        let q = OpportunityQuery::new("stocks", "ai");
        let equities = AlphaVantageAdapter.synthesize(&request(&q, Category::Stocks));
        assert!(equities.iter().all(|r| r.risk_level == RiskLevel::High));
    }
}
