//! Commodities-API: latest spot rates.
//!
//! Rates are quoted as units of the commodity per one USD, so the USD price
//! is the reciprocal.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{decode, funding_hint};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::query::OpportunityQuery;
use crate::synthetic::commodities::{self, Vehicle};
use crate::types::{KeyMetric, Opportunity, OpportunityType, RiskLevel};

pub struct CommoditiesApiAdapter;

/// (symbol, display name, unit, query keywords)
const SYMBOLS: &[(&str, &str, &str, &[&str])] = &[
    ("XAU", "Gold", "troy oz", &["gold", "precious", "bullion"]),
    ("XAG", "Silver", "troy oz", &["silver", "precious"]),
    ("XPT", "Platinum", "troy oz", &["platinum", "precious"]),
    ("WTIOIL", "WTI Crude Oil", "barrel", &["oil", "crude", "wti"]),
    ("BRENTOIL", "Brent Crude Oil", "barrel", &["oil", "crude", "brent"]),
    ("NG", "Natural Gas", "MMBtu", &["natural gas", "gas"]),
    ("WHEAT", "Wheat", "bushel", &["wheat", "grain", "agri"]),
    ("CORN", "Corn", "bushel", &["corn", "grain", "agri"]),
    ("SOYBEAN", "Soybeans", "bushel", &["soy", "agri"]),
    ("XCU", "Copper", "lb", &["copper", "industrial"]),
];

#[derive(Debug, Deserialize)]
struct Envelope {
    data: LatestRates,
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    success: bool,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    #[serde(default)]
    info: Option<String>,
}

/// Symbols the query asks about, in catalog order; the first few otherwise.
fn symbols_for(query: &OpportunityQuery, limit: usize) -> Vec<&'static str> {
    let matched: Vec<&'static str> = SYMBOLS
        .iter()
        .filter(|(_, _, _, keywords)| query.mentions(keywords))
        .map(|(symbol, ..)| *symbol)
        .collect();
    if matched.is_empty() {
        [0, 3, 6, 9, 1]
            .iter()
            .take(limit.max(1))
            .map(|&i| SYMBOLS[i].0)
            .collect()
    } else {
        matched
    }
}

impl ProviderAdapter for CommoditiesApiAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::CommoditiesApi
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        client
            .get(endpoint(&descriptor.base_url, "latest"))
            .query(&[
                ("access_key", api_key.to_owned()),
                ("base", "USD".to_owned()),
                ("symbols", symbols_for(request.query, request.limit).join(",")),
            ])
    }

    fn parse_response(
        &self,
        body: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let envelope: Envelope = decode(self.provider(), body)?;
        let latest = envelope.data;
        if !latest.success {
            let (code, info) = latest
                .error
                .map_or((0, String::new()), |e| (e.code, e.info.unwrap_or_default()));
            return Err(SearchError::Parse(format!(
                "Commodities-API error {code}: {info}"
            )));
        }
        let date = latest.date.unwrap_or_default();
        Ok(SYMBOLS
            .iter()
            .filter_map(|(symbol, name, unit, _)| {
                let rate = latest.rates.get(*symbol).copied().filter(|r| *r > 0.0)?;
                Some(rate_to_opportunity(symbol, name, unit, 1.0 / rate, &date, request.query))
            })
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        commodities::generate(
            Vehicle::Spot,
            self.provider().name(),
            request.query,
            request.limit,
        )
    }
}

fn rate_to_opportunity(
    symbol: &str,
    name: &str,
    unit: &str,
    price: f64,
    date: &str,
    query: &OpportunityQuery,
) -> Opportunity {
    let mut opp = Opportunity::new(
        format!("commodities-api-{}-{date}", symbol.to_lowercase()),
        format!("{name} Spot Position"),
        format!("{name} spot at ${price:.2} per {unit} ({date})."),
        OpportunityType::Commodity,
        ProviderId::CommoditiesApi.name(),
    );
    opp.price = Some((price * 100.0).round() / 100.0);
    opp.market_value = opp.price;
    opp.risk_level = match symbol {
        "XAU" | "XAG" | "XPT" => RiskLevel::Low,
        "WTIOIL" | "BRENTOIL" | "NG" => RiskLevel::High,
        _ => RiskLevel::Medium,
    };
    opp.investment_type = "Commodity Spot / Futures".to_owned();
    opp.time_horizon = "1-3 years".to_owned();
    opp.market_analysis = format!("Latest {name} fixing from Commodities-API.");
    opp.key_metrics = vec![
        KeyMetric::new("Spot Price", format!("{price:.2}"), Some(unit)),
        KeyMetric::new("Symbol", symbol, None),
    ];
    opp.next_steps = vec![
        format!("Compare {name} futures curve and ETF tracking error"),
        "Size the allocation as a portfolio hedge".to_owned(),
    ];
    opp.estimated_funding_required = funding_hint(query, 2_500.0);
    opp
}
