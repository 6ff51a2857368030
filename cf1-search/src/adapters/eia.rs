//! EIA open data: state retail electricity prices.
//!
//! EIA publishes market data, not deals. Each monthly price row becomes an
//! energy opportunity framed around the project type the query asks for,
//! with the state's residential power price as the key economic input.

use serde::Deserialize;

use super::{city_state, decode, funding_hint, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::query::OpportunityQuery;
use crate::synthetic::energy;
use crate::types::{DataFreshness, KeyMetric, Location, Opportunity, OpportunityType, RiskLevel};

pub struct EiaAdapter;

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<SeriesResponse>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    data: Vec<PriceRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRow {
    period: String,
    stateid: String,
    #[serde(default)]
    state_description: Option<String>,
    #[serde(default)]
    sector_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, rename = "price-units")]
    price_units: Option<String>,
}

impl ProviderAdapter for EiaAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Eia
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let mut params = vec![
            ("api_key", api_key.to_owned()),
            ("frequency", "monthly".to_owned()),
            ("data[0]", "price".to_owned()),
            ("facets[sectorid][]", "RES".to_owned()),
            ("sort[0][column]", "period".to_owned()),
            ("sort[0][direction]", "desc".to_owned()),
            ("length", request.limit.to_string()),
        ];
        if let (_, Some(state)) = city_state(request.query) {
            params.push(("facets[stateid][]", state.to_uppercase()));
        }
        client
            .get(endpoint(&descriptor.base_url, "electricity/retail-sales/data/"))
            .query(&params)
    }

    fn parse_response(
        &self,
        body: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let envelope: Envelope = decode(self.provider(), body)?;
        if let Some(error) = envelope.error {
            return Err(SearchError::Parse(format!("EIA refused: {error}")));
        }
        Ok(envelope
            .response
            .map(|r| r.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| to_opportunity(row, request.query))
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        energy::generate(self.provider().name(), request.query, request.limit)
    }
}

fn to_opportunity(row: PriceRow, query: &OpportunityQuery) -> Option<Opportunity> {
    let price = row.price.filter(|p| *p > 0.0)?;
    let units = row.price_units.unwrap_or_else(|| "cents per kilowatt-hour".to_owned());
    let state_name = row.state_description.unwrap_or_else(|| row.stateid.clone());
    let sector = row.sector_name.unwrap_or_else(|| "residential".to_owned());
    let project = energy::headline(query);

    // Offset value scales with the local retail rate; 12 c/kWh is roughly
    // the national residential average.
    let roi = ((6.0 + (price - 12.0) * 0.4).clamp(4.0, 16.0) * 10.0).round() / 10.0;
    let risk = if price >= 15.0 {
        RiskLevel::Low
    } else if price >= 11.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    let mut opp = Opportunity::new(
        format!("eia-{}-{}", row.stateid.to_lowercase(), row.period),
        format!("{project} in {state_name}"),
        format!(
            "{state_name} {sector} electricity averaged {price:.2} {units} in {}. \
             Higher retail rates improve offset economics for new generation.",
            row.period
        ),
        OpportunityType::Energy,
        ProviderId::Eia.name(),
    );
    opp.estimated_roi = Some(roi);
    opp.risk_level = risk;
    opp.investment_type = "Project Equity".to_owned();
    opp.time_horizon = "10-20 years".to_owned();
    opp.market_analysis = format!(
        "EIA retail sales data for {state_name} ({}), {sector} sector.",
        row.period
    );
    opp.key_metrics = vec![
        KeyMetric::new("Retail Power Price", format!("{price:.2}"), Some(units.as_str())),
        KeyMetric::new("Reporting Period", row.period.clone(), None),
    ];
    opp.next_steps = vec![
        format!("Screen {state_name} utility interconnection queues"),
        "Compare net-metering and state incentive programs".to_owned(),
    ];
    opp.location = Some(Location {
        state: row.stateid,
        country: "US".to_owned(),
        ..Location::default()
    });
    opp.data_freshness = DataFreshness::Daily;
    opp.estimated_funding_required = funding_hint(query, 25_000.0);
    Some(opp)
}
