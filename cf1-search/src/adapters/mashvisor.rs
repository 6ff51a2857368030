//! Mashvisor: short-term rental investment analytics.

use serde::Deserialize;

use super::{city_state, decode, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::synthetic::real_estate::{self, Strategy};
use crate::types::{KeyMetric, Location, Opportunity, OpportunityType, RiskLevel};

pub struct MashvisorAdapter;

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct Property {
    id: u64,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zip: Option<String>,
    #[serde(default)]
    beds: Option<u8>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    list_price: Option<f64>,
    #[serde(default)]
    airbnb_rental: Option<RentalStats>,
}

#[derive(Debug, Deserialize)]
struct RentalStats {
    #[serde(default, deserialize_with = "lenient_f64")]
    cash_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    cap_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    occupancy: Option<f64>,
}

impl ProviderAdapter for MashvisorAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Mashvisor
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let (city, state) = city_state(request.query);
        let mut params = vec![
            ("items", request.limit.to_string()),
            ("sort_by", "airbnb_cap_rate".to_owned()),
        ];
        if let Some(city) = city {
            params.push(("city", city));
        }
        if let Some(state) = state {
            params.push(("state", state));
        }
        client
            .get(endpoint(&descriptor.base_url, "search/investment"))
            .header("x-api-key", api_key)
            .query(&params)
    }

    fn parse_response(
        &self,
        body: &str,
        _request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let envelope: Envelope = decode(self.provider(), body)?;
        if envelope.status != "success" {
            return Err(SearchError::Parse(format!(
                "Mashvisor status {}: {}",
                envelope.status,
                envelope.message.unwrap_or_default()
            )));
        }
        Ok(envelope
            .content
            .map(|c| c.properties)
            .unwrap_or_default()
            .into_iter()
            .filter_map(to_opportunity)
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        real_estate::generate(
            Some(Strategy::ShortTermRental),
            self.provider().name(),
            request.query,
            request.limit,
        )
    }
}

fn to_opportunity(property: Property) -> Option<Opportunity> {
    let price = property.list_price.filter(|p| *p > 0.0)?;
    let stats = property.airbnb_rental?;
    let kind = property
        .property_type
        .unwrap_or_else(|| "Home".to_owned());
    let city = property.city.unwrap_or_default();
    let cap_rate = stats.cap_rate.unwrap_or_default();
    let funding = (price * 0.25 / 1_000.0).round() * 1_000.0;

    let title = match property.beds {
        Some(beds) => format!("{beds}-Bed {kind} Vacation Rental in {city}"),
        None => format!("{kind} Vacation Rental in {city}"),
    };
    let mut opp = Opportunity::new(
        format!("mashvisor-{}", property.id),
        title,
        format!(
            "Short-term rental candidate listed at ${price:.0} with a projected {cap_rate:.1}% Airbnb cap rate."
        ),
        OpportunityType::RealEstate,
        ProviderId::Mashvisor.name(),
    );
    opp.price = Some(price);
    opp.market_value = Some(price);
    opp.cash_flow = stats.cash_flow;
    opp.estimated_roi = stats.cap_rate;
    opp.risk_level = RiskLevel::Medium;
    opp.investment_type = "Short-Term Rental".to_owned();
    opp.time_horizon = "5-10 years".to_owned();
    opp.market_analysis = format!(
        "Airbnb comparables project {:.0}% occupancy for this neighbourhood.",
        stats.occupancy.unwrap_or_default()
    );
    opp.key_metrics = vec![
        KeyMetric::new("Airbnb Cap Rate", format!("{cap_rate:.1}"), Some("%")),
        KeyMetric::new(
            "Airbnb Cash Flow",
            format!("{:.0}", stats.cash_flow.unwrap_or_default()),
            Some("USD/month"),
        ),
    ];
    opp.next_steps = vec![
        "Check local short-term rental regulations".to_owned(),
        "Review seasonal occupancy data".to_owned(),
    ];
    opp.location = Some(Location {
        address: property.address,
        city,
        state: property.state.unwrap_or_default(),
        country: "US".to_owned(),
        zip_code: property.zip,
        coordinates: None,
    });
    opp.proposal_ready = true;
    opp.estimated_funding_required = funding;
    Some(opp)
}
