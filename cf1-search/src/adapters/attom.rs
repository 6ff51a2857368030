//! ATTOM property API: property snapshots with AVM valuations.

use serde::Deserialize;

use super::{city_state, decode, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::synthetic::real_estate::{self, Strategy};
use crate::types::{Coordinates, DataFreshness, KeyMetric, Location, Opportunity, OpportunityType, RiskLevel};

pub struct AttomAdapter;

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    property: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct Property {
    identifier: Identifier,
    #[serde(default)]
    address: Address,
    #[serde(default)]
    location: GeoPoint,
    #[serde(default)]
    summary: Summary,
    #[serde(default)]
    avm: Option<Avm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Identifier {
    attom_id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    one_line: Option<String>,
    locality: Option<String>,
    country_subd: Option<String>,
    postal1: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeoPoint {
    #[serde(default, deserialize_with = "lenient_f64")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    propclass: Option<String>,
    yearbuilt: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Avm {
    amount: AvmAmount,
}

#[derive(Debug, Deserialize)]
struct AvmAmount {
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
}

impl ProviderAdapter for AttomAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Attom
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let mut params = vec![
            ("pagesize", request.limit.to_string()),
            ("orderby", "calendardate".to_owned()),
        ];
        if let (Some(city), Some(state)) = city_state(request.query) {
            params.push(("address2", format!("{city}, {state}")));
        }
        if let Some(budget) = request.query.budget_range {
            // Budgets are equity; ATTOM filters by full value.
            params.push(("minavmvalue", format!("{:.0}", budget.min * 4.0)));
            params.push(("maxavmvalue", format!("{:.0}", budget.max * 4.0)));
        }
        client
            .get(endpoint(&descriptor.base_url, "property/snapshot"))
            .header("apikey", api_key)
            .header("Accept", "application/json")
            .query(&params)
    }

    fn parse_response(
        &self,
        body: &str,
        _request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let response: SnapshotResponse = decode(self.provider(), body)?;
        Ok(response
            .property
            .into_iter()
            .filter_map(to_opportunity)
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        real_estate::generate(
            Some(Strategy::BuyAndHold),
            self.provider().name(),
            request.query,
            request.limit,
        )
    }
}

fn to_opportunity(property: Property) -> Option<Opportunity> {
    let value = property.avm.and_then(|a| a.amount.value).filter(|v| *v > 0.0)?;
    let class = property
        .summary
        .propclass
        .unwrap_or_else(|| "Residential Property".to_owned());
    let address = property.address.one_line.clone();
    let city = property.address.locality.unwrap_or_default();
    let funding = (value * 0.25 / 1_000.0).round() * 1_000.0;

    let mut opp = Opportunity::new(
        format!("attom-{}", property.identifier.attom_id),
        format!(
            "{class} in {}",
            if city.is_empty() { "Undisclosed City" } else { city.as_str() }
        ),
        format!(
            "{class}{} valued at ${value:.0} by automated valuation.",
            property
                .summary
                .yearbuilt
                .map(|y| format!(" built in {y}"))
                .unwrap_or_default()
        ),
        OpportunityType::RealEstate,
        ProviderId::Attom.name(),
    );
    opp.price = Some(value);
    opp.market_value = Some(value);
    opp.risk_level = RiskLevel::Medium;
    opp.investment_type = "Value-Add Buy & Hold".to_owned();
    opp.time_horizon = "3-7 years".to_owned();
    opp.market_analysis = "Valuation from ATTOM's automated valuation model; verify against recent closed sales.".to_owned();
    opp.key_metrics = vec![KeyMetric::new("AVM Value", format!("{value:.0}"), Some("USD"))];
    if let Some(year) = property.summary.yearbuilt {
        opp.key_metrics
            .push(KeyMetric::new("Year Built", year.to_string(), None));
    }
    opp.next_steps = vec![
        "Pull the full property detail and sales history".to_owned(),
        "Estimate renovation budget".to_owned(),
    ];
    opp.location = Some(Location {
        address,
        city,
        state: property.address.country_subd.unwrap_or_default(),
        country: "US".to_owned(),
        zip_code: property.address.postal1,
        coordinates: property
            .location
            .latitude
            .zip(property.location.longitude)
            .map(|(lat, lng)| Coordinates { lat, lng }),
    });
    opp.data_freshness = DataFreshness::Daily;
    opp.proposal_ready = true;
    opp.estimated_funding_required = funding;
    Some(opp)
}
