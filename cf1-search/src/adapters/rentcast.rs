//! RentCast: long-term rental listings.
//!
//! `GET /listings/rental/long-term` with the key in `X-Api-Key`. Listings
//! carry monthly rent, not a sale price, so the acquisition figures are
//! estimated from rent with the 1% rule.

use serde::Deserialize;

use super::{city_state, decode, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::synthetic::real_estate::{self, Strategy};
use crate::types::{Coordinates, KeyMetric, Location, Opportunity, OpportunityType, RiskLevel};

pub struct RentCastAdapter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    id: String,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    address_line1: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    bedrooms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
}

impl ProviderAdapter for RentCastAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::RentCast
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
            ("status", "Active".to_owned()),
            ("limit", request.limit.to_string()),
        ];
        if let Some(city) = city {
            params.push(("city", city));
        }
        if let Some(state) = state {
            params.push(("state", state));
        }
        client
            .get(endpoint(&descriptor.base_url, "listings/rental/long-term"))
            .header("X-Api-Key", api_key)
            .header("Accept", "application/json")
            .query(&params)
    }

    fn parse_response(
        &self,
        body: &str,
        _request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let listings: Vec<Listing> = decode(self.provider(), body)?;
        let results: Vec<Opportunity> = listings.into_iter().filter_map(to_opportunity).collect();
        tracing::debug!(count = results.len(), "RentCast listings parsed");
        Ok(results)
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        real_estate::generate(
            Some(Strategy::LongTermRental),
            self.provider().name(),
            request.query,
            request.limit,
        )
    }
}

fn to_opportunity(listing: Listing) -> Option<Opportunity> {
    let rent = listing.price.filter(|p| *p > 0.0)?;
    let property = listing
        .property_type
        .unwrap_or_else(|| "Residential".to_owned());
    let street = listing
        .address_line1
        .clone()
        .or_else(|| listing.formatted_address.clone())
        .unwrap_or_else(|| "Undisclosed Address".to_owned());
    let city = listing.city.unwrap_or_default();

    let est_price = (rent * 100.0 / 1_000.0).round() * 1_000.0;
    let funding = (est_price * 0.25 / 1_000.0).round() * 1_000.0;
    if funding <= 0.0 {
        return None;
    }
    let cash_flow = (rent * 0.3 / 10.0).round() * 10.0;
    let roi = cash_flow * 12.0 / funding * 100.0;

    let title = match listing.bedrooms {
        Some(beds) if beds > 0.0 => format!("{beds:.0}-Bed {property} Rental at {street}"),
        _ => format!("{property} Rental at {street}"),
    };

    let mut opp = Opportunity::new(
        format!("rentcast-{}", listing.id),
        title,
        format!(
            "Active long-term rental listing{} renting for ${rent:.0}/month.",
            if city.is_empty() {
                String::new()
            } else {
                format!(" in {city}")
            }
        ),
        OpportunityType::RealEstate,
        ProviderId::RentCast.name(),
    );
    opp.price = Some(est_price);
    opp.market_value = Some(est_price);
    opp.cash_flow = Some(cash_flow);
    opp.estimated_roi = Some((roi * 10.0).round() / 10.0);
    opp.risk_level = RiskLevel::Low;
    opp.investment_type = "Long-Term Rental".to_owned();
    opp.time_horizon = "5-10 years".to_owned();
    opp.market_analysis = format!(
        "Current asking rent of ${rent:.0}/month implies a value near ${est_price:.0} at the 1% rule."
    );
    opp.key_metrics = vec![
        KeyMetric::new("Monthly Rent", format!("{rent:.0}"), Some("USD")),
        KeyMetric::new("Estimated Cash Flow", format!("{cash_flow:.0}"), Some("USD/month")),
    ];
    opp.next_steps = vec![
        "Verify rent with comparable listings".to_owned(),
        "Contact the listing agent".to_owned(),
    ];
    opp.location = Some(Location {
        address: listing.formatted_address.or(Some(street)),
        city,
        state: listing.state.unwrap_or_default(),
        country: "US".to_owned(),
        zip_code: listing.zip_code,
        coordinates: listing
            .latitude
            .zip(listing.longitude)
            .map(|(lat, lng)| Coordinates { lat, lng }),
    });
    opp.proposal_ready = true;
    opp.estimated_funding_required = funding;
    Some(opp)
}
