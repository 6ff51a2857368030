//! LoopNet (via RapidAPI): commercial property and business-space listings.
//!
//! Serves both the real-estate and business routes. The route decides
//! whether a listing is framed as a property or as an operating business
//! sold with its premises.

use serde::Deserialize;

use super::{city_state, decode, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::synthetic::business::{self, Channel};
use crate::synthetic::real_estate::{self, Strategy};
use crate::types::{Category, KeyMetric, Location, Opportunity, OpportunityType, RiskLevel};

pub struct LoopNetAdapter;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    listing_id: String,
    title: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    cap_rate: Option<f64>,
    #[serde(default)]
    url: Option<String>,
}

impl ProviderAdapter for LoopNetAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::LoopNet
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let host = url::Url::parse(&descriptor.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();
        let (city, state) = city_state(request.query);
        let location = match (city, state) {
            (Some(c), Some(s)) => format!("{c}, {s}"),
            (Some(c), None) => c,
            (None, Some(s)) => s,
            (None, None) => String::new(),
        };
        let listing_type = match request.category {
            Category::Business => "business",
            _ => "commercial",
        };
        client
            .get(endpoint(&descriptor.base_url, "loopnet/sale/search"))
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", host)
            .query(&[
                ("location", location),
                ("type", listing_type.to_owned()),
                ("keywords", request.query.query.trim().to_owned()),
                ("size", request.limit.to_string()),
            ])
    }

    fn parse_response(
        &self,
        body: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let response: SearchResponse = decode(self.provider(), body)?;
        Ok(response
            .data
            .into_iter()
            .filter_map(|listing| to_opportunity(listing, request.category))
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        let source = self.provider().name();
        match request.category {
            Category::Business => {
                business::generate(Channel::CommercialSpace, source, request.query, request.limit)
            }
            _ => real_estate::generate(Some(Strategy::Commercial), source, request.query, request.limit),
        }
    }
}

fn to_opportunity(listing: Listing, category: Category) -> Option<Opportunity> {
    let price = listing.price.filter(|p| *p > 0.0)?;
    let (kind, investment_type, equity_share) = match category {
        Category::Business => (
            OpportunityType::Business,
            "Business + Property Acquisition",
            0.2,
        ),
        _ => (OpportunityType::RealEstate, "Commercial Lease", 0.3),
    };
    let property = listing
        .property_type
        .unwrap_or_else(|| "Commercial".to_owned());

    let mut opp = Opportunity::new(
        format!("loopnet-{}", listing.listing_id),
        listing.title,
        format!(
            "{property} listing asking ${price:.0}{}.",
            listing
                .cap_rate
                .map(|c| format!(" at a {c:.2}% cap rate"))
                .unwrap_or_default()
        ),
        kind,
        ProviderId::LoopNet.name(),
    );
    opp.price = Some(price);
    opp.market_value = Some(price);
    opp.estimated_roi = listing.cap_rate;
    opp.risk_level = RiskLevel::Medium;
    opp.investment_type = investment_type.to_owned();
    opp.time_horizon = "7-10 years".to_owned();
    opp.market_analysis = format!("{property} inventory sourced from LoopNet active sale listings.");
    opp.key_metrics = vec![KeyMetric::new("Asking Price", format!("{price:.0}"), Some("USD"))];
    if let Some(cap) = listing.cap_rate {
        opp.key_metrics
            .push(KeyMetric::new("Cap Rate", format!("{cap:.2}"), Some("%")));
    }
    opp.next_steps = vec![
        "Request the offering memorandum".to_owned(),
        "Review tenant leases and rent roll".to_owned(),
    ];
    opp.source_url = listing.url;
    opp.location = Some(Location {
        address: listing.address,
        city: listing.city.unwrap_or_default(),
        state: listing.state.unwrap_or_default(),
        country: "US".to_owned(),
        ..Location::default()
    });
    opp.proposal_ready = true;
    opp.estimated_funding_required = (price * equity_share / 1_000.0).round() * 1_000.0;
    Some(opp)
}
