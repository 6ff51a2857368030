//! BizBuySell: brokered businesses for sale.

use serde::Deserialize;

use super::{city_state, decode, lenient_f64};
use crate::adapter::{FetchRequest, ProviderAdapter};
use crate::error::SearchError;
use crate::http::endpoint;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::synthetic::business::{self, Channel};
use crate::types::{ContactInfo, KeyMetric, Location, Opportunity, OpportunityType, RiskLevel};

pub struct BizBuySellAdapter;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    asking_price: Option<f64>,
    /// Annual seller's discretionary earnings.
    #[serde(default, deserialize_with = "lenient_f64")]
    cash_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    gross_revenue: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    established: Option<u16>,
    #[serde(default)]
    url: Option<String>,
}

impl ProviderAdapter for BizBuySellAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::BizBuySell
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder {
        let mut params = vec![
            ("keyword", request.query.query.trim().to_owned()),
            ("limit", request.limit.to_string()),
        ];
        if let (_, Some(state)) = city_state(request.query) {
            params.push(("state", state));
        }
        client
            .get(endpoint(&descriptor.base_url, "listings"))
            .bearer_auth(api_key)
            .query(&params)
    }

    fn parse_response(
        &self,
        body: &str,
        _request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let response: SearchResponse = decode(self.provider(), body)?;
        Ok(response
            .listings
            .into_iter()
            .filter_map(to_opportunity)
            .collect())
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        business::generate(
            Channel::Marketplace,
            self.provider().name(),
            request.query,
            request.limit,
        )
    }
}

fn to_opportunity(listing: Listing) -> Option<Opportunity> {
    let price = listing.asking_price.filter(|p| *p > 0.0)?;
    let annual_cash_flow = listing.cash_flow.filter(|c| *c > 0.0);
    let multiple = annual_cash_flow.map(|c| price / c);
    let roi = annual_cash_flow.map(|c| (c / price * 1_000.0).round() / 10.0);
    let risk = match multiple {
        Some(m) if m <= 2.5 => RiskLevel::Low,
        Some(m) if m <= 4.0 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };
    let kind = if listing.title.to_lowercase().contains("startup") {
        OpportunityType::Startup
    } else {
        OpportunityType::Business
    };

    let description = listing.description.unwrap_or_else(|| {
        format!(
            "{} listed at ${price:.0}{}.",
            listing.title,
            listing
                .established
                .map(|y| format!(", established {y}"))
                .unwrap_or_default()
        )
    });
    let mut opp = Opportunity::new(
        format!("bizbuysell-{}", listing.id),
        listing.title,
        description,
        kind,
        ProviderId::BizBuySell.name(),
    );
    opp.price = Some(price);
    opp.market_value = Some(price);
    opp.cash_flow = annual_cash_flow.map(|c| (c / 12.0).round());
    opp.estimated_roi = roi;
    opp.risk_level = risk;
    opp.investment_type = "Business Acquisition".to_owned();
    opp.time_horizon = "5-7 years".to_owned();
    opp.market_analysis = match multiple {
        Some(m) => format!("Asking price is {m:.1}x seller's discretionary earnings."),
        None => "Seller has not disclosed cash flow.".to_owned(),
    };
    opp.key_metrics = vec![KeyMetric::new("Asking Price", format!("{price:.0}"), Some("USD"))];
    if let Some(cash_flow) = annual_cash_flow {
        opp.key_metrics
            .push(KeyMetric::new("Cash Flow", format!("{cash_flow:.0}"), Some("USD/year")));
    }
    if let Some(revenue) = listing.gross_revenue {
        opp.key_metrics
            .push(KeyMetric::new("Gross Revenue", format!("{revenue:.0}"), Some("USD/year")));
    }
    if let Some(year) = listing.established {
        opp.key_metrics
            .push(KeyMetric::new("Established", year.to_string(), None));
    }
    opp.next_steps = vec![
        "Sign the broker NDA and request the CIM".to_owned(),
        "Verify tax returns against stated cash flow".to_owned(),
        "Line up SBA 7(a) financing".to_owned(),
    ];
    opp.contact_info = Some(ContactInfo {
        name: Some("BizBuySell Listing Broker".to_owned()),
        website: listing.url.clone(),
        ..ContactInfo::default()
    });
    opp.source_url = listing.url;
    if let (Some(city), Some(state)) = (listing.city, listing.state) {
        opp.location = Some(Location::city_state(city, state));
    }
    opp.proposal_ready = true;
    opp.estimated_funding_required = (price * 0.2 / 1_000.0).round() * 1_000.0;
    Some(opp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::OpportunityQuery;
    use crate::types::Category;

    const MOCK_BIZBUYSELL_JSON: &str = r#"{
        "total": 2,
        "listings": [
            {
                "id": "2198765",
                "title": "Profitable Laundromat with Long Lease",
                "askingPrice": "425,000",
                "cashFlow": 170000,
                "grossRevenue": 310000,
                "city": "Tampa",
                "state": "FL",
                "established": 2009,
                "url": "https://www.bizbuysell.com/Business-Opportunity/2198765/"
            },
            {
                "id": "2198766",
                "title": "Confidential Listing",
                "askingPrice": "Not Disclosed"
            }
        ]
    }"#;

    fn request(query: &OpportunityQuery) -> FetchRequest<'_> {
        FetchRequest {
            query,
            category: Category::Business,
            limit: 3,
        }
    }

    #[test]
    fn parses_priced_listings() {
        let q = OpportunityQuery::new("business", "laundromat");
        let results = BizBuySellAdapter
            .parse_response(MOCK_BIZBUYSELL_JSON, &request(&q))
            .expect("should parse");
        assert_eq!(results.len(), 1, "undisclosed prices are skipped");
        let r = &results[0];
        assert_eq!(r.id, "bizbuysell-2198765");
        assert_eq!(r.kind, OpportunityType::Business);
        assert_eq!(r.price, Some(425_000.0));
        assert_eq!(r.estimated_roi, Some(40.0));
        assert_eq!(r.risk_level, RiskLevel::Low);
        assert_eq!(r.estimated_funding_required, 85_000.0);
        assert_eq!(r.location.as_ref().map(|l| l.city.as_str()), Some("Tampa"));
    }

    #[test]
    fn request_uses_bearer_auth() {
        let q = OpportunityQuery::new("business", "car wash").with_location("FL");
        let built = BizBuySellAdapter
            .build_request(
                &reqwest::Client::new(),
                &ProviderId::BizBuySell.default_descriptor(),
                "bk",
                &request(&q),
            )
            .build()
            .expect("request");
        assert_eq!(built.headers()["authorization"], "Bearer bk");
        let pairs: Vec<(String, String)> = built.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("keyword".into(), "car wash".into())));
        assert!(pairs.contains(&("state".into(), "FL".into())));
    }

    #[test]
    fn synthetic_is_marketplace_listing() {
        let q = OpportunityQuery::new("business", "laundromat");
        let results = BizBuySellAdapter.synthesize(&request(&q));
        assert_eq!(results.len(), 3);
        assert!(results[0].title.contains("Laundromat"));
    }
}
