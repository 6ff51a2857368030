//! Provider adapter implementations.
//!
//! Each module provides a struct implementing
//! [`crate::adapter::ProviderAdapter`] for one provider's HTTP contract,
//! plus its synthetic flavour for degraded mode.

pub mod alpha_vantage;
pub mod attom;
pub mod bizbuysell;
pub mod commodities_api;
pub mod eia;
pub mod loopnet;
pub mod mashvisor;
pub mod rentcast;
pub mod serpapi;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::adapter::ProviderAdapter;
use crate::error::SearchError;
use crate::provider::ProviderId;
use crate::query::OpportunityQuery;

pub use alpha_vantage::AlphaVantageAdapter;
pub use attom::AttomAdapter;
pub use bizbuysell::BizBuySellAdapter;
pub use commodities_api::CommoditiesApiAdapter;
pub use eia::EiaAdapter;
pub use loopnet::LoopNetAdapter;
pub use mashvisor::MashvisorAdapter;
pub use rentcast::RentCastAdapter;
pub use serpapi::SerpApiAdapter;

/// The built-in adapter for `provider`.
pub fn for_provider(provider: ProviderId) -> Arc<dyn ProviderAdapter> {
    match provider {
        ProviderId::RentCast => Arc::new(RentCastAdapter),
        ProviderId::Attom => Arc::new(AttomAdapter),
        ProviderId::Mashvisor => Arc::new(MashvisorAdapter),
        ProviderId::LoopNet => Arc::new(LoopNetAdapter),
        ProviderId::AlphaVantage => Arc::new(AlphaVantageAdapter),
        ProviderId::CommoditiesApi => Arc::new(CommoditiesApiAdapter),
        ProviderId::Eia => Arc::new(EiaAdapter),
        ProviderId::BizBuySell => Arc::new(BizBuySellAdapter),
        ProviderId::SerpApi => Arc::new(SerpApiAdapter),
    }
}

/// Decode a provider body, tagging failures with the provider name.
pub(crate) fn decode<T: DeserializeOwned>(provider: ProviderId, body: &str) -> Result<T, SearchError> {
    serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("{provider} response: {e}")))
}

/// Accepts numbers sent either as JSON numbers or numeric strings.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(text)) => text.trim().replace(',', "").parse().ok(),
        None => None,
    })
}

/// Location query parameters shared by the location-aware providers.
pub(crate) fn city_state(query: &OpportunityQuery) -> (Option<String>, Option<String>) {
    query
        .parsed_location()
        .map_or((None, None), |loc| (loc.city, loc.state))
}

/// Capital a live result needs when the provider does not say: the low end
/// of the caller's budget, or `default`.
pub(crate) fn funding_hint(query: &OpportunityQuery, default: f64) -> f64 {
    query
        .budget_range
        .filter(|b| b.min.is_finite() && b.min >= 0.0)
        .map_or(default, |b| b.min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_f64")]
        value: Option<f64>,
    }

    #[test]
    fn factory_covers_every_provider() {
        for id in ProviderId::all() {
            assert_eq!(for_provider(*id).provider(), *id);
        }
    }

    #[test]
    fn lenient_f64_accepts_strings_and_numbers() {
        let a: Sample = serde_json::from_str(r#"{"value": 12.5}"#).expect("number");
        let b: Sample = serde_json::from_str(r#"{"value": "1,250.75"}"#).expect("string");
        let c: Sample = serde_json::from_str(r#"{"value": "n/a"}"#).expect("junk");
        let d: Sample = serde_json::from_str("{}").expect("missing");
        assert_eq!(a.value, Some(12.5));
        assert_eq!(b.value, Some(1_250.75));
        assert_eq!(c.value, None);
        assert_eq!(d.value, None);
    }

    #[test]
    fn decode_error_names_provider() {
        let err = decode::<Vec<u8>>(ProviderId::Eia, "{oops").unwrap_err();
        assert!(err.to_string().contains("EIA response"));
    }

    #[test]
    fn funding_hint_uses_budget_floor() {
        let q = OpportunityQuery::new("stocks", "ai").with_budget(2_000.0, 9_000.0);
        assert_eq!(funding_hint(&q, 500.0), 2_000.0);
        assert_eq!(funding_hint(&OpportunityQuery::new("stocks", "ai"), 500.0), 500.0);
    }
}
