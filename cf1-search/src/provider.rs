//! Provider catalog: identities, descriptors, and the startup registry.
//!
//! A [`ProviderDescriptor`] is static configuration created once at process
//! start. An absent `api_key` is an expected state meaning the provider runs
//! in synthetic mode.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Category;

/// Known market-data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    /// Long-term rental listings and rent estimates.
    #[serde(rename = "rentcast")]
    RentCast,
    /// Property records, valuations and sales history.
    #[serde(rename = "attom")]
    Attom,
    /// Short-term rental (Airbnb) investment analytics.
    #[serde(rename = "mashvisor")]
    Mashvisor,
    /// Commercial property and business-space listings.
    #[serde(rename = "loopnet")]
    LoopNet,
    /// Equity symbol search and quotes.
    #[serde(rename = "alpha_vantage")]
    AlphaVantage,
    /// Spot commodity rates.
    #[serde(rename = "commodities_api")]
    CommoditiesApi,
    /// US Energy Information Administration open data.
    #[serde(rename = "eia")]
    Eia,
    /// Businesses for sale.
    #[serde(rename = "bizbuysell")]
    BizBuySell,
    /// General web search.
    #[serde(rename = "serpapi")]
    SerpApi,
}

impl ProviderId {
    /// Returns the human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RentCast => "RentCast",
            Self::Attom => "ATTOM",
            Self::Mashvisor => "Mashvisor",
            Self::LoopNet => "LoopNet",
            Self::AlphaVantage => "Alpha Vantage",
            Self::CommoditiesApi => "Commodities-API",
            Self::Eia => "EIA",
            Self::BizBuySell => "BizBuySell",
            Self::SerpApi => "SerpApi",
        }
    }

    /// Stable lowercase key, used in ids and config.
    pub fn key(&self) -> &'static str {
        match self {
            Self::RentCast => "rentcast",
            Self::Attom => "attom",
            Self::Mashvisor => "mashvisor",
            Self::LoopNet => "loopnet",
            Self::AlphaVantage => "alpha_vantage",
            Self::CommoditiesApi => "commodities_api",
            Self::Eia => "eia",
            Self::BizBuySell => "bizbuysell",
            Self::SerpApi => "serpapi",
        }
    }

    /// Environment variable the host reads this provider's API key from.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Self::RentCast => "RENTCAST_API_KEY",
            Self::Attom => "ATTOM_API_KEY",
            Self::Mashvisor => "MASHVISOR_API_KEY",
            Self::LoopNet => "LOOPNET_API_KEY",
            Self::AlphaVantage => "ALPHA_VANTAGE_API_KEY",
            Self::CommoditiesApi => "COMMODITIES_API_KEY",
            Self::Eia => "EIA_API_KEY",
            Self::BizBuySell => "BIZBUYSELL_API_KEY",
            Self::SerpApi => "SERPAPI_API_KEY",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::RentCast => "https://api.rentcast.io/v1",
            Self::Attom => "https://api.gateway.attomdata.com/propertyapi/v1.0.0",
            Self::Mashvisor => "https://api.mashvisor.com/v1.1/client",
            Self::LoopNet => "https://loopnet-api.p.rapidapi.com",
            Self::AlphaVantage => "https://www.alphavantage.co",
            Self::CommoditiesApi => "https://commodities-api.com/api",
            Self::Eia => "https://api.eia.gov/v2",
            Self::BizBuySell => "https://api.bizbuysell.com/v1",
            Self::SerpApi => "https://serpapi.com",
        }
    }

    fn default_rate_limit(&self) -> RateLimit {
        let (requests_per_minute, requests_per_day) = match self {
            Self::RentCast => (20, 500),
            Self::Attom => (10, 200),
            Self::Mashvisor => (10, 200),
            Self::LoopNet => (5, 100),
            Self::AlphaVantage => (5, 25),
            Self::CommoditiesApi => (10, 300),
            Self::Eia => (30, 5_000),
            Self::BizBuySell => (10, 200),
            Self::SerpApi => (10, 100),
        };
        RateLimit {
            requests_per_minute,
            requests_per_day,
        }
    }

    fn default_categories(&self) -> Vec<Category> {
        match self {
            Self::RentCast | Self::Attom | Self::Mashvisor => vec![Category::RealEstate],
            Self::LoopNet => vec![Category::RealEstate, Category::Business],
            Self::AlphaVantage => vec![Category::Stocks, Category::Commodities],
            Self::CommoditiesApi => vec![Category::Commodities],
            Self::Eia => vec![Category::Energy],
            Self::BizBuySell => vec![Category::Business],
            Self::SerpApi => vec![Category::General],
        }
    }

    /// Built-in descriptor for this provider, without a credential.
    pub fn default_descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: *self,
            base_url: self.default_base_url().to_owned(),
            api_key: None,
            rate_limit: self.default_rate_limit(),
            categories: self.default_categories(),
        }
    }

    /// Returns all providers in catalog declaration order.
    pub fn all() -> &'static [ProviderId] {
        &[
            Self::RentCast,
            Self::Attom,
            Self::Mashvisor,
            Self::LoopNet,
            Self::AlphaVantage,
            Self::CommoditiesApi,
            Self::Eia,
            Self::BizBuySell,
            Self::SerpApi,
        ]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared request budget for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests_per_minute: u32,
    pub requests_per_day: u32,
}

/// Static configuration for one provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub base_url: String,
    /// `None` means the provider operates in synthetic mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub rate_limit: RateLimit,
    pub categories: Vec<Category>,
}

impl ProviderDescriptor {
    /// Attach a credential. Blank keys are treated as absent.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_rate_limit(mut self, requests_per_minute: u32, requests_per_day: u32) -> Self {
        self.rate_limit = RateLimit {
            requests_per_minute,
            requests_per_day,
        };
        self
    }

    /// The usable credential, if any.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn serves(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rate_limit", &self.rate_limit)
            .field("categories", &self.categories)
            .finish()
    }
}

/// Descriptors in declaration order, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn get(&self, id: ProviderId) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Providers serving `category`, in declaration order.
    pub fn for_category(&self, category: Category) -> Vec<&ProviderDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.serves(category))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(
            ProviderId::all()
                .iter()
                .map(ProviderId::default_descriptor)
                .collect(),
        )
    }
}
