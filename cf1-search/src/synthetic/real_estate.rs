//! Real-estate synthetic listings.

use super::{usd, Draft};
use crate::query::OpportunityQuery;
use crate::types::{Category, KeyMetric, Opportunity, OpportunityType, RiskLevel};

/// Investment strategy a listing is framed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    LongTermRental,
    ShortTermRental,
    BuyAndHold,
    Commercial,
}

impl Strategy {
    /// Strategy implied by the query's text and answers.
    pub fn infer(query: &OpportunityQuery) -> Self {
        if query.mentions(&["short-term", "short term", "airbnb", "vrbo", "vacation"]) {
            Self::ShortTermRental
        } else if query.mentions(&["commercial", "office", "retail", "warehouse", "industrial"]) {
            Self::Commercial
        } else if query.mentions(&["flip", "value-add", "value add", "appreciation", "land"]) {
            Self::BuyAndHold
        } else {
            Self::LongTermRental
        }
    }

    fn investment_type(&self) -> &'static str {
        match self {
            Self::LongTermRental => "Long-Term Rental",
            Self::ShortTermRental => "Short-Term Rental",
            Self::BuyAndHold => "Value-Add Buy & Hold",
            Self::Commercial => "Commercial Lease",
        }
    }

    fn property_types(&self) -> &'static [&'static str] {
        match self {
            Self::LongTermRental => &["Single-Family Home", "Duplex", "Triplex", "Townhome"],
            Self::ShortTermRental => &["Condo", "Cabin", "Bungalow", "Townhome"],
            Self::BuyAndHold => &["Single-Family Home", "Fourplex", "Craftsman Bungalow"],
            Self::Commercial => &["Retail Strip Center", "Flex Warehouse", "Medical Office"],
        }
    }
}

/// Guided-answer property type, title-cased, if the user picked one.
fn chosen_property_type(query: &OpportunityQuery) -> Option<String> {
    query
        .answer_text(&["propertyType", "property_type"])
        .filter(|t| !t.is_empty())
        .map(|t| super::title_case(&t))
}

/// Whether the user asked for strong monthly cash flow.
fn wants_cash_flow(query: &OpportunityQuery) -> bool {
    query
        .answer_text(&["cashFlow", "cash_flow", "incomePreference"])
        .is_some_and(|t| t.contains("high") || t.contains("positive") || t.contains("immediate"))
        || query.mentions(&["cash flow", "cashflow"])
}

/// `count` listings. `strategy` pins the framing; `None` infers it.
pub fn generate(
    strategy: Option<Strategy>,
    source: &str,
    query: &OpportunityQuery,
    count: usize,
) -> Vec<Opportunity> {
    let strategy = strategy.unwrap_or_else(|| Strategy::infer(query));
    let mut draft = Draft::new(source, Category::RealEstate, query);
    let cash_flow_focus = wants_cash_flow(query);
    let chosen_type = chosen_property_type(query);

    (0..count)
        .map(|i| {
            let location = draft.location();
            let property = chosen_type
                .clone()
                .unwrap_or_else(|| draft.pick(strategy.property_types()).to_owned());

            // Funding is the down payment plus closing costs, ~25% of price.
            let funding = draft.funding(40_000.0, 180_000.0, 1_000.0);
            let price = super::round_to(funding / 0.25, 1_000.0);
            let cap_rate = match strategy {
                Strategy::ShortTermRental => draft.between(7.0, 11.0),
                Strategy::Commercial => draft.between(6.5, 9.0),
                _ => draft.between(5.0, 8.0),
            } + if cash_flow_focus { 1.5 } else { 0.0 };
            let monthly_cash_flow = super::round_to(price * cap_rate / 100.0 / 12.0 * 0.45, 10.0);
            let occupancy = draft.between(82.0, 97.0);

            let title = match strategy {
                Strategy::Commercial => format!("{property} in {}", location.city),
                _ => {
                    let beds = draft.pick(&[2u8, 3, 3, 4, 5]);
                    format!(
                        "{beds}-Bed {property} {} in {}, {}",
                        short_label(strategy),
                        location.city,
                        location.state
                    )
                }
            };
            let description = format!(
                "{} opportunity in {}. Listed at {} with an estimated {cap_rate:.1}% cap rate{}.",
                strategy.investment_type(),
                location.city,
                usd(price),
                if cash_flow_focus {
                    " and cash flow prioritised from day one"
                } else {
                    ""
                }
            );

            let mut opp = draft.opportunity(i, title, description, OpportunityType::RealEstate);
            opp.price = Some(price);
            opp.market_value = Some(super::round_to(price * draft.between(1.0, 1.12), 1_000.0));
            opp.estimated_roi = Some(cap_rate);
            opp.cash_flow = Some(monthly_cash_flow);
            opp.risk_level = match strategy {
                Strategy::LongTermRental => RiskLevel::Low,
                Strategy::ShortTermRental | Strategy::Commercial | Strategy::BuyAndHold => {
                    RiskLevel::Medium
                }
            };
            opp.investment_type = strategy.investment_type().to_owned();
            opp.time_horizon = match strategy {
                Strategy::BuyAndHold => "3-7 years".to_owned(),
                Strategy::Commercial => "7-10 years".to_owned(),
                _ => "5-10 years".to_owned(),
            };
            opp.market_analysis = format!(
                "{} demand in {} remains steady; comparable {} trade near {} with {occupancy:.0}% occupancy.",
                draft.focus("Rental"),
                location.city,
                property.to_lowercase(),
                usd(opp.market_value.unwrap_or(price)),
            );
            opp.key_metrics = vec![
                KeyMetric::new("Cap Rate", format!("{cap_rate:.1}"), Some("%")),
                KeyMetric::new("Monthly Cash Flow", usd(monthly_cash_flow), None),
                KeyMetric::new("Occupancy", format!("{occupancy:.0}"), Some("%")),
                KeyMetric::new("Down Payment", usd(funding), None),
            ];
            opp.next_steps = vec![
                "Review comparable rents and sales".to_owned(),
                "Schedule a property inspection".to_owned(),
                "Secure financing pre-approval".to_owned(),
            ];
            opp.location = Some(location);
            opp.proposal_ready = true;
            opp.estimated_funding_required = funding;
            opp
        })
        .collect()
}

fn short_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::LongTermRental => "Rental",
        Strategy::ShortTermRental => "Vacation Rental",
        Strategy::BuyAndHold => "Value-Add",
        Strategy::Commercial => "Lease",
    }
}
