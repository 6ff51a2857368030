//! Business-for-sale and startup synthetic listings.

use super::{usd, Draft};
use crate::query::OpportunityQuery;
use crate::types::{Category, ContactInfo, KeyMetric, Opportunity, OpportunityType, RiskLevel};

/// Where the deal comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Brokered business-for-sale listings.
    Marketplace,
    /// A business opportunity bundled with its commercial premises.
    CommercialSpace,
}

/// (name, typical cash-flow multiple, risk)
type Archetype = (&'static str, f64, RiskLevel);

const MAIN_STREET: &[Archetype] = &[
    ("Laundromat", 3.5, RiskLevel::Low),
    ("Car Wash", 4.0, RiskLevel::Medium),
    ("HVAC Service Company", 3.2, RiskLevel::Low),
    ("Coffee Shop", 2.5, RiskLevel::High),
    ("Landscaping Business", 2.8, RiskLevel::Medium),
    ("Self-Storage Facility", 5.0, RiskLevel::Low),
];

const FRANCHISES: &[Archetype] = &[
    ("Fitness Franchise", 3.0, RiskLevel::Medium),
    ("Quick-Service Restaurant Franchise", 3.2, RiskLevel::Medium),
    ("Home Services Franchise", 2.9, RiskLevel::Low),
];

const STARTUPS: &[Archetype] = &[
    ("B2B SaaS Startup", 6.0, RiskLevel::High),
    ("Fintech Startup", 7.0, RiskLevel::High),
    ("Healthtech Startup", 6.5, RiskLevel::High),
];

fn archetypes(query: &OpportunityQuery) -> (&'static [Archetype], OpportunityType) {
    if query.mentions(&["startup", "saas", "seed", "venture", "tech"]) {
        (STARTUPS, OpportunityType::Startup)
    } else if query.mentions(&["franchise"]) {
        (FRANCHISES, OpportunityType::Business)
    } else {
        (MAIN_STREET, OpportunityType::Business)
    }
}

/// Index of an archetype the query names outright, such as "laundromat".
fn named(query: &OpportunityQuery, pool: &[Archetype]) -> Option<usize> {
    pool.iter().position(|(name, _, _)| {
        let name = name.to_lowercase();
        query
            .terms()
            .iter()
            .any(|t| t.len() > 3 && name.contains(t.as_str()))
    })
}

fn wants_cash_flow(query: &OpportunityQuery) -> bool {
    query
        .answer_text(&["cashFlow", "cash_flow", "incomePreference"])
        .is_some_and(|t| t.contains("high") || t.contains("positive") || t.contains("immediate"))
        || query.mentions(&["cash flow", "cashflow", "passive income"])
}

pub fn generate(
    channel: Channel,
    source: &str,
    query: &OpportunityQuery,
    count: usize,
) -> Vec<Opportunity> {
    let mut draft = Draft::new(source, Category::Business, query);
    let (pool, kind) = archetypes(query);
    let start = named(query, pool).unwrap_or_else(|| draft.pick(&[0usize, 1, 2]) % pool.len());
    let cash_flow_focus = wants_cash_flow(query);

    (0..count)
        .map(|i| {
            let (name, multiple, risk) = pool[(start + i) % pool.len()];
            let location = draft.location();
            let funding = draft.funding(60_000.0, 450_000.0, 5_000.0);
            // Funding is a 20% equity injection against an SBA-financed price.
            let price = super::round_to(funding / 0.2, 5_000.0);
            let sde = super::round_to(price / multiple, 1_000.0);
            let margin = if cash_flow_focus { 1.15 } else { 1.0 };
            let monthly_cash_flow = super::round_to(sde * margin / 12.0 * 0.6, 10.0);
            let roi = super::round_to(sde * margin * 0.6 / funding * 100.0, 0.1);
            let years = draft.pick(&[4u8, 7, 12, 18, 25]);

            let title = match (channel, kind) {
                (_, OpportunityType::Startup) => format!("{name} Raising Seed Round"),
                (Channel::CommercialSpace, _) => {
                    format!("{name} with Real Estate in {}", location.city)
                }
                (Channel::Marketplace, _) => format!("Established {name} in {}, {}", location.city, location.state),
            };
            let description = match kind {
                OpportunityType::Startup => format!(
                    "Early-stage {} seeking {} in equity. Revenue growing {:.0}% year over year.",
                    name.to_lowercase(),
                    usd(funding),
                    draft.between(40.0, 180.0),
                ),
                _ => format!(
                    "{years}-year-old {} asking {} with {} in seller's discretionary earnings{}.",
                    name.to_lowercase(),
                    usd(price),
                    usd(sde),
                    if cash_flow_focus {
                        "; strong owner cash flow from the first month"
                    } else {
                        ""
                    }
                ),
            };

            let mut opp = draft.opportunity(i, title, description, kind);
            opp.category = Category::Business.label().to_owned();
            opp.estimated_roi = Some(roi);
            opp.estimated_funding_required = funding;
            opp.location = Some(location);
            opp.proposal_ready = true;
            opp.contact_info = Some(ContactInfo {
                name: Some(format!("{} Listing Desk", draft.source)),
                ..ContactInfo::default()
            });

            if kind == OpportunityType::Startup {
                opp.price = Some(funding);
                opp.risk_level = RiskLevel::High;
                opp.investment_type = "Seed Equity".to_owned();
                opp.time_horizon = "5-10 years".to_owned();
                opp.key_metrics = vec![
                    KeyMetric::new("Raise", usd(funding), None),
                    KeyMetric::new("Pre-Money Valuation", usd(price * 2.0), None),
                ];
                opp.next_steps = vec![
                    "Request the pitch deck and cap table".to_owned(),
                    "Schedule a founder call".to_owned(),
                    "Complete accredited-investor verification".to_owned(),
                ];
            } else {
                opp.price = Some(price);
                opp.market_value = Some(price);
                opp.cash_flow = Some(monthly_cash_flow);
                opp.risk_level = risk;
                opp.investment_type = match channel {
                    Channel::Marketplace => "Business Acquisition".to_owned(),
                    Channel::CommercialSpace => "Business + Property Acquisition".to_owned(),
                };
                opp.time_horizon = "5-10 years".to_owned();
                opp.key_metrics = vec![
                    KeyMetric::new("Asking Price", usd(price), None),
                    KeyMetric::new("Seller's Discretionary Earnings", usd(sde), None),
                    KeyMetric::new("Multiple", format!("{multiple:.1}"), Some("x")),
                    KeyMetric::new("Years Established", years.to_string(), None),
                ];
                opp.next_steps = vec![
                    "Sign the NDA and request the CIM".to_owned(),
                    "Review three years of tax returns".to_owned(),
                    "Pre-qualify for SBA 7(a) financing".to_owned(),
                ];
            }
            opp.market_analysis = format!(
                "{} deals trade at {multiple:.1}x earnings on average; buyer demand is {}.",
                draft.focus(name),
                draft.pick(&["steady", "rising", "strong"]),
            );
            opp
        })
        .collect()
}
