//! Energy project synthetic opportunities.

use super::{usd, Draft};
use crate::query::OpportunityQuery;
use crate::types::{Category, KeyMetric, Opportunity, OpportunityType, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Technology {
    Solar,
    Wind,
    Storage,
    Royalty,
}

impl Technology {
    fn infer(query: &OpportunityQuery) -> Option<Self> {
        if query.mentions(&["solar", "photovoltaic", "pv"]) {
            Some(Self::Solar)
        } else if query.mentions(&["wind", "turbine"]) {
            Some(Self::Wind)
        } else if query.mentions(&["battery", "storage", "bess"]) {
            Some(Self::Storage)
        } else if query.mentions(&["royalt", "mineral", "oil", "gas well"]) {
            Some(Self::Royalty)
        } else {
            None
        }
    }

    fn project(&self) -> &'static str {
        match self {
            Self::Solar => "Community Solar Farm",
            Self::Wind => "Wind Farm Partnership",
            Self::Storage => "Battery Storage Project",
            Self::Royalty => "Oil & Gas Mineral Royalty",
        }
    }

    fn risk(&self) -> RiskLevel {
        match self {
            Self::Solar => RiskLevel::Low,
            Self::Wind | Self::Royalty => RiskLevel::Medium,
            Self::Storage => RiskLevel::High,
        }
    }

    fn incentive(&self) -> &'static str {
        match self {
            Self::Solar | Self::Storage => "30% investment tax credit",
            Self::Wind => "production tax credit",
            Self::Royalty => "depletion allowance",
        }
    }
}

const ROTATION: &[Technology] = &[
    Technology::Solar,
    Technology::Wind,
    Technology::Storage,
    Technology::Royalty,
];

/// Project headline for the technology the query asks about.
pub fn headline(query: &OpportunityQuery) -> &'static str {
    Technology::infer(query).map_or("Renewable Energy Project", |t| t.project())
}

pub fn generate(source: &str, query: &OpportunityQuery, count: usize) -> Vec<Opportunity> {
    let mut draft = Draft::new(source, Category::Energy, query);
    let pinned = Technology::infer(query);

    (0..count)
        .map(|i| {
            let tech = pinned.unwrap_or(ROTATION[i % ROTATION.len()]);
            let location = draft.location();
            let capacity_mw = draft.between(1.5, 40.0);
            let funding = draft.funding(25_000.0, 500_000.0, 1_000.0);
            let irr = match tech {
                Technology::Solar => draft.between(7.0, 11.0),
                Technology::Wind => draft.between(8.0, 12.0),
                Technology::Storage => draft.between(11.0, 18.0),
                Technology::Royalty => draft.between(9.0, 15.0),
            };
            let retail_rate = draft.between(10.5, 17.5);
            let distribution = super::round_to(funding * irr / 100.0 / 12.0, 10.0);

            let title = match tech {
                Technology::Royalty => format!("{} in {}", tech.project(), location.state),
                _ => format!("{capacity_mw:.1} MW {} near {}", tech.project(), location.city),
            };
            let description = format!(
                "{} in {}, {} targeting a {irr:.1}% IRR. Eligible for the {}.",
                tech.project(),
                location.city,
                location.state,
                tech.incentive(),
            );

            let mut opp = draft.opportunity(i, title, description, OpportunityType::Energy);
            opp.estimated_roi = Some(irr);
            opp.cash_flow = Some(distribution);
            opp.risk_level = tech.risk();
            opp.investment_type = match tech {
                Technology::Royalty => "Mineral Rights".to_owned(),
                _ => "Project Equity".to_owned(),
            };
            opp.time_horizon = match tech {
                Technology::Storage => "5-8 years".to_owned(),
                _ => "10-20 years".to_owned(),
            };
            opp.market_analysis = format!(
                "{} economics in {} benefit from average retail power prices of {retail_rate:.1} cents/kWh.",
                draft.focus(tech.project()),
                location.state,
            );
            opp.key_metrics = vec![
                KeyMetric::new("Capacity", format!("{capacity_mw:.1}"), Some("MW")),
                KeyMetric::new("Target IRR", format!("{irr:.1}"), Some("%")),
                KeyMetric::new("Retail Power Price", format!("{retail_rate:.1}"), Some("cents/kWh")),
                KeyMetric::new("Minimum Investment", usd(funding), None),
            ];
            opp.next_steps = vec![
                "Review the interconnection and offtake agreements".to_owned(),
                format!("Confirm eligibility for the {}", tech.incentive()),
                "Request the sponsor's financial model".to_owned(),
            ];
            opp.location = Some(location);
            opp.proposal_ready = true;
            opp.estimated_funding_required = funding;
            opp
        })
        .collect()
}
