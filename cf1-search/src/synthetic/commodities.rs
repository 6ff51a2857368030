//! Commodity synthetic positions, spot or exchange-traded.

use super::{usd, Draft};
use crate::query::OpportunityQuery;
use crate::types::{Category, KeyMetric, Opportunity, OpportunityType, RiskLevel};

/// How the exposure is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vehicle {
    /// Physical or futures exposure priced per unit.
    Spot,
    /// An exchange-traded fund tracking the commodity.
    Etf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    PreciousMetals,
    Energy,
    Agriculture,
    IndustrialMetals,
}

/// (name, unit, reference price, ETF ticker)
type Item = (&'static str, &'static str, f64, &'static str);

impl Group {
    fn infer(query: &OpportunityQuery) -> Option<Self> {
        if query.mentions(&["gold", "silver", "platinum", "precious", "bullion"]) {
            Some(Self::PreciousMetals)
        } else if query.mentions(&["oil", "crude", "natural gas", "gasoline", "brent"]) {
            Some(Self::Energy)
        } else if query.mentions(&["wheat", "corn", "soy", "coffee", "agri", "farm", "grain"]) {
            Some(Self::Agriculture)
        } else if query.mentions(&["copper", "aluminum", "nickel", "lithium", "industrial"]) {
            Some(Self::IndustrialMetals)
        } else {
            None
        }
    }

    fn items(&self) -> &'static [Item] {
        match self {
            Self::PreciousMetals => &[
                ("Gold", "troy oz", 2_350.0, "GLD"),
                ("Silver", "troy oz", 29.0, "SLV"),
                ("Platinum", "troy oz", 980.0, "PPLT"),
            ],
            Self::Energy => &[
                ("WTI Crude Oil", "barrel", 78.0, "USO"),
                ("Natural Gas", "MMBtu", 2.6, "UNG"),
                ("Brent Crude Oil", "barrel", 82.0, "BNO"),
            ],
            Self::Agriculture => &[
                ("Wheat", "bushel", 6.1, "WEAT"),
                ("Corn", "bushel", 4.4, "CORN"),
                ("Soybeans", "bushel", 11.8, "SOYB"),
            ],
            Self::IndustrialMetals => &[
                ("Copper", "lb", 4.5, "CPER"),
                ("Aluminum", "metric ton", 2_400.0, "DBB"),
            ],
        }
    }

    fn risk(&self) -> RiskLevel {
        match self {
            Self::PreciousMetals => RiskLevel::Low,
            Self::Agriculture | Self::IndustrialMetals => RiskLevel::Medium,
            Self::Energy => RiskLevel::High,
        }
    }
}

const ALL_GROUPS: &[Group] = &[
    Group::PreciousMetals,
    Group::Energy,
    Group::Agriculture,
    Group::IndustrialMetals,
];

pub fn generate(
    vehicle: Vehicle,
    source: &str,
    query: &OpportunityQuery,
    count: usize,
) -> Vec<Opportunity> {
    let mut draft = Draft::new(source, Category::Commodities, query);
    let pinned = Group::infer(query);

    (0..count)
        .map(|i| {
            let group = pinned.unwrap_or(ALL_GROUPS[i % ALL_GROUPS.len()]);
            let items = group.items();
            let (name, unit, reference, etf) = items[(i / ALL_GROUPS.len() + i) % items.len()];
            let price = super::round_to(reference * draft.between(0.92, 1.08), 0.01);
            let outlook = draft.between(4.0, 16.0);
            let volatility = draft.between(12.0, 38.0);
            let funding = draft.funding(2_500.0, 50_000.0, 100.0);

            let (title, investment_type) = match vehicle {
                Vehicle::Spot => (format!("{name} Spot Position"), "Commodity Spot / Futures"),
                Vehicle::Etf => (format!("{name} ETF ({etf})"), "Commodity ETF"),
            };
            let description = format!(
                "{name} trading near {} per {unit}. Twelve-month outlook of {outlook:.1}% with {volatility:.0}% annualised volatility.",
                format_price(price),
            );

            let mut opp = draft.opportunity(i, title, description, OpportunityType::Commodity);
            opp.price = Some(price);
            opp.market_value = Some(price);
            opp.estimated_roi = Some(outlook);
            opp.risk_level = if volatility > 30.0 {
                RiskLevel::High
            } else {
                group.risk()
            };
            opp.investment_type = investment_type.to_owned();
            opp.time_horizon = "1-3 years".to_owned();
            opp.market_analysis = format!(
                "{} supply and demand balance supports {name}; positioning is {} relative to the five-year average.",
                draft.focus(name),
                draft.pick(&["light", "neutral", "crowded"]),
            );
            opp.key_metrics = vec![
                KeyMetric::new("Spot Price", format_price(price), Some(unit)),
                KeyMetric::new("Volatility", format!("{volatility:.0}"), Some("%")),
                KeyMetric::new("Allocation", usd(funding), None),
            ];
            if vehicle == Vehicle::Etf {
                opp.key_metrics.push(KeyMetric::new("Ticker", etf, None));
            }
            opp.next_steps = vec![
                format!("Compare {name} futures curve and ETF tracking error"),
                "Size the allocation as a portfolio hedge".to_owned(),
                "Set a stop-loss aligned with volatility".to_owned(),
            ];
            opp.estimated_funding_required = funding;
            opp
        })
        .collect()
}

fn format_price(price: f64) -> String {
    if price >= 100.0 {
        usd(price)
    } else {
        format!("${price:.2}")
    }
}
