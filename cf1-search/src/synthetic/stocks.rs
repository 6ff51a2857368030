//! Equity synthetic ideas.
//!
//! AI-themed queries always map to high-risk growth names; dividend queries
//! to low-risk income names.

use super::{usd, Draft};
use crate::query::OpportunityQuery;
use crate::types::{Category, KeyMetric, Opportunity, OpportunityType, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    ArtificialIntelligence,
    Dividend,
    Growth,
    Value,
}

impl Theme {
    pub fn infer(query: &OpportunityQuery) -> Self {
        if query.has_term("ai")
            || query.mentions(&["artificial intelligence", "machine learning", "semiconductor"])
        {
            Self::ArtificialIntelligence
        } else if query.mentions(&["dividend", "income", "yield", "retire"]) {
            Self::Dividend
        } else if query.mentions(&["value", "undervalued", "bank"]) {
            Self::Value
        } else {
            Self::Growth
        }
    }

    fn tickers(&self) -> &'static [(&'static str, &'static str, f64)] {
        match self {
            Self::ArtificialIntelligence => &[
                ("NVDA", "NVIDIA", 120.0),
                ("AMD", "Advanced Micro Devices", 150.0),
                ("PLTR", "Palantir Technologies", 40.0),
                ("SNOW", "Snowflake", 160.0),
                ("AI", "C3.ai", 28.0),
            ],
            Self::Dividend => &[
                ("JNJ", "Johnson & Johnson", 155.0),
                ("KO", "Coca-Cola", 62.0),
                ("PG", "Procter & Gamble", 165.0),
                ("O", "Realty Income", 56.0),
                ("VZ", "Verizon", 40.0),
            ],
            Self::Growth => &[
                ("SHOP", "Shopify", 75.0),
                ("CRWD", "CrowdStrike", 300.0),
                ("NET", "Cloudflare", 90.0),
                ("TTD", "The Trade Desk", 95.0),
            ],
            Self::Value => &[
                ("JPM", "JPMorgan Chase", 200.0),
                ("XOM", "Exxon Mobil", 115.0),
                ("CVX", "Chevron", 155.0),
                ("BRK.B", "Berkshire Hathaway", 420.0),
            ],
        }
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            Self::ArtificialIntelligence => RiskLevel::High,
            Self::Growth => RiskLevel::Medium,
            Self::Dividend | Self::Value => RiskLevel::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ArtificialIntelligence => "AI",
            Self::Dividend => "Dividend Income",
            Self::Growth => "Growth",
            Self::Value => "Value",
        }
    }
}

pub fn generate(source: &str, query: &OpportunityQuery, count: usize) -> Vec<Opportunity> {
    let theme = Theme::infer(query);
    let mut draft = Draft::new(source, Category::Stocks, query);
    let tickers = theme.tickers();
    let offset = draft.pick(&[0usize, 1, 2, 3]);

    (0..count)
        .map(|i| {
            let (symbol, company, base_price) = tickers[(offset + i) % tickers.len()];
            let price = super::round_to(base_price * draft.between(0.9, 1.1), 0.01);
            let expected_return = match theme {
                Theme::ArtificialIntelligence => draft.between(18.0, 35.0),
                Theme::Growth => draft.between(12.0, 22.0),
                Theme::Dividend => draft.between(6.0, 9.0),
                Theme::Value => draft.between(7.0, 12.0),
            };
            let dividend_yield = match theme {
                Theme::Dividend => draft.between(2.5, 5.5),
                Theme::Value => draft.between(1.5, 3.5),
                _ => 0.0,
            };
            let pe = match theme {
                Theme::ArtificialIntelligence | Theme::Growth => draft.between(45.0, 90.0),
                _ => draft.between(11.0, 22.0),
            };
            let position = draft.funding(1_000.0, 25_000.0, 100.0);

            let title = format!("{company} ({symbol}) {} Stock", theme.label());
            let description = format!(
                "{} position in {company}. Shares near ${price:.2} with a {pe:.0}x P/E{}.",
                theme.label(),
                if dividend_yield > 0.0 {
                    format!(" and a {dividend_yield:.1}% dividend yield")
                } else {
                    String::new()
                }
            );

            let mut opp = draft.opportunity(i, title, description, OpportunityType::Stock);
            opp.price = Some(price);
            opp.market_value = Some(price);
            opp.estimated_roi = Some(expected_return);
            opp.risk_level = theme.risk();
            opp.investment_type = format!("Public Equity ({})", theme.label());
            opp.time_horizon = match theme {
                Theme::Dividend | Theme::Value => "5+ years".to_owned(),
                _ => "3-5 years".to_owned(),
            };
            opp.market_analysis = format!(
                "{} names continue to draw flows; {symbol} trades at {pe:.0}x earnings against a sector median of {:.0}x.",
                draft.focus(theme.label()),
                pe * draft.between(0.8, 1.1),
            );
            opp.key_metrics = vec![
                KeyMetric::new("Ticker", symbol, None),
                KeyMetric::new("Share Price", format!("{price:.2}"), Some("USD")),
                KeyMetric::new("P/E Ratio", format!("{pe:.1}"), None),
                KeyMetric::new("Suggested Position", usd(position), None),
            ];
            if dividend_yield > 0.0 {
                opp.key_metrics
                    .push(KeyMetric::new("Dividend Yield", format!("{dividend_yield:.1}"), Some("%")));
            }
            opp.next_steps = vec![
                format!("Review {symbol} latest quarterly filing"),
                "Set position size against portfolio risk budget".to_owned(),
                "Place a limit order through your brokerage".to_owned(),
            ];
            opp.source_url = Some(format!("https://finance.yahoo.com/quote/{symbol}"));
            opp.estimated_funding_required = position;
            opp
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_query_is_high_risk() {
        let q = OpportunityQuery::new("stocks", "ai");
        let results = generate("Alpha Vantage", &q, 3);
        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .all(|r| r.kind == OpportunityType::Stock && r.risk_level == RiskLevel::High));
    }

    #[test]
    fn ai_requires_whole_term() {
        let q = OpportunityQuery::new("stocks", "retail chains");
        assert_ne!(Theme::infer(&q), Theme::ArtificialIntelligence);
        let q = OpportunityQuery::new("stocks", "machine learning leaders");
        assert_eq!(Theme::infer(&q), Theme::ArtificialIntelligence);
    }

    #[test]
    fn dividend_query_is_low_risk_with_yield() {
        let q = OpportunityQuery::new("stocks", "dividend");
        let results = generate("Alpha Vantage", &q, 2);
        for r in &results {
            assert_eq!(r.risk_level, RiskLevel::Low);
            assert!(r.key_metrics.iter().any(|m| m.label == "Dividend Yield"));
        }
    }

    #[test]
    fn tickers_do_not_repeat_within_theme_size() {
        let q = OpportunityQuery::new("stocks", "ai");
        let results = generate("Alpha Vantage", &q, 5);
        let symbols: std::collections::HashSet<_> =
            results.iter().map(|r| r.key_metrics[0].value.clone()).collect();
        assert_eq!(symbols.len(), 5);
    }
}
