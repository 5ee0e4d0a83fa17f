//! Asset and chain concentration rules

use rust_decimal_macros::dec;

use super::{Finding, Measurement, Rule};
use crate::insight::{InsightCategory, InsightType, Severity};
use crate::model::{PortfolioSnapshot, ratio, saturating_sum};

/// Largest token against total portfolio value
pub const ASSET_CONCENTRATION: Rule = Rule {
    id: "high-asset-concentration",
    kind: InsightType::Risk,
    category: InsightCategory::Risk,
    severity: Severity::High,
    threshold: dec!(0.6),
    measure: measure_asset,
    render: render_asset,
};

/// Largest chain against the sum of the chain distribution
pub const CHAIN_CONCENTRATION: Rule = Rule {
    id: "high-chain-concentration",
    kind: InsightType::Risk,
    category: InsightCategory::Exposure,
    severity: Severity::Medium,
    threshold: dec!(0.7),
    measure: measure_chain,
    render: render_chain,
};

fn measure_asset(snapshot: &PortfolioSnapshot) -> Option<Measurement> {
    let top = snapshot.largest_token()?;
    let concentration = ratio(top.value, snapshot.total_value())?;
    Some(Measurement::new(concentration, top.symbol.clone()))
}

fn render_asset(_: &Rule, m: &Measurement) -> Finding {
    Finding {
        title: "High asset concentration".into(),
        description: format!(
            "More than {}% of your portfolio is allocated to {}.",
            m.percent(),
            m.subject
        ),
        rationale: Some(
            "A single asset dominating the portfolio exposes it to that asset's drawdowns.".into(),
        ),
    }
}

fn measure_chain(snapshot: &PortfolioSnapshot) -> Option<Measurement> {
    let chains = snapshot.chain_distribution()?;
    let total = saturating_sum(chains.values().copied());

    let (top_chain, top_value) = chains.iter().fold(None, |best, (chain, value)| match best {
        Some((_, current)) if *value <= current => best,
        _ => Some((chain, *value)),
    })?;

    let concentration = ratio(top_value, total)?;
    Some(Measurement::new(concentration, top_chain.clone()))
}

fn render_chain(_: &Rule, m: &Measurement) -> Finding {
    Finding {
        title: "High blockchain concentration".into(),
        description: format!(
            "More than {}% of your portfolio is allocated to chain {}.",
            m.percent(),
            m.subject
        ),
        rationale: Some(
            "Concentration on one network ties the portfolio to that network's outages, fees and bridge risk.".into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use crate::model::{PortfolioTotals, TokenHolding};
    use chrono::DateTime;

    fn with_token(total: Decimal, value: Decimal) -> PortfolioSnapshot {
        let mut snapshot =
            PortfolioSnapshot::new("0xabc").with_totals(PortfolioTotals::new(total));
        snapshot.tokens = vec![TokenHolding::new("USDC", dec!(1)), TokenHolding::new("ETH", value)];
        snapshot
    }

    #[test]
    fn test_asset_boundary_is_strict() {
        let at = with_token(dec!(1000), dec!(600));
        assert!(ASSET_CONCENTRATION.apply(&at, DateTime::UNIX_EPOCH).is_none());

        let above = with_token(dec!(1000), dec!(600.0001));
        let insight = ASSET_CONCENTRATION.apply(&above, DateTime::UNIX_EPOCH).unwrap();
        assert_eq!(insight.title, "High asset concentration");
        assert!(insight.description.contains("ETH"));
    }

    #[test]
    fn test_asset_uses_largest_token() {
        let mut snapshot = with_token(dec!(1000), dec!(650));
        snapshot.tokens.insert(0, TokenHolding::new("DAI", dec!(5)));
        let insight = ASSET_CONCENTRATION.apply(&snapshot, DateTime::UNIX_EPOCH).unwrap();
        assert_eq!(insight.metric, Some(dec!(0.65)));
    }

    #[test]
    fn test_asset_requires_total_and_tokens() {
        let no_total = with_token(Decimal::ZERO, dec!(600));
        assert!(measure_asset(&no_total).is_none());

        let no_tokens = PortfolioSnapshot::new("0xabc").with_totals(PortfolioTotals::new(dec!(10)));
        assert!(measure_asset(&no_tokens).is_none());
    }

    #[test]
    fn test_chain_tie_keeps_first_entry() {
        let snapshot = PortfolioSnapshot::new("0xabc").with_totals(
            PortfolioTotals::new(dec!(100))
                .with_chain("10", dec!(50))
                .with_chain("1", dec!(50)),
        );
        let m = measure_chain(&snapshot).unwrap();
        assert_eq!(m.subject, "10");
        assert_eq!(m.ratio, dec!(0.5));
    }

    #[test]
    fn test_chain_boundary_and_zero_total() {
        let at = PortfolioSnapshot::new("0xabc").with_totals(
            PortfolioTotals::new(dec!(0))
                .with_chain("1", dec!(70))
                .with_chain("137", dec!(30)),
        );
        assert!(CHAIN_CONCENTRATION.apply(&at, DateTime::UNIX_EPOCH).is_none());

        let zero = PortfolioSnapshot::new("0xabc").with_totals(
            PortfolioTotals::new(dec!(0))
                .with_chain("1", dec!(0))
                .with_chain("137", dec!(0)),
        );
        assert!(measure_chain(&zero).is_none());
    }
}
