//! Allocation rules (advisory panel)

use rust_decimal_macros::dec;

use super::{Finding, Measurement, Rule};
use crate::insight::{InsightCategory, InsightType, Severity};
use crate::model::{PortfolioSnapshot, ratio};

/// Largest token against the value held in tokens
pub const ALLOCATION_CONCENTRATION: Rule = Rule {
    id: "allocation_concentration",
    kind: InsightType::Info,
    category: InsightCategory::Allocation,
    severity: Severity::Medium,
    threshold: dec!(0.5),
    measure: measure_token_share,
    render: render_allocation,
};

fn measure_token_share(snapshot: &PortfolioSnapshot) -> Option<Measurement> {
    let top = snapshot.largest_token()?;
    let share = ratio(top.value, snapshot.token_value())?;
    Some(Measurement::new(share, top.symbol.clone()))
}

fn render_allocation(rule: &Rule, m: &Measurement) -> Finding {
    Finding {
        title: "Asset allocation review required".into(),
        description: format!(
            "{} makes up {}% of your token holdings.",
            m.subject,
            m.percent()
        ),
        rationale: Some(format!(
            "Institutional risk frameworks recommend keeping any single token below {}% of holdings to reduce volatility and drawdown risk.",
            (rule.threshold * rust_decimal::Decimal::ONE_HUNDRED).normalize()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TokenHolding;
    use chrono::DateTime;

    #[test]
    fn test_allocation_share_of_tokens() {
        let mut snapshot = PortfolioSnapshot::new("0xabc");
        snapshot.tokens = vec![
            TokenHolding::new("ETH", dec!(62)),
            TokenHolding::new("USDC", dec!(38)),
        ];

        let insight = ALLOCATION_CONCENTRATION
            .apply(&snapshot, DateTime::UNIX_EPOCH)
            .unwrap();
        assert_eq!(insight.metric, Some(dec!(0.62)));
        assert_eq!(insight.threshold, Some(dec!(0.5)));
        assert!(insight.rationale.unwrap().contains("50%"));
    }

    #[test]
    fn test_even_split_does_not_fire() {
        let mut snapshot = PortfolioSnapshot::new("0xabc");
        snapshot.tokens = vec![
            TokenHolding::new("ETH", dec!(50)),
            TokenHolding::new("USDC", dec!(50)),
        ];
        assert!(ALLOCATION_CONCENTRATION.apply(&snapshot, DateTime::UNIX_EPOCH).is_none());
    }
}
