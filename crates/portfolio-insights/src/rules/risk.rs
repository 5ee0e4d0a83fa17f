//! Risk rules (advisory panel)

use rust_decimal_macros::dec;

use super::{Finding, Measurement, Rule};
use crate::insight::{InsightCategory, InsightType, Severity};
use crate::model::{PortfolioSnapshot, ratio};

/// Largest token against tokens plus DeFi positions
pub const RISK_CONCENTRATION: Rule = Rule {
    id: "risk_concentration_high",
    kind: InsightType::Risk,
    category: InsightCategory::Risk,
    severity: Severity::High,
    threshold: dec!(0.6),
    measure: measure_invested_share,
    render: render_risk,
};

fn measure_invested_share(snapshot: &PortfolioSnapshot) -> Option<Measurement> {
    let top = snapshot.largest_token()?;
    let invested = snapshot.token_value().saturating_add(snapshot.defi_value());
    let share = ratio(top.value, invested)?;
    Some(Measurement::new(share, top.symbol.clone()))
}

fn render_risk(_: &Rule, m: &Measurement) -> Finding {
    Finding {
        title: "High Asset Concentration".into(),
        description: format!(
            "{}% of portfolio value is concentrated in {}.",
            m.percent(),
            m.subject
        ),
        rationale: Some(
            "High concentration increases volatility and exposes the portfolio to single-asset risk.".into(),
        ),
    }
}
