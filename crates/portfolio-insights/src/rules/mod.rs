//! Insight Rules Engine
//!
//! Every rule is a ratio compared against a fixed threshold. Rules are plain
//! data evaluated in declaration order, each emitting at most one insight per
//! call. The comparison is always strict: a ratio equal to the threshold does
//! not fire.

mod allocation;
mod concentration;
mod exposure;
mod risk;

pub use allocation::ALLOCATION_CONCENTRATION;
pub use concentration::{ASSET_CONCENTRATION, CHAIN_CONCENTRATION};
pub use exposure::{DEFI_EXPOSURE, NFT_LIQUIDITY};
pub use risk::RISK_CONCENTRATION;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::insight::{Insight, InsightCategory, InsightType, Severity};
use crate::model::PortfolioSnapshot;

/// The ratio a rule measured and what it was measured on
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub ratio: Decimal,

    /// Symbol, chain id or bucket the ratio refers to
    pub subject: String,
}

impl Measurement {
    pub fn new(ratio: Decimal, subject: impl Into<String>) -> Self {
        Self {
            ratio,
            subject: subject.into(),
        }
    }

    /// Ratio as a whole percentage, half away from zero, saturating at the `Decimal` bounds
    pub fn percent(&self) -> Decimal {
        self.ratio
            .saturating_mul(Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Human-readable text for a fired rule
#[derive(Clone, Debug, PartialEq)]
pub struct Finding {
    pub title: String,
    pub description: String,
    pub rationale: Option<String>,
}

/// A declarative insight rule
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Stable identifier, reused as the insight id
    pub id: &'static str,
    pub kind: InsightType,
    pub category: InsightCategory,
    pub severity: Severity,

    /// Fires when the measured ratio is strictly greater
    pub threshold: Decimal,

    /// Measure the ratio under test; `None` when the rule does not apply
    pub measure: fn(&PortfolioSnapshot) -> Option<Measurement>,

    /// Render the finding for a measurement that crossed the threshold
    pub render: fn(&Rule, &Measurement) -> Finding,
}

impl Rule {
    /// Evaluate against a snapshot, stamping the insight with `now`
    pub fn apply(&self, snapshot: &PortfolioSnapshot, now: DateTime<Utc>) -> Option<Insight> {
        let measurement = (self.measure)(snapshot)?;
        if measurement.ratio <= self.threshold {
            return None;
        }

        let finding = (self.render)(self, &measurement);
        tracing::debug!(
            rule = self.id,
            ratio = %measurement.ratio,
            threshold = %self.threshold,
            subject = %measurement.subject,
            "insight rule fired"
        );

        Some(Insight {
            id: self.id.to_string(),
            kind: self.kind,
            category: self.category,
            severity: self.severity,
            title: finding.title,
            description: finding.description,
            rationale: finding.rationale,
            metric: Some(measurement.ratio),
            threshold: Some(self.threshold),
            created_at: now,
        })
    }
}

/// An ordered collection of rules
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules behind the insight cards and the activity timeline
    pub fn gateway() -> Self {
        Self::new(vec![ASSET_CONCENTRATION, CHAIN_CONCENTRATION])
    }

    /// Category-tagged rules behind the advisory panel
    pub fn advisory() -> Self {
        Self::new(vec![
            ALLOCATION_CONCENTRATION,
            RISK_CONCENTRATION,
            NFT_LIQUIDITY,
            DEFI_EXPOSURE,
        ])
    }

    /// Builder: append a rule after the existing ones
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Evaluate every rule in declaration order
    pub fn evaluate(&self, snapshot: &PortfolioSnapshot, now: DateTime<Utc>) -> Vec<Insight> {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(snapshot, now))
            .collect()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::gateway()
    }
}

/// Run the gateway rule set
pub fn generate_insights(snapshot: &PortfolioSnapshot, now: DateTime<Utc>) -> Vec<Insight> {
    RuleSet::gateway().evaluate(snapshot, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PortfolioTotals, TokenHolding};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn scenario() -> PortfolioSnapshot {
        let mut snapshot = PortfolioSnapshot::new("0xabc").with_totals(
            PortfolioTotals::new(dec!(1000))
                .with_chain("1", dec!(900))
                .with_chain("137", dec!(100)),
        );
        snapshot.tokens = vec![TokenHolding::new("ETH", dec!(700))];
        snapshot
    }

    #[test]
    fn test_gateway_scenario() {
        let insights = generate_insights(&scenario(), DateTime::UNIX_EPOCH);

        let ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["high-asset-concentration", "high-chain-concentration"]);

        assert_eq!(insights[0].severity, Severity::High);
        assert!(insights[0].description.contains("70%"));
        assert!(insights[0].description.contains("ETH"));

        assert_eq!(insights[1].severity, Severity::Medium);
        assert!(insights[1].description.contains("90%"));
        assert!(insights[1].description.contains("chain 1"));
    }

    #[test]
    fn test_rule_order_is_declaration_order() {
        let set = RuleSet::gateway().with_rule(DEFI_EXPOSURE);
        assert_eq!(
            set.ids(),
            vec!["high-asset-concentration", "high-chain-concentration", "exposure_defi_heavy"]
        );
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_empty_snapshot_has_no_insights() {
        let snapshot = PortfolioSnapshot::new("0xabc");
        assert!(generate_insights(&snapshot, DateTime::UNIX_EPOCH).is_empty());
        assert!(RuleSet::advisory().evaluate(&snapshot, DateTime::UNIX_EPOCH).is_empty());
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(Measurement::new(dec!(0.605), "x").percent(), dec!(61));
        assert_eq!(Measurement::new(dec!(0.6049), "x").percent(), dec!(60));
    }
}
