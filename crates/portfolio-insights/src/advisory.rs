//! Advisory Facade
//!
//! The single entry point for HTTP handlers, the prompt builder and the UI.
//! Holds no state besides the clock and the rule sets; every call recomputes
//! from the snapshot it is given.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::insight::{AdvisoryInsight, Insight};
use crate::model::PortfolioSnapshot;
use crate::rules::RuleSet;
use crate::scoring::{HealthScore, RiskProfile, calculate_portfolio_health, infer_risk_profile};
use crate::timeline::{self, TimelineEvent};

/// All four views of a snapshot, computed against one clock reading
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub insights: Vec<Insight>,
    pub risk_profile: RiskProfile,
    pub health: HealthScore,
    pub timeline: Vec<TimelineEvent>,
}

/// Orchestrates the rules engine, classifiers and timeline
#[derive(Clone)]
pub struct PortfolioAdvisor {
    clock: Arc<dyn Clock>,
    gateway: RuleSet,
    advisory: RuleSet,
}

impl Default for PortfolioAdvisor {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl PortfolioAdvisor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            gateway: RuleSet::gateway(),
            advisory: RuleSet::advisory(),
        }
    }

    /// Replace the advisory-panel rule set
    pub fn with_advisory_rules(mut self, rules: RuleSet) -> Self {
        self.advisory = rules;
        self
    }

    /// Insight cards, in rule order
    pub fn insights(&self, snapshot: &PortfolioSnapshot) -> Vec<Insight> {
        self.gateway.evaluate(snapshot, self.clock.now())
    }

    /// Advisory-panel findings, in rule order
    pub fn advisory_insights(&self, snapshot: &PortfolioSnapshot) -> Vec<AdvisoryInsight> {
        self.advisory
            .evaluate(snapshot, self.clock.now())
            .iter()
            .map(AdvisoryInsight::from)
            .collect()
    }

    /// Unified activity feed, newest first
    pub fn timeline(&self, snapshot: &PortfolioSnapshot) -> Vec<TimelineEvent> {
        let now = self.clock.now();
        let insights = self.gateway.evaluate(snapshot, now);
        timeline::assemble(&insights, snapshot, now)
    }

    pub fn risk_profile(&self, snapshot: &PortfolioSnapshot) -> RiskProfile {
        infer_risk_profile(snapshot)
    }

    pub fn health(&self, snapshot: &PortfolioSnapshot) -> HealthScore {
        calculate_portfolio_health(snapshot)
    }

    /// Every view at once; the timeline reuses the same insights
    pub fn analyze(&self, snapshot: &PortfolioSnapshot) -> PortfolioAnalysis {
        let now = self.clock.now();
        let insights = self.gateway.evaluate(snapshot, now);
        let timeline = timeline::assemble(&insights, snapshot, now);

        tracing::debug!(
            address = %snapshot.address,
            insights = insights.len(),
            events = timeline.len(),
            "portfolio analyzed"
        );

        PortfolioAnalysis {
            risk_profile: infer_risk_profile(snapshot),
            health: calculate_portfolio_health(snapshot),
            insights,
            timeline,
        }
    }
}
