//! Timeline Assembler
//!
//! Merges insights, recent transactions and DeFi positions into one feed,
//! newest first.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::insight::{Insight, Severity};
use crate::model::{DefiPosition, PortfolioSnapshot, TransactionRecord};
use crate::rules::RuleSet;

/// Transactions taken from the head of the snapshot
pub const MAX_TRANSACTION_EVENTS: usize = 10;

/// DeFi positions taken from the head of the snapshot
pub const MAX_DEFI_EVENTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineCategory {
    Insight,
    Transaction,
    Defi,
}

impl TimelineCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insight => "insight",
            Self::Transaction => "transaction",
            Self::Defi => "defi",
        }
    }
}

/// A single entry of the activity feed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub id: String,
    pub category: TimelineCategory,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    pub title: String,
    pub description: String,

    #[serde(serialize_with = "crate::clock::iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl From<&Insight> for TimelineEvent {
    fn from(insight: &Insight) -> Self {
        Self {
            id: insight.id.clone(),
            category: TimelineCategory::Insight,
            severity: Some(insight.severity),
            title: insight.title.clone(),
            description: insight.description.clone(),
            timestamp: insight.created_at,
        }
    }
}

impl From<&TransactionRecord> for TimelineEvent {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            id: format!("tx-{}", tx.hash),
            category: TimelineCategory::Transaction,
            severity: Some(Severity::Low),
            title: format!("Transaction: {}", tx.operation_type),
            description: format!("{} transfers", tx.transfers.len()),
            timestamp: tx.mined_at,
        }
    }
}

impl TimelineEvent {
    /// DeFi positions carry no timestamp; they are stamped with `now`
    pub fn from_defi(position: &DefiPosition, now: DateTime<Utc>) -> Self {
        let key = if position.id.is_empty() { &position.name } else { &position.id };
        let protocol = if position.protocol.is_empty() { "Unknown" } else { &position.protocol };
        let description = if position.name.is_empty() {
            position.position_type.clone()
        } else {
            position.name.clone()
        };

        Self {
            id: format!("defi-{key}"),
            category: TimelineCategory::Defi,
            severity: Some(Severity::Medium),
            title: format!("DeFi position: {protocol}"),
            description,
            timestamp: now,
        }
    }
}

/// Assemble the feed from pre-computed insights
pub fn assemble(insights: &[Insight], snapshot: &PortfolioSnapshot, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = insights.iter().map(TimelineEvent::from).collect();

    events.extend(
        snapshot
            .recent_transactions
            .iter()
            .take(MAX_TRANSACTION_EVENTS)
            .map(TimelineEvent::from),
    );

    events.extend(
        snapshot
            .defi_positions
            .iter()
            .take(MAX_DEFI_EVENTS)
            .map(|p| TimelineEvent::from_defi(p, now)),
    );

    // Stable: equal timestamps keep insight, transaction, defi order
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

/// Run the gateway rules and assemble the feed
pub fn build_timeline(snapshot: &PortfolioSnapshot, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let insights = RuleSet::gateway().evaluate(snapshot, now);
    assemble(&insights, snapshot, now)
}
