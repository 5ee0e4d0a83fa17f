//! Insight types and presentation adapters
//!
//! One internal [`Insight`] is produced by the rules engine. It serializes to
//! the gateway shape directly; [`AdvisoryInsight`] is the advisory-panel view
//! of the same finding.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How urgent a finding is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Gateway insight type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Risk,
    Performance,
    Opportunity,
    Info,
}

/// Advisory domain of a finding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Allocation,
    Risk,
    Liquidity,
    Exposure,
}

/// A rule-triggered finding about a snapshot
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Stable rule identifier (identical across calls)
    pub id: String,

    #[serde(rename = "type")]
    pub kind: InsightType,

    /// Advisory domain; only surfaced through [`AdvisoryInsight`]
    #[serde(skip)]
    pub category: InsightCategory,

    pub severity: Severity,
    pub title: String,
    pub description: String,

    /// Why the rule fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// Measured ratio (e.g. 0.62 = 62% concentration)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub metric: Option<Decimal>,

    /// Threshold the metric was compared against
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub threshold: Option<Decimal>,

    #[serde(serialize_with = "crate::clock::iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Insight {
    /// Equality on everything except the creation stamp
    pub fn same_finding(&self, other: &Self) -> bool {
        Self {
            created_at: other.created_at,
            ..self.clone()
        } == *other
    }
}

/// Advisory-panel view of an insight
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdvisoryInsight {
    pub id: String,
    pub category: InsightCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,

    /// Deterministic explanation of why this insight was generated
    pub rationale: String,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub metric: Option<Decimal>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub threshold: Option<Decimal>,
}

impl From<&Insight> for AdvisoryInsight {
    fn from(insight: &Insight) -> Self {
        Self {
            id: insight.id.clone(),
            category: insight.category,
            severity: insight.severity,
            title: insight.title.clone(),
            description: insight.description.clone(),
            rationale: insight
                .rationale
                .clone()
                .unwrap_or_else(|| insight.description.clone()),
            metric: insight.metric,
            threshold: insight.threshold,
        }
    }
}

impl From<Insight> for AdvisoryInsight {
    fn from(insight: Insight) -> Self {
        Self::from(&insight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample() -> Insight {
        Insight {
            id: "high-asset-concentration".into(),
            kind: InsightType::Risk,
            category: InsightCategory::Risk,
            severity: Severity::High,
            title: "High asset concentration".into(),
            description: "More than 70% of your portfolio is allocated to ETH.".into(),
            rationale: None,
            metric: Some(dec!(0.7)),
            threshold: Some(dec!(0.6)),
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_gateway_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], json!("risk"));
        assert_eq!(value["severity"], json!("high"));
        assert_eq!(value["metric"], json!(0.7));
        assert!(value.get("category").is_none());
        assert!(value.get("rationale").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_advisory_adapter() {
        let advisory = AdvisoryInsight::from(&sample());
        let value = serde_json::to_value(&advisory).unwrap();
        assert_eq!(value["category"], json!("risk"));
        assert_eq!(value["rationale"], json!(sample().description));
        assert!(value.get("type").is_none());
        assert!(value.get("createdAt").is_none());
    }
}
