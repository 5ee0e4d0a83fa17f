//! Portfolio Scoring
//!
//! Coarse classifications of a snapshot: risk tier and health score.

mod health;
mod risk_profile;

pub use health::{HealthBreakdown, HealthLabel, HealthScore, calculate_portfolio_health};
pub use risk_profile::{ExposureRatios, RiskProfile, infer_risk_profile};
