//! # portfolio-insights
//!
//! Deterministic, explainable analytics over a point-in-time wallet snapshot.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   normalize   ┌───────────────────┐
//! │ JSON payload │ ────────────▶ │ PortfolioSnapshot │
//! └──────────────┘               └─────────┬─────────┘
//!                                          │
//!          ┌───────────────┬───────────────┼───────────────┐
//!          ▼               ▼               ▼               ▼
//!    ┌──────────┐   ┌─────────────┐  ┌──────────┐   ┌──────────┐
//!    │ RuleSet  │   │ RiskProfile │  │  Health  │   │ Timeline │
//!    │ insights │   │  classifier │  │  scorer  │   │ assembler│
//!    └──────────┘   └─────────────┘  └──────────┘   └──────────┘
//!          └───────────────┴───────┬───────┴───────────────┘
//!                                  ▼
//!                          PortfolioAdvisor
//! ```
//!
//! ## Principles
//!
//! - **Pure** - no I/O, no shared mutable state, no caches; every call
//!   recomputes from the snapshot.
//! - **Explainable** - each insight names the ratio it measured and the
//!   threshold it crossed.
//! - **Strict thresholds** - a ratio equal to its threshold never fires.
//! - **Injected time** - wall-clock time only stamps `createdAt` and DeFi
//!   events, and comes from a [`Clock`].

pub mod advisory;
pub mod clock;
pub mod error;
pub mod insight;
pub mod model;
pub mod normalize;
pub mod rules;
pub mod scoring;
pub mod timeline;

pub use advisory::{PortfolioAdvisor, PortfolioAnalysis};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AdvisorError, Result};
pub use insight::{AdvisoryInsight, Insight, InsightCategory, InsightType, Severity};
pub use model::{
    DefiPosition, FungibleInfo, NftHolding, PortfolioSnapshot, PortfolioTotals, TokenHolding,
    TransactionRecord, Transfer, TypeDistribution,
};
pub use normalize::{normalize_json, normalize_value};
pub use rules::{Rule, RuleSet, generate_insights};
pub use scoring::{
    HealthBreakdown, HealthLabel, HealthScore, RiskProfile, calculate_portfolio_health,
    infer_risk_profile,
};
pub use timeline::{TimelineCategory, TimelineEvent, build_timeline};
