//! Health Scorer
//!
//! Five independent sub-scores, each a continuous ratio mapped onto a few
//! discrete bands, blended into a weighted 0-100 score.
//!
//! ```text
//!  Sub-score        Weight  Bands
//!  ───────────────  ──────  ───────────────────────────────────────────
//!  diversification   20%    tokens ≥10 → 100, ≥5 → 75, ≥3 → 50, else 25
//!  concentration     25%    top/total >0.5 → 25, >0.3 → 50, else 100
//!  defiRisk          20%    defi/total >0.6 → 30, >0.3 → 60, else 100
//!  volatility        20%    |1d %| >10 → 30, >5 → 60, else 100
//!  liquidity         15%    nft/total >0.4 → 40, >0.2 → 70, else 100
//! ```

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{PortfolioSnapshot, ratio};

/// Weighted composite health of a portfolio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    /// 0-100
    pub score: u8,
    pub label: HealthLabel,
    pub breakdown: HealthBreakdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            65..=79 => Self::Good,
            45..=64 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        };
        f.write_str(s)
    }
}

/// Banded sub-scores
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdown {
    pub diversification: u8,
    pub concentration: u8,
    pub defi_risk: u8,
    pub volatility: u8,
    pub liquidity: u8,
}

impl HealthBreakdown {
    /// Weighted blend, rounded half up
    pub fn composite(&self) -> u8 {
        // Weights in hundredths: 20 / 25 / 20 / 20 / 15
        let weighted = u32::from(self.diversification) * 20
            + u32::from(self.concentration) * 25
            + u32::from(self.defi_risk) * 20
            + u32::from(self.volatility) * 20
            + u32::from(self.liquidity) * 15;
        u8::try_from((weighted + 50) / 100).unwrap_or(100)
    }
}

/// First band whose bound the value strictly exceeds, else `otherwise`
fn band(value: Decimal, bands: &[(Decimal, u8)], otherwise: u8) -> u8 {
    bands
        .iter()
        .find(|(bound, _)| value > *bound)
        .map_or(otherwise, |(_, score)| *score)
}

fn diversification(token_count: usize) -> u8 {
    match token_count {
        10.. => 100,
        5..=9 => 75,
        3..=4 => 50,
        _ => 25,
    }
}

/// Score a snapshot's health
pub fn calculate_portfolio_health(snapshot: &PortfolioSnapshot) -> HealthScore {
    let total = snapshot.total_value();

    // Largest token, floored at zero
    let top_value = snapshot
        .tokens
        .iter()
        .map(|t| t.value)
        .fold(Decimal::ZERO, Decimal::max);
    let top_ratio = ratio(top_value, total).unwrap_or(Decimal::ZERO);
    let defi_ratio = ratio(snapshot.defi_value(), total).unwrap_or(Decimal::ZERO);
    let nft_ratio = ratio(snapshot.nft_value(), total).unwrap_or(Decimal::ZERO);
    let swing = snapshot.percent_change_1d().abs();

    let breakdown = HealthBreakdown {
        diversification: diversification(snapshot.tokens.len()),
        concentration: band(top_ratio, &[(dec!(0.5), 25), (dec!(0.3), 50)], 100),
        defi_risk: band(defi_ratio, &[(dec!(0.6), 30), (dec!(0.3), 60)], 100),
        volatility: band(swing, &[(dec!(10), 30), (dec!(5), 60)], 100),
        liquidity: band(nft_ratio, &[(dec!(0.4), 40), (dec!(0.2), 70)], 100),
    };

    let score = breakdown.composite();
    HealthScore {
        score,
        label: HealthLabel::from_score(score),
        breakdown,
    }
}
