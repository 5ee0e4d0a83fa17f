//! Risk Profile Classifier
//!
//! Maps a snapshot to one of three tiers from its DeFi, NFT and top-token
//! exposure. Note the top-token share here is the *first* listed token, unlike
//! the concentration insight and the health scorer, which use the largest one.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{PortfolioSnapshot, ratio};

/// Coarse portfolio aggressiveness
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    #[default]
    Conservative,
    Balanced,
    Aggressive,
}

impl RiskProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }

    /// One-line advisory stance for this tier
    pub fn guidance(self) -> &'static str {
        match self {
            Self::Conservative => "Prioritize capital preservation and downside protection.",
            Self::Balanced => "Balance risk and opportunity with measured exposure.",
            Self::Aggressive => "Accept volatility in pursuit of higher growth.",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exposure ratios against total portfolio value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExposureRatios {
    pub defi: Decimal,
    pub nft: Decimal,

    /// First listed token against total
    pub top_token: Decimal,
}

impl ExposureRatios {
    /// `None` when the portfolio total is absent or zero
    pub fn of(snapshot: &PortfolioSnapshot) -> Option<Self> {
        let total = snapshot.total_value();
        Some(Self {
            defi: ratio(snapshot.defi_value(), total)?,
            nft: ratio(snapshot.nft_value(), total)?,
            top_token: snapshot
                .first_token()
                .and_then(|t| ratio(t.value, total))
                .unwrap_or(Decimal::ZERO),
        })
    }
}

/// Lower bounds (exclusive) that place a portfolio in a tier
struct TierBand {
    profile: RiskProfile,
    defi: Decimal,
    nft: Decimal,
    top_token: Decimal,
}

impl TierBand {
    fn matches(&self, ratios: &ExposureRatios) -> bool {
        ratios.defi > self.defi || ratios.nft > self.nft || ratios.top_token > self.top_token
    }
}

/// Checked in order; the first matching band wins
const BANDS: [TierBand; 2] = [
    TierBand {
        profile: RiskProfile::Aggressive,
        defi: dec!(0.35),
        nft: dec!(0.25),
        top_token: dec!(0.6),
    },
    TierBand {
        profile: RiskProfile::Balanced,
        defi: dec!(0.15),
        nft: dec!(0.1),
        top_token: dec!(0.35),
    },
];

/// Classify the snapshot's risk tier
pub fn infer_risk_profile(snapshot: &PortfolioSnapshot) -> RiskProfile {
    let Some(ratios) = ExposureRatios::of(snapshot) else {
        return RiskProfile::Conservative;
    };

    BANDS
        .iter()
        .find(|band| band.matches(&ratios))
        .map_or(RiskProfile::Conservative, |band| band.profile)
}
