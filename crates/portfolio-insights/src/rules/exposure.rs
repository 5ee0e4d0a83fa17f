//! Liquidity and exposure rules (advisory panel)

use rust_decimal_macros::dec;

use super::{Finding, Measurement, Rule};
use crate::insight::{InsightCategory, InsightType, Severity};
use crate::model::{PortfolioSnapshot, ratio};

/// Priced NFTs against total portfolio value
pub const NFT_LIQUIDITY: Rule = Rule {
    id: "liquidity_nft_exposure",
    kind: InsightType::Risk,
    category: InsightCategory::Liquidity,
    severity: Severity::Medium,
    threshold: dec!(0.25),
    measure: measure_nft_share,
    render: render_nft,
};

/// DeFi positions against total portfolio value
pub const DEFI_EXPOSURE: Rule = Rule {
    id: "exposure_defi_heavy",
    kind: InsightType::Risk,
    category: InsightCategory::Exposure,
    severity: Severity::Medium,
    threshold: dec!(0.35),
    measure: measure_defi_share,
    render: render_defi,
};

fn measure_nft_share(snapshot: &PortfolioSnapshot) -> Option<Measurement> {
    if snapshot.nfts.is_empty() {
        return None;
    }
    let share = ratio(snapshot.nft_value(), snapshot.total_value())?;
    Some(Measurement::new(share, "nfts"))
}

fn render_nft(_: &Rule, m: &Measurement) -> Finding {
    Finding {
        title: "Illiquid collectible exposure".into(),
        description: format!("NFTs account for {}% of your portfolio value.", m.percent()),
        rationale: Some(
            "NFT valuations are estimates and can be hard to exit at the quoted price.".into(),
        ),
    }
}

fn measure_defi_share(snapshot: &PortfolioSnapshot) -> Option<Measurement> {
    if snapshot.defi_positions.is_empty() {
        return None;
    }
    let share = ratio(snapshot.defi_value(), snapshot.total_value())?;
    Some(Measurement::new(share, "defi"))
}

fn render_defi(_: &Rule, m: &Measurement) -> Finding {
    Finding {
        title: "Heavy DeFi exposure".into(),
        description: format!(
            "{}% of your portfolio is deployed in DeFi protocols.",
            m.percent()
        ),
        rationale: Some(
            "Protocol positions add smart-contract, liquidation and depeg risk on top of market risk.".into(),
        ),
    }
}
