//! Snapshot Model
//!
//! The normalized, read-only view of a wallet that every analysis consumes.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Chain assumed when a holding carries no usable chain id
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Point-in-time snapshot of a wallet's holdings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Wallet address
    pub address: String,

    /// Aggregate figures; only present when every sub-field was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_totals: Option<PortfolioTotals>,

    /// Fungible token holdings, in source order
    #[serde(default)]
    pub tokens: Vec<TokenHolding>,

    #[serde(default)]
    pub nfts: Vec<NftHolding>,

    #[serde(default)]
    pub defi_positions: Vec<DefiPosition>,

    /// Most recent first, as delivered by the indexer
    #[serde(default)]
    pub recent_transactions: Vec<TransactionRecord>,
}

/// Aggregate portfolio figures
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    /// Total value of all positions
    pub total_positions: Decimal,

    pub distribution_by_type: TypeDistribution,

    /// Chain id (as string) to value, in payload order
    pub distribution_by_chain: IndexMap<String, Decimal>,

    /// Absolute 1-day change
    pub absolute_1d: Decimal,

    /// Percent 1-day change
    pub percent_1d: Decimal,
}

/// Value split by position type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDistribution {
    pub wallet: Decimal,
    pub deposited: Decimal,
    pub borrowed: Decimal,
    pub locked: Decimal,
    pub staked: Decimal,
}

/// A fungible token position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub id: String,

    /// Ticker symbol (e.g., "ETH")
    pub symbol: String,

    pub name: String,

    /// Raw balance as reported by the chain (decimal string)
    pub balance: String,

    /// Position value
    pub value: Decimal,

    /// Unit price; 0 when unknown
    pub price: Decimal,

    /// 24-hour price change percentage; 0 when unknown
    pub price_change_24h: Decimal,

    pub chain_id: u64,
}

impl TokenHolding {
    pub fn new(symbol: impl Into<String>, value: Decimal) -> Self {
        let symbol = symbol.into();
        Self {
            id: symbol.to_lowercase(),
            name: symbol.clone(),
            symbol,
            balance: "0".into(),
            value,
            price: Decimal::ZERO,
            price_change_24h: Decimal::ZERO,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

/// A collectible
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftHolding {
    pub id: String,
    pub name: String,
    pub collection: String,
    pub chain_id: u64,

    /// Estimated value, if the indexer could price it
    #[serde(default)]
    pub value: Option<Decimal>,

    #[serde(default)]
    pub price: Option<Decimal>,
}

impl NftHolding {
    pub fn new(name: impl Into<String>, collection: impl Into<String>, value: Option<Decimal>) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase(),
            name,
            collection: collection.into(),
            chain_id: DEFAULT_CHAIN_ID,
            value,
            price: None,
        }
    }
}

/// A position inside a DeFi protocol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiPosition {
    pub id: String,
    pub name: String,

    /// Protocol name (e.g., "Aave")
    pub protocol: String,

    /// Position type (e.g., "deposit", "staked")
    #[serde(rename = "type")]
    pub position_type: String,

    pub value: Decimal,

    /// 0 when unknown
    pub price: Decimal,

    /// 0 when unknown
    pub apy: Decimal,

    pub chain_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
}

impl DefiPosition {
    pub fn new(protocol: impl Into<String>, name: impl Into<String>, value: Decimal) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase(),
            name,
            protocol: protocol.into(),
            position_type: "deposit".into(),
            value,
            price: Decimal::ZERO,
            apy: Decimal::ZERO,
            chain_id: DEFAULT_CHAIN_ID,
            token_name: None,
            token_symbol: None,
        }
    }
}

/// An on-chain transaction touching the wallet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub hash: String,

    /// e.g. "trade", "send", "receive"
    pub operation_type: String,

    /// Block time, serialized as epoch millis
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub mined_at: DateTime<Utc>,

    pub sent_from: String,
    pub sent_to: String,
    pub fee: Decimal,

    /// Fungible transfers only; transfers without an asset descriptor are dropped
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// A single fungible movement within a transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub fungible_info: FungibleInfo,

    /// Raw quantity (decimal string)
    pub quantity: String,

    #[serde(default)]
    pub value: Option<Decimal>,

    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Descriptor of the asset moved by a transfer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FungibleInfo {
    pub name: String,
    pub symbol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl PortfolioSnapshot {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Builder: attach aggregate figures
    pub fn with_totals(mut self, totals: PortfolioTotals) -> Self {
        self.portfolio_totals = Some(totals);
        self
    }

    /// Total positions value, 0 when totals are absent
    pub fn total_value(&self) -> Decimal {
        self.portfolio_totals
            .as_ref()
            .map_or(Decimal::ZERO, |t| t.total_positions)
    }

    /// 1-day percent change, 0 when totals are absent
    pub fn percent_change_1d(&self) -> Decimal {
        self.portfolio_totals
            .as_ref()
            .map_or(Decimal::ZERO, |t| t.percent_1d)
    }

    /// Chain distribution, if totals are present
    pub fn chain_distribution(&self) -> Option<&IndexMap<String, Decimal>> {
        self.portfolio_totals.as_ref().map(|t| &t.distribution_by_chain)
    }

    /// Token with the highest value; the earliest token wins a tie
    pub fn largest_token(&self) -> Option<&TokenHolding> {
        self.tokens.iter().fold(None, |best, token| match best {
            Some(current) if token.value <= current.value => Some(current),
            _ => Some(token),
        })
    }

    /// First token in source order (not necessarily the largest)
    pub fn first_token(&self) -> Option<&TokenHolding> {
        self.tokens.first()
    }

    /// Sum of token values
    pub fn token_value(&self) -> Decimal {
        saturating_sum(self.tokens.iter().map(|t| t.value))
    }

    /// Sum of DeFi position values
    pub fn defi_value(&self) -> Decimal {
        saturating_sum(self.defi_positions.iter().map(|d| d.value))
    }

    /// Sum of priced NFT values; unpriced NFTs count as 0
    pub fn nft_value(&self) -> Decimal {
        saturating_sum(self.nfts.iter().filter_map(|n| n.value))
    }
}

impl PortfolioTotals {
    /// Totals with an empty type split and no 1-day change
    pub fn new(total_positions: Decimal) -> Self {
        Self {
            total_positions,
            distribution_by_type: TypeDistribution::default(),
            distribution_by_chain: IndexMap::new(),
            absolute_1d: Decimal::ZERO,
            percent_1d: Decimal::ZERO,
        }
    }

    /// Builder: append a chain to the distribution (order is preserved)
    pub fn with_chain(mut self, chain_id: impl Into<String>, value: Decimal) -> Self {
        self.distribution_by_chain.insert(chain_id.into(), value);
        self
    }

    /// Builder: set the 1-day percent change
    pub fn with_percent_1d(mut self, percent_1d: Decimal) -> Self {
        self.percent_1d = percent_1d;
        self
    }
}

/// `part / whole`, or `None` when `whole` is not positive
///
/// A quotient beyond the `Decimal` range saturates at `Decimal::MAX`.
pub fn ratio(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return None;
    }
    Some(part.checked_div(whole).unwrap_or(if part.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }))
}

/// Sum that saturates at the `Decimal` bounds instead of overflowing
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_largest_token_tie_keeps_first() {
        let mut snapshot = PortfolioSnapshot::new("0xabc");
        snapshot.tokens = vec![
            TokenHolding::new("USDC", dec!(100)),
            TokenHolding::new("ETH", dec!(500)),
            TokenHolding::new("WBTC", dec!(500)),
        ];

        assert_eq!(snapshot.largest_token().unwrap().symbol, "ETH");
        assert_eq!(snapshot.first_token().unwrap().symbol, "USDC");
    }

    #[test]
    fn test_value_sums() {
        let mut snapshot = PortfolioSnapshot::new("0xabc");
        snapshot.nfts = vec![
            NftHolding::new("Punk", "CryptoPunks", Some(dec!(40))),
            NftHolding::new("Unpriced", "Unknown", None),
        ];
        snapshot.defi_positions = vec![
            DefiPosition::new("Aave", "USDC supply", dec!(100)),
            DefiPosition::new("Lido", "stETH", dec!(50)),
        ];

        assert_eq!(snapshot.nft_value(), dec!(40));
        assert_eq!(snapshot.defi_value(), dec!(150));
        assert_eq!(snapshot.total_value(), Decimal::ZERO);
    }

    #[test]
    fn test_ratio_requires_positive_whole() {
        assert_eq!(ratio(dec!(3), dec!(4)), Some(dec!(0.75)));
        assert_eq!(ratio(dec!(3), Decimal::ZERO), None);
    }

    #[test]
    fn test_ratio_and_sums_saturate() {
        assert_eq!(ratio(dec!(10000000000000000000000), dec!(0.0000000001)), Some(Decimal::MAX));

        let mut snapshot = PortfolioSnapshot::new("0xabc");
        snapshot.defi_positions = vec![
            DefiPosition::new("Aave", "a", dec!(50000000000000000000000000000)),
            DefiPosition::new("Lido", "b", dec!(50000000000000000000000000000)),
        ];
        assert_eq!(snapshot.defi_value(), Decimal::MAX);
        assert_eq!(saturating_sum([dec!(1), dec!(2)]), dec!(3));
    }
}
