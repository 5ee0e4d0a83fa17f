//! Payload Normalization
//!
//! Turns the loosely-typed wallet payload delivered by the data layer into a
//! [`PortfolioSnapshot`]. Shape errors fail fast here, before any rule runs;
//! missing optional data is replaced by the documented defaults.
//!
//! Accepted wire shape:
//!
//! ```text
//! {
//!   "address": "0x…",
//!   "portfolio": {
//!     "positions_distribution_by_type": { "wallet", "deposited", "borrowed", "locked", "staked" },
//!     "positions_distribution_by_chain": { "<chainId>": value, … },
//!     "total": { "positions": value },
//!     "changes": { "absolute_1d": n | null, "percent_1d": n | null }
//!   },
//!   "tokens": [ … ], "nfts": [ … ], "defiPositions": [ … ],
//!   "recentTransactions": [ { "operation_type", "mined_at": millis | ISO, "transfers": [ … ] } ]
//! }
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AdvisorError, Result};
use crate::model::{
    DEFAULT_CHAIN_ID, DefiPosition, FungibleInfo, NftHolding, PortfolioSnapshot, PortfolioTotals,
    TokenHolding, TransactionRecord, Transfer, TypeDistribution,
};

/// Parse and normalize a JSON document
pub fn normalize_json(json: &str) -> Result<PortfolioSnapshot> {
    let payload: PortfolioPayload = serde_json::from_str(json)?;
    payload.normalize()
}

/// Normalize an already parsed JSON value
pub fn normalize_value(value: serde_json::Value) -> Result<PortfolioSnapshot> {
    let payload: PortfolioPayload = serde_json::from_value(value)?;
    payload.normalize()
}

// ============================================================================
// Wire Types
// ============================================================================

/// Wallet payload as delivered by the data layer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPayload {
    pub address: String,

    #[serde(default, alias = "portfolioTotals")]
    pub portfolio: Option<TotalsPayload>,

    #[serde(default)]
    pub tokens: Vec<TokenPayload>,

    #[serde(default)]
    pub nfts: Option<Vec<NftPayload>>,

    #[serde(default)]
    pub defi_positions: Option<Vec<DefiPayload>>,

    #[serde(default)]
    pub recent_transactions: Option<Vec<TransactionPayload>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalsPayload {
    #[serde(default)]
    pub positions_distribution_by_type: Option<TypeDistribution>,

    #[serde(default)]
    pub positions_distribution_by_chain: Option<IndexMap<String, Decimal>>,

    #[serde(default)]
    pub total: Option<TotalPayload>,

    #[serde(default)]
    pub changes: Option<ChangesPayload>,
}

#[derive(Debug, Deserialize)]
pub struct TotalPayload {
    pub positions: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangesPayload {
    #[serde(default)]
    pub absolute_1d: Option<Decimal>,

    #[serde(default)]
    pub percent_1d: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub balance: String,
    pub value: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub price_change_24h: Option<Decimal>,
    #[serde(default)]
    pub chain_id: Option<ChainIdPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftPayload {
    pub id: String,
    pub name: String,
    pub collection: String,
    #[serde(default)]
    pub chain_id: Option<ChainIdPayload>,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiPayload {
    pub id: String,
    pub name: String,
    pub protocol: String,
    #[serde(rename = "type")]
    pub position_type: String,
    pub value: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub apy: Option<Decimal>,
    #[serde(default)]
    pub chain_id: Option<ChainIdPayload>,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    pub id: String,
    pub hash: String,
    #[serde(alias = "operationType")]
    pub operation_type: String,
    #[serde(alias = "minedAt")]
    pub mined_at: MinedAtPayload,
    #[serde(alias = "sentFrom")]
    pub sent_from: String,
    #[serde(alias = "sentTo")]
    pub sent_to: String,
    pub fee: Decimal,
    #[serde(default)]
    pub transfers: Vec<TransferPayload>,
}

#[derive(Debug, Deserialize)]
pub struct TransferPayload {
    #[serde(default, alias = "fungibleInfo")]
    pub fungible_info: Option<FungibleInfoPayload>,
    pub quantity: String,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct FungibleInfoPayload {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub icon: Option<IconPayload>,
}

#[derive(Debug, Deserialize)]
pub struct IconPayload {
    pub url: String,
}

/// Chain ids arrive as numbers, numeric strings or hex strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChainIdPayload {
    Number(serde_json::Number),
    Text(String),
}

/// Block time arrives as epoch millis or a date string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MinedAtPayload {
    Millis(serde_json::Number),
    Text(String),
}

// ============================================================================
// Normalization
// ============================================================================

impl PortfolioPayload {
    /// Apply defaulting rules and produce the immutable snapshot
    pub fn normalize(self) -> Result<PortfolioSnapshot> {
        let portfolio_totals = match self.portfolio {
            Some(totals) => totals.complete()?,
            None => None,
        };
        if portfolio_totals.is_none() {
            tracing::debug!(address = %self.address, "portfolio totals absent or incomplete");
        }

        let tokens = self
            .tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| t.normalize(i))
            .collect::<Result<Vec<_>>>()?;

        let nfts = self
            .nfts
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, n)| n.normalize(i))
            .collect::<Result<Vec<_>>>()?;

        let defi_positions = self
            .defi_positions
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, d)| d.normalize(i))
            .collect::<Result<Vec<_>>>()?;

        let recent_transactions = self
            .recent_transactions
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, tx)| tx.normalize(i))
            .collect::<Result<Vec<_>>>()?;

        Ok(PortfolioSnapshot {
            address: self.address,
            portfolio_totals,
            tokens,
            nfts,
            defi_positions,
            recent_transactions,
        })
    }
}

impl TotalsPayload {
    /// Totals are all-or-nothing: any missing sub-field drops the aggregate.
    /// Values that are present must still be non-negative.
    fn complete(self) -> Result<Option<PortfolioTotals>> {
        if let Some(total) = &self.total {
            ensure_non_negative(total.positions, || "portfolio.total.positions".into())?;
        }
        if let Some(by_type) = &self.positions_distribution_by_type {
            for (name, value) in [
                ("wallet", by_type.wallet),
                ("deposited", by_type.deposited),
                ("borrowed", by_type.borrowed),
                ("locked", by_type.locked),
                ("staked", by_type.staked),
            ] {
                ensure_non_negative(value, || format!("portfolio.positions_distribution_by_type.{name}"))?;
            }
        }
        if let Some(by_chain) = &self.positions_distribution_by_chain {
            for (chain, value) in by_chain {
                ensure_non_negative(*value, || format!("portfolio.positions_distribution_by_chain.{chain}"))?;
            }
        }

        let changes = self.changes.unwrap_or_default();
        let (Some(total), Some(by_type), Some(by_chain), Some(absolute_1d), Some(percent_1d)) = (
            self.total,
            self.positions_distribution_by_type,
            self.positions_distribution_by_chain,
            changes.absolute_1d,
            changes.percent_1d,
        ) else {
            return Ok(None);
        };

        Ok(Some(PortfolioTotals {
            total_positions: total.positions,
            distribution_by_type: by_type,
            distribution_by_chain: by_chain,
            absolute_1d,
            percent_1d,
        }))
    }
}

impl TokenPayload {
    fn normalize(self, index: usize) -> Result<TokenHolding> {
        ensure_non_negative(self.value, || format!("tokens[{index}].value"))?;
        Ok(TokenHolding {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            balance: self.balance,
            value: self.value,
            price: self.price.unwrap_or_default(),
            price_change_24h: self.price_change_24h.unwrap_or_default(),
            chain_id: chain_id_or_default(self.chain_id.as_ref()),
        })
    }
}

impl NftPayload {
    fn normalize(self, index: usize) -> Result<NftHolding> {
        if let Some(value) = self.value {
            ensure_non_negative(value, || format!("nfts[{index}].value"))?;
        }
        Ok(NftHolding {
            id: self.id,
            name: self.name,
            collection: self.collection,
            chain_id: chain_id_or_default(self.chain_id.as_ref()),
            value: self.value,
            price: self.price,
        })
    }
}

impl DefiPayload {
    fn normalize(self, index: usize) -> Result<DefiPosition> {
        ensure_non_negative(self.value, || format!("defiPositions[{index}].value"))?;
        Ok(DefiPosition {
            id: self.id,
            name: self.name,
            protocol: self.protocol,
            position_type: self.position_type,
            value: self.value,
            price: self.price.unwrap_or_default(),
            apy: self.apy.unwrap_or_default(),
            chain_id: chain_id_or_default(self.chain_id.as_ref()),
            token_name: self.token_name,
            token_symbol: self.token_symbol,
        })
    }
}

impl TransactionPayload {
    fn normalize(self, index: usize) -> Result<TransactionRecord> {
        let field = format!("recentTransactions[{index}].mined_at");
        let mined_at = self.mined_at.to_datetime(&field)?;

        let received = self.transfers.len();
        let transfers: Vec<Transfer> = self
            .transfers
            .into_iter()
            .filter_map(|t| {
                let info = t.fungible_info?;
                Some(Transfer {
                    fungible_info: FungibleInfo {
                        name: info.name,
                        symbol: info.symbol,
                        icon_url: info.icon.map(|i| i.url),
                    },
                    quantity: t.quantity,
                    value: t.value,
                    price: t.price,
                })
            })
            .collect();

        if transfers.len() < received {
            tracing::debug!(
                hash = %self.hash,
                dropped = received - transfers.len(),
                "dropped transfers without fungible info"
            );
        }

        Ok(TransactionRecord {
            id: self.id,
            hash: self.hash,
            operation_type: self.operation_type,
            mined_at,
            sent_from: self.sent_from,
            sent_to: self.sent_to,
            fee: self.fee,
            transfers,
        })
    }
}

impl ChainIdPayload {
    fn parse(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            Self::Text(s) => {
                let s = s.trim();
                match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => s.parse().ok(),
                }
            }
        }
    }
}

fn chain_id_or_default(chain_id: Option<&ChainIdPayload>) -> u64 {
    chain_id.and_then(ChainIdPayload::parse).unwrap_or(DEFAULT_CHAIN_ID)
}

impl MinedAtPayload {
    fn to_datetime(&self, field: &str) -> Result<DateTime<Utc>> {
        let invalid = |value: String| AdvisorError::InvalidTimestamp {
            field: field.to_string(),
            value,
        };

        match self {
            Self::Millis(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .and_then(DateTime::from_timestamp_millis)
                .ok_or_else(|| invalid(n.to_string())),
            Self::Text(s) => parse_date_string(s).ok_or_else(|| invalid(s.clone())),
        }
    }
}

/// RFC 3339 first, then the naive forms browsers emit, read as UTC
fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn ensure_non_negative(value: Decimal, field: impl FnOnce() -> String) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AdvisorError::validation(field(), "must not be negative"));
    }
    Ok(())
}
