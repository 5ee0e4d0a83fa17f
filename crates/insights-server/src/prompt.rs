//! Advisory Prompt Context
//!
//! Renders the system prompt that grounds the chat assistant in the user's
//! portfolio. Reads the timeline and risk profile from the analytics core;
//! the completion call itself happens elsewhere.

use serde::{Deserialize, Serialize};

use portfolio_insights::{PortfolioSnapshot, RiskProfile, TimelineEvent};

/// Fallback prompt when no portfolio is attached
pub const GENERIC_ASSISTANT_PROMPT: &str = "You are a helpful Web3 AI assistant.";

/// Closing rules appended to every portfolio-aware prompt
const ADVISORY_RULES: &str = r#"Rules:
- Be precise and actionable
- Reference portfolio data when relevant
- Do NOT invent missing data
- Speak like a professional financial advisor"#;

/// Tokens listed under "Top assets"
const TOP_ASSET_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Which part of the dashboard the user is asking about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryView {
    Portfolio,
    Holdings,
    Defi,
    Nfts,
    Activity,
    Unknown,
}

impl AdvisoryView {
    /// Infer the view from the first message of the conversation
    pub fn infer(messages: &[ChatMessage]) -> Self {
        let first = messages
            .first()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        if first.contains("holding") {
            Self::Holdings
        } else if first.contains("defi") {
            Self::Defi
        } else if first.contains("nft") || first.contains("collectible") {
            Self::Nfts
        } else if first.contains("activity") || first.contains("transaction") {
            Self::Activity
        } else if first.contains("portfolio") {
            Self::Portfolio
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Holdings => "holdings",
            Self::Defi => "defi",
            Self::Nfts => "nfts",
            Self::Activity => "activity",
            Self::Unknown => "unknown",
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Self::Portfolio => "Focus on overall allocation, diversification and portfolio-level risks.",
            Self::Holdings => "Focus on token concentration, winners vs laggards and rebalancing.",
            Self::Defi => "Focus on DeFi protocols, yield sustainability and risk exposure.",
            Self::Nfts => "Focus on NFT liquidity, valuation uncertainty and collection risk.",
            Self::Activity => "Focus on recent transactions, behavioral patterns and notable actions.",
            Self::Unknown => "Adapt dynamically based on the user question.",
        }
    }
}

/// Render the advisory system prompt
///
/// `timeline` is expected to be already truncated to the context limit.
pub fn build_system_prompt(
    snapshot: Option<&PortfolioSnapshot>,
    view: AdvisoryView,
    risk_profile: RiskProfile,
    timeline: &[TimelineEvent],
) -> String {
    let Some(snapshot) = snapshot else {
        return GENERIC_ASSISTANT_PROMPT.to_string();
    };

    let mut prompt = String::from("You are a Web3 AI advisory assistant.\n\n");

    prompt.push_str("User context:\n");
    prompt.push_str(&format!("- Current view: {}\n", view.as_str().to_uppercase()));
    prompt.push_str(&format!("- Risk profile: {}\n", risk_profile.as_str().to_uppercase()));
    prompt.push_str(&format!("- Wallet: {}\n", snapshot.address));
    prompt.push_str(&format!("- Total portfolio value: ${}\n", snapshot.total_value()));

    prompt.push_str("\nTop assets:\n");
    if snapshot.tokens.is_empty() {
        prompt.push_str("- No major token positions\n");
    }
    for token in snapshot.tokens.iter().take(TOP_ASSET_COUNT) {
        prompt.push_str(&format!("- {} ({}): ${}\n", token.name, token.symbol, token.value));
    }

    if !timeline.is_empty() {
        prompt.push_str("\nRecent activity:\n");
        for event in timeline {
            prompt.push_str(&format!(
                "- [{}] {} ({})\n",
                event.category.as_str(),
                event.title,
                event.timestamp.format("%Y-%m-%d")
            ));
        }
    }

    prompt.push_str(&format!(
        "\nAdvisory focus:\n{}\n\nRisk guidance:\n{}\n\n{}",
        view.guidance(),
        risk_profile.guidance(),
        ADVISORY_RULES
    ));

    prompt
}
