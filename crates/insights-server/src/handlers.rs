//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use portfolio_insights::{
    AdvisorError, AdvisoryInsight, HealthScore, Insight, PortfolioAnalysis, PortfolioSnapshot,
    RiskProfile, TimelineEvent, normalize_value,
};

use crate::prompt::{AdvisoryView, ChatMessage, build_system_prompt};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<AdvisorError> for ErrorResponse {
    fn from(err: AdvisorError) -> Self {
        Self {
            error: err.user_message(),
            code: err.code().into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRequest {
    pub portfolio_data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfileResponse {
    pub risk_profile: RiskProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContextRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub portfolio_data: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContextResponse {
    pub view: AdvisoryView,
    pub risk_profile: RiskProfile,
    pub system_prompt: String,
}

fn snapshot_from(payload: Value) -> Result<PortfolioSnapshot, (StatusCode, Json<ErrorResponse>)> {
    normalize_value(payload).map_err(|e| {
        tracing::warn!(code = e.code(), "Rejected portfolio payload: {}", e);
        (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse::from(e)))
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Insight cards
pub async fn insights(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<Vec<Insight>> {
    let snapshot = snapshot_from(req.portfolio_data)?;
    Ok(Json(state.advisor.insights(&snapshot)))
}

/// Advisory-panel findings
pub async fn advisory_insights(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<Vec<AdvisoryInsight>> {
    let snapshot = snapshot_from(req.portfolio_data)?;
    Ok(Json(state.advisor.advisory_insights(&snapshot)))
}

/// Activity feed, newest first
pub async fn timeline(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<Vec<TimelineEvent>> {
    let snapshot = snapshot_from(req.portfolio_data)?;
    Ok(Json(state.advisor.timeline(&snapshot)))
}

pub async fn risk_profile(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<RiskProfileResponse> {
    let snapshot = snapshot_from(req.portfolio_data)?;
    Ok(Json(RiskProfileResponse {
        risk_profile: state.advisor.risk_profile(&snapshot),
    }))
}

pub async fn portfolio_health(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<HealthScore> {
    let snapshot = snapshot_from(req.portfolio_data)?;
    Ok(Json(state.advisor.health(&snapshot)))
}

/// Every view in one response
pub async fn portfolio_analysis(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<PortfolioAnalysis> {
    let snapshot = snapshot_from(req.portfolio_data)?;
    Ok(Json(state.advisor.analyze(&snapshot)))
}

/// System prompt for the chat assistant
pub async fn chat_context(
    State(state): State<AppState>,
    Json(req): Json<ChatContextRequest>,
) -> ApiResult<ChatContextResponse> {
    let view = AdvisoryView::infer(&req.messages);

    let snapshot = req.portfolio_data.map(snapshot_from).transpose()?;

    let (risk_profile, timeline) = match &snapshot {
        Some(s) => {
            let mut events = state.advisor.timeline(s);
            events.truncate(state.config.timeline_context_limit);
            (state.advisor.risk_profile(s), events)
        }
        None => (RiskProfile::default(), Vec::new()),
    };

    tracing::debug!(
        view = view.as_str(),
        risk_profile = %risk_profile,
        events = timeline.len(),
        "Built chat context"
    );

    Ok(Json(ChatContextResponse {
        view,
        risk_profile,
        system_prompt: build_system_prompt(snapshot.as_ref(), view, risk_profile, &timeline),
    }))
}
