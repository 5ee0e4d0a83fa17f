//! Router Assembly

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    advisory_insights, chat_context, health_check, insights, portfolio_analysis,
    portfolio_health, risk_profile, timeline,
};
use crate::state::AppState;

/// Route table shared by `main` and the route tests
pub fn build_router(state: AppState) -> Router {
    let cors = state.config.cors_layer();

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Analytics
        .route("/api/insights", post(insights))
        .route("/api/insights/advisory", post(advisory_insights))
        .route("/api/timeline", post(timeline))
        .route("/api/risk-profile", post(risk_profile))
        .route("/api/portfolio-health", post(portfolio_health))
        .route("/api/portfolio-analysis", post(portfolio_analysis))

        // Chat
        .route("/api/chat/context", post(chat_context))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use portfolio_insights::{FixedClock, PortfolioAdvisor};

    use crate::config::ServerConfig;

    fn app() -> Router {
        let advisor = PortfolioAdvisor::new(Arc::new(FixedClock::at_millis(1_700_000_000_000)));
        build_router(AppState::new(advisor, ServerConfig::default()))
    }

    fn portfolio() -> Value {
        json!({
            "address": "0xabc",
            "portfolio": {
                "positions_distribution_by_type": {
                    "wallet": 1000, "deposited": 0, "borrowed": 0, "locked": 0, "staked": 0
                },
                "positions_distribution_by_chain": { "1": 900, "137": 100 },
                "total": { "positions": 1000 },
                "changes": { "absolute_1d": 0, "percent_1d": 0 }
            },
            "tokens": [
                { "id": "eth", "symbol": "ETH", "name": "Ether", "balance": "0.3", "value": 700 }
            ],
            "recentTransactions": [
                {
                    "id": "t1", "hash": "0xfeed", "operation_type": "trade",
                    "mined_at": 1_699_990_000_000_i64, "sent_from": "0xabc", "sent_to": "0xdef",
                    "fee": 1, "transfers": []
                }
            ]
        })
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_insights_route() {
        let (status, body) = post_json("/api/insights", json!({ "portfolioData": portfolio() })).await;
        assert_eq!(status, StatusCode::OK);

        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|i| i["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["high-asset-concentration", "high-chain-concentration"]);
        assert_eq!(body[0]["type"], "risk");
        assert_eq!(body[0]["severity"], "high");
        assert_eq!(body[0]["threshold"], 0.6);
        assert_eq!(body[0]["createdAt"], "2023-11-14T22:13:20.000Z");
    }

    #[tokio::test]
    async fn test_risk_profile_route() {
        let (status, body) =
            post_json("/api/risk-profile", json!({ "portfolioData": portfolio() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "riskProfile": "aggressive" }));
    }

    #[tokio::test]
    async fn test_timeline_route() {
        let (status, body) = post_json("/api/timeline", json!({ "portfolioData": portfolio() })).await;
        assert_eq!(status, StatusCode::OK);

        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["category"], "insight");
        assert_eq!(events[2]["id"], "tx-0xfeed");
    }

    #[tokio::test]
    async fn test_portfolio_analysis_route() {
        let (status, body) =
            post_json("/api/portfolio-analysis", json!({ "portfolioData": portfolio() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["riskProfile"], "aggressive");
        assert!(body["health"]["score"].as_u64().unwrap() <= 100);
        assert_eq!(body["insights"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_portfolio_is_unprocessable() {
        let mut payload = portfolio();
        payload["tokens"][0]["value"] = json!(-5);

        let (status, body) = post_json("/api/portfolio-health", json!({ "portfolioData": payload })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_FIELD");

        let (status, body) =
            post_json("/api/insights", json!({ "portfolioData": { "tokens": [] } })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_PORTFOLIO");

        let mut payload = portfolio();
        payload["portfolio"]["positions_distribution_by_chain"]["137"] = json!(-50);
        let (status, body) = post_json("/api/insights", json!({ "portfolioData": payload })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_FIELD");
    }

    #[tokio::test]
    async fn test_extreme_values_are_answered() {
        let mut payload = portfolio();
        payload["portfolio"]["total"]["positions"] = json!("0.0000000001");
        payload["tokens"][0]["value"] = json!("10000000000000000000000");

        for uri in ["/api/portfolio-analysis", "/api/insights/advisory", "/api/chat/context"] {
            let (status, _) = post_json(uri, json!({ "portfolioData": payload.clone() })).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_chat_context_route() {
        let (status, body) = post_json(
            "/api/chat/context",
            json!({
                "messages": [{ "role": "user", "content": "How are my holdings doing?" }],
                "portfolioData": portfolio()
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "holdings");
        assert_eq!(body["riskProfile"], "aggressive");

        let prompt = body["systemPrompt"].as_str().unwrap();
        assert!(prompt.contains("- Ether (ETH): $700"));
        assert!(prompt.contains("[transaction] Transaction: trade (2023-11-14)"));
    }

    #[tokio::test]
    async fn test_chat_context_without_portfolio() {
        let (status, body) = post_json(
            "/api/chat/context",
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "unknown");
        assert_eq!(body["systemPrompt"], "You are a helpful Web3 AI assistant.");
    }
}
