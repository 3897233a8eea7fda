//! HTTP API in front of the recommendation service.
//!
//! - `POST /api/wine`: quiz answers in, `{"recommendation": "<markup>"}` out
//! - `GET /health`: liveness plus the active model id

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, Instrument};

use crate::profile::ProfileDraft;
use crate::recommend::RecommendationService;

/// Shared state for API routes.
#[derive(Clone)]
pub struct ApiState {
    /// The recommendation service, shared read-only across requests.
    pub service: Arc<RecommendationService>,
}

/// Successful recommendation body.
#[derive(Debug, Serialize)]
pub struct RecommendationBody {
    /// Recommendation or fallback markup.
    pub recommendation: String,
}

/// POST /api/wine
///
/// Validates the submitted answers and returns the recommendation markup.
/// Provider failures still answer 200 with the fallback fragment.
async fn recommend_wine(
    State(state): State<ApiState>,
    Json(draft): Json<ProfileDraft>,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("recommend", %request_id);

    async move {
        let profile = match draft.freeze() {
            Ok(profile) => profile,
            Err(e) => {
                info!(error = %e, "rejected quiz submission");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": e.to_string()})),
                )
                    .into_response();
            }
        };

        let result = state.service.recommend(&profile).await;
        info!(fallback = result.is_fallback(), "recommendation served");
        Json(RecommendationBody {
            recommendation: result.into_markup(),
        })
        .into_response()
    }
    .instrument(span)
    .await
}

/// GET /health
async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.service.model_id(),
    }))
}

/// Build the API routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/api/wine", post(recommend_wine))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the API until the process receives Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind: &str, state: ApiState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind}: {e}"))?;
    info!(addr = %bind, model = state.service.model_id(), "api listening");

    axum::serve(listener, api_routes(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!("api server failed: {e}"))
}
