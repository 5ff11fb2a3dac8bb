use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::error::PredictionError;
use crate::explain::{generate_explanation, ExplanationReport};
use crate::game::{GameForm, Outcome, Team};
use crate::predictor::{PredictionReport, Predictor};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
}

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/explain", post(explain_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// JSON error body plus a status code derived from the error kind.
pub struct ApiError(pub PredictionError);

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PredictionError::InputValidation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PredictionError::Transport {
                timed_out: true, ..
            } => StatusCode::GATEWAY_TIMEOUT,
            PredictionError::Transport { .. }
            | PredictionError::Protocol { .. }
            | PredictionError::Extraction { .. } => StatusCode::BAD_GATEWAY,
            PredictionError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/teams
async fn teams_handler() -> impl IntoResponse {
    let codes: Vec<&str> = Team::ALL.iter().map(|t| t.code()).collect();
    Json(codes)
}

/// POST /api/predict
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<GameForm>,
) -> Result<Json<PredictionReport>, ApiError> {
    let context = form.validate()?;
    let report = state.predictor.predict(&context).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    #[serde(flatten)]
    pub game: GameForm,
    #[serde(default)]
    pub win_probability: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub outcome: Outcome,
    pub explanation: ExplanationReport,
}

/// POST /api/explain: explain a probability the caller already has.
async fn explain_handler(Json(req): Json<ExplainRequest>) -> Result<Json<ExplainResponse>, ApiError> {
    let context = req.game.validate()?;
    let win_probability = req
        .win_probability
        .as_f64()
        .filter(|p| (0.0..=1.0).contains(p))
        .ok_or_else(|| {
            PredictionError::invalid_input(
                "win_probability",
                format!("expected a number in [0, 1], got {}", req.win_probability),
            )
        })?;
    debug!("Explaining p={:.3} vs {}", win_probability, context.opponent);

    let explanation = generate_explanation(&context, win_probability);
    Ok(Json(ExplainResponse {
        outcome: explanation.outcome,
        explanation,
    }))
}
