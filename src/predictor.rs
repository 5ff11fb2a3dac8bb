use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::PredictionError;
use crate::explain::{generate_explanation, ExplanationReport};
use crate::game::{GameContext, Outcome, PredictionResult};
use crate::prediction::PredictionClient;

/// Everything returned for one prediction request. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub context: GameContext,
    pub win_probability: f64,
    pub outcome: Outcome,
    pub explanation: ExplanationReport,
    pub generated_at: DateTime<Utc>,
}

/// Calls the model, then explains its answer.
#[derive(Clone)]
pub struct Predictor {
    client: Arc<dyn PredictionClient>,
}

impl Predictor {
    pub fn new(client: Arc<dyn PredictionClient>) -> Self {
        Predictor { client }
    }

    pub async fn predict(&self, context: &GameContext) -> Result<PredictionReport, PredictionError> {
        info!(
            "Requesting prediction from {}: vs {} ({}), streak {:+}/{:+}, rest {}/{}",
            self.client.name(),
            context.opponent,
            context.location,
            context.suns_streak,
            context.opponent_streak,
            context.suns_rest_days,
            context.opponent_rest_days
        );

        let win_probability = match self.client.predict(context).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Prediction failed ({}): {}", e.kind(), e);
                return Err(e);
            }
        };
        if !(0.0..=1.0).contains(&win_probability) {
            let err = PredictionError::Extraction {
                payload: win_probability.to_string(),
            };
            warn!("{} returned an unusable probability: {}", self.client.name(), err);
            return Err(err);
        }
        let result = PredictionResult::from_probability(win_probability);
        let explanation = generate_explanation(context, result.win_probability);

        info!(
            "Suns {} vs {} (p={:.3}, {} supporting line(s))",
            result.outcome,
            context.opponent,
            result.win_probability,
            explanation.bullets().len()
        );

        Ok(PredictionReport {
            context: *context,
            win_probability: result.win_probability,
            outcome: result.outcome,
            explanation,
            generated_at: Utc::now(),
        })
    }
}
