use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::extract::extract_probability;
use super::provider::PredictionClient;
use crate::error::{truncate_diagnostic, PredictionError};
use crate::game::GameContext;

/// Single-record tabular payload in the column names the hosted model was
/// trained on.
pub fn invocation_payload(context: &GameContext) -> serde_json::Value {
    serde_json::json!({
        "dataframe_records": [{
            "opponent": context.opponent.code(),
            "location": context.location.to_string(),
            "suns_streak": context.suns_streak,
            "opp_streak": context.opponent_streak,
            "suns_rest": context.suns_rest_days,
            "opp_rest": context.opponent_rest_days,
        }]
    })
}

/// Client for a hosted model-serving endpoint (`.../serving-endpoints/<name>/invocations`).
#[derive(Clone)]
pub struct ServingEndpointClient {
    http: Client,
    endpoint_url: String,
    token: String,
    timeout: Duration,
}

impl ServingEndpointClient {
    pub fn new(endpoint_url: &str, token: &str, timeout: Duration) -> Result<Self, PredictionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                PredictionError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(ServingEndpointClient {
            http,
            endpoint_url: endpoint_url.to_string(),
            token: token.to_string(),
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> PredictionError {
        if err.is_timeout() {
            PredictionError::Transport {
                message: format!("no response within {:?}", self.timeout),
                timed_out: true,
            }
        } else {
            PredictionError::Transport {
                message: err.to_string(),
                timed_out: false,
            }
        }
    }
}

#[async_trait]
impl PredictionClient for ServingEndpointClient {
    fn name(&self) -> &str {
        "ServingEndpoint"
    }

    async fn predict(&self, context: &GameContext) -> Result<f64, PredictionError> {
        let payload = invocation_payload(context);
        debug!("Calling model endpoint {} with {}", self.endpoint_url, payload);

        let resp = self
            .http
            .post(&self.endpoint_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!("Model endpoint returned {}", status);
            return Err(PredictionError::Protocol {
                status: Some(status.as_u16()),
                body: truncate_diagnostic(&body),
            });
        }

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|_| PredictionError::Protocol {
                status: None,
                body: truncate_diagnostic(&body),
            })?;

        let probability = extract_probability(&raw)?;
        info!(
            "Model returned win probability {:.3} for {} ({})",
            probability, context.opponent, context.location
        );
        Ok(probability)
    }
}
