use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::error::PredictionError;
use crate::game::{GameContext, Location, Team};

/// Phoenix Suns game predictor backed by a hosted model endpoint
#[derive(Parser, Debug, Clone)]
#[command(name = "suns-predictor", version, about)]
pub struct Config {
    /// Bearer token for the model-serving endpoint
    #[arg(long, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Model-serving invocations URL
    #[arg(
        long,
        env = "PREDICTION_ENDPOINT_URL",
        default_value = "https://dbc-b6951fe2-dfb1.cloud.databricks.com/serving-endpoints/tem-project_rana/invocations"
    )]
    pub endpoint_url: String,

    /// Seconds to wait for the model before giving up
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Predict a single game and print the explanation
    Predict(GameArgs),
    /// Serve the JSON prediction API
    Serve {
        /// API listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
}

/// Game features for a one-off prediction.
#[derive(Args, Debug, Clone)]
pub struct GameArgs {
    /// Opponent team code (e.g. LAL)
    #[arg(long)]
    pub opponent: Team,

    /// Home or Away
    #[arg(long)]
    pub location: Location,

    /// Suns streak; losses are negative
    #[arg(long, allow_negative_numbers = true, default_value = "0")]
    pub suns_streak: i32,

    /// Opponent streak; losses are negative
    #[arg(long, allow_negative_numbers = true, default_value = "0")]
    pub opponent_streak: i32,

    /// Days since the Suns' previous game
    #[arg(long, default_value = "1")]
    pub suns_rest_days: i32,

    /// Days since the opponent's previous game
    #[arg(long, default_value = "1")]
    pub opponent_rest_days: i32,
}

impl GameArgs {
    pub fn to_context(&self) -> Result<GameContext, PredictionError> {
        GameContext::new(
            self.opponent,
            self.location,
            self.suns_streak,
            self.opponent_streak,
            self.suns_rest_days,
            self.opponent_rest_days,
        )
    }
}

/// Settings the prediction client needs, checked once at startup.
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    pub endpoint_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl Config {
    pub fn validate(&self) -> Result<EndpointSettings, PredictionError> {
        let token = match self.token.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(PredictionError::Configuration(
                    "DATABRICKS_TOKEN is required to call the prediction endpoint".into(),
                ));
            }
        };

        let url = url::Url::parse(&self.endpoint_url).map_err(|e| {
            PredictionError::Configuration(format!(
                "endpoint_url '{}' is not a valid URL: {}",
                self.endpoint_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PredictionError::Configuration(format!(
                "endpoint_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(PredictionError::Configuration(
                "request_timeout_secs must be between 1 and 300".into(),
            ));
        }

        Ok(EndpointSettings {
            endpoint_url: url.to_string(),
            token,
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}
