use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod error;
mod explain;
mod game;
mod prediction;
mod predictor;

use api::AppState;
use config::{Command, Config};
use prediction::ServingEndpointClient;
use predictor::{PredictionReport, Predictor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    let settings = config.validate()?;

    let client = ServingEndpointClient::new(
        &settings.endpoint_url,
        &settings.token,
        settings.timeout,
    )?;
    info!(
        "Model endpoint: {} (timeout {:?})",
        settings.endpoint_url, settings.timeout
    );
    let predictor = Predictor::new(Arc::new(client));

    match config.command {
        Command::Predict(args) => {
            let context = args.to_context()?;
            let report = predictor.predict(&context).await?;
            print_report(&report);
        }
        Command::Serve { listen_addr } => {
            let app = api::router(AppState { predictor });
            let addr: SocketAddr = listen_addr.parse()?;
            info!("Prediction API listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn print_report(report: &PredictionReport) {
    println!("Suns {}!", report.outcome);
    println!("Win Probability: {:.3}", report.win_probability);
    println!();
    print!("{}", report.explanation);
}
