pub mod models;

pub use models::{GameContext, GameForm, Location, Outcome, PredictionResult, Team};
