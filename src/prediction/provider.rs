use async_trait::async_trait;

use crate::error::PredictionError;
use crate::game::GameContext;

/// Trait that every win-probability source must implement.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Return the Suns' win probability in [0, 1] for the given game.
    async fn predict(&self, context: &GameContext) -> Result<f64, PredictionError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Canned client for tests: always answers with the same result and counts calls.
#[cfg(test)]
pub struct StubClient {
    response: Result<f64, PredictionError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl StubClient {
    pub fn answering(response: Result<f64, PredictionError>) -> Self {
        StubClient {
            response,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl PredictionClient for StubClient {
    async fn predict(&self, _context: &GameContext) -> Result<f64, PredictionError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.clone()
    }

    fn name(&self) -> &str {
        "Stub"
    }
}
