pub mod extract;
pub mod provider;
pub mod serving;

pub use provider::PredictionClient;
pub use serving::ServingEndpointClient;
