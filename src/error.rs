use thiserror::Error;

/// Maximum number of characters of a remote body kept in an error.
pub const MAX_DIAGNOSTIC_CHARS: usize = 300;

/// Everything that can end a prediction request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Missing or invalid startup configuration (credential, endpoint, timeout).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The prediction service could not be reached, or did not answer in time.
    #[error("Prediction service unreachable: {message}")]
    Transport { message: String, timed_out: bool },

    /// The service answered, but with a non-2xx status or an undecodable body.
    #[error("{}", protocol_message(.status, .body))]
    Protocol { status: Option<u16>, body: String },

    /// Well-formed JSON without any usable probability value.
    #[error("No win probability found in model response: {payload}")]
    Extraction { payload: String },

    /// Bad user input; the request is never sent.
    #[error("Invalid {field}: {message}")]
    InputValidation { field: String, message: String },
}

impl PredictionError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        PredictionError::InputValidation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Short machine-readable name used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Configuration(_) => "configuration",
            PredictionError::Transport { .. } => "transport",
            PredictionError::Protocol { .. } => "protocol",
            PredictionError::Extraction { .. } => "extraction",
            PredictionError::InputValidation { .. } => "input_validation",
        }
    }
}

fn protocol_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("Model endpoint error {}: {}", code, body),
        None => format!("Undecodable model response: {}", body),
    }
}

/// Cut a diagnostic payload down to [`MAX_DIAGNOSTIC_CHARS`] characters.
pub fn truncate_diagnostic(text: &str) -> String {
    if text.chars().count() <= MAX_DIAGNOSTIC_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
    out.push_str("...");
    out
}
