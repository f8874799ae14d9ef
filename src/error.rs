use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("daily generation quota reached ({used}/{limit})")]
    QuotaExceeded { used: u32, limit: u32 },

    #[error("upstream request failed: {message}")]
    Upstream { message: String },

    #[error("upstream response did not match the expected variation list: {message}")]
    UpstreamParse { message: String },

    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("config error: {message}")]
    Config { message: String },
}

pub type Result<T, E = ForgeError> = std::result::Result<T, E>;
