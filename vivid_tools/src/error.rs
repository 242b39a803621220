use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum VividApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("No API token has been configured. Set VIVID_API_TOKEN or supply a token.")]
    MissingCredential,
    #[error("Could not reach the Vivid Seats API: {0}")]
    NetworkError(String),
    #[error("Too many requests. Wait a minute before fetching again.")]
    RateLimited,
    #[error("API error. HTTP {status}. {message}")]
    ApiError { status: u16, message: String },
    #[error("The server returned invalid XML data. {0}")]
    MalformedResponse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for VividApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::NetworkError(e.to_string())
    }
}
