use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("api token missing, expired or invalid")]
    Unauthorized,
    #[error("api responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed api response: {0}")]
    Decode(#[from] serde_json::Error),
}
