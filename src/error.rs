use thiserror::Error;

#[derive(Error, Debug)]
pub enum HomesError {
    #[error("invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    // Remote errors
    #[error("API error: {0}")]
    Api(String),

    #[error("rate limited by listings API, retry after {0}s")]
    RateLimited(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, HomesError>;
