use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blocked by bot protection: {0}")]
    Blocked(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("unexpected markup: {0}")]
    Parse(String),
}

impl SourceError {
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
