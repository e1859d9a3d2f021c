use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected payload shape")]
    UnexpectedPayload,
}
