use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop a batch or a whole run.
///
/// Per-message problems are not errors; they surface as
/// [`crate::pipeline::SkipReason`] values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No emails could be processed")]
    NothingProcessed,

    #[error("Record sink error: {0}")]
    Sink(anyhow::Error),
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Configuration(format!("invalid pattern: {err}"))
    }
}
