use thiserror::Error;

use crate::mx::Error as MxError;

/// Failures that are not a classified verification outcome.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Mx(#[from] MxError),
    #[error("verification cancelled")]
    Cancelled,
    #[error("verification task failed: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl VerifyError {
    pub(crate) fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }
}
