use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no finished reading session to record")]
    NotCompleted,
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("saving the reading completion failed: {0}")]
    SaveFailed(#[source] ApiError),
}
