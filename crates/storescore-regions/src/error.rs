use storescore_client::ClientError;
use storescore_core::{CoreError, DeleteRefusal, DragError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    /// Input rejected before any request; shown inline next to the field.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Region delete refused by the local pre-flight; no request was sent.
    #[error(transparent)]
    Refused(#[from] DeleteRefusal),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Drag(#[from] DragError),

    #[error("confirmation required: {0}")]
    ConfirmationRequired(&'static str),

    #[error("the store must be saved before it can be geocoded")]
    NotSaved,

    /// The backend rejected the request or could not be reached. `message` is
    /// the text shown to the user.
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: ClientError,
    },
}

impl ManagerError {
    pub(crate) fn backend(prefix: &str, source: ClientError) -> Self {
        Self::Backend {
            message: failure_message(prefix, &source),
            source,
        }
    }
}

/// `prefix`, plus the backend's detail string when the response carried one.
pub(crate) fn failure_message(prefix: &str, err: &ClientError) -> String {
    match err.detail() {
        Some(detail) => format!("{prefix}: {detail}"),
        None => prefix.to_owned(),
    }
}
