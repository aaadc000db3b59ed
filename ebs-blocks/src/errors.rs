use thiserror::Error;

pub type StoreResult<T> = Result<T, BlockStoreError>;

#[derive(Debug, Error)]
pub enum BlockStoreError {
    #[error("Invalid snapshot id {0:?}")]
    InvalidSnapshotId(String),

    #[error("Invalid block index {0}")]
    InvalidBlockIndex(i64),

    /// The service answered and rejected the call.
    #[error("{operation} failed with {code}: {message}")]
    Service {
        operation: &'static str,
        code: String,
        message: String,
        status: Option<u16>,
    },

    /// The call never produced a service response (dispatch failure, timeout, bad config).
    #[error("{operation} could not reach the service: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },
}

impl BlockStoreError {
    /// The error code to print, mirroring the service's exception name where there is one.
    pub fn code(&self) -> &str {
        match self {
            BlockStoreError::Service { code, .. } => code,
            BlockStoreError::Transport { .. } => "TransportError",
            BlockStoreError::InvalidSnapshotId(_)
            | BlockStoreError::InvalidBlockIndex(_) => "InvalidRequest",
        }
    }

    pub fn message(&self) -> String {
        match self {
            BlockStoreError::Service { message, .. } => message.clone(),
            BlockStoreError::Transport { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of the failed response, when the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            BlockStoreError::Service { status, .. } => *status,
            _ => None,
        }
    }
}
