use thiserror::Error;

use core_service::ServiceError;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Download failed: {0}")]
    Download(#[source] ServiceError),

    #[error("Upload failed: {0}")]
    Upload(#[source] ServiceError),

    #[error("Source reconciliation failed: {0}")]
    Reconcile(#[source] ServiceError),

    #[error("Invalid transfer state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl TransferError {
    /// Whether the failure is confined to one playlist. Isolable failures
    /// are recorded and the batch continues; everything else aborts it.
    pub fn is_isolable(&self) -> bool {
        match self {
            TransferError::Download(e) | TransferError::Upload(e) => e.is_isolable(),
            TransferError::Reconcile(_) => true,
            TransferError::InvalidTransition { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
