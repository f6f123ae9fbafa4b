//! Per-playlist transfer lifecycle and progress observation.

use std::fmt;

use tracing::{error, info};

use crate::error::{Result, TransferError};

/// The current stage of one playlist's transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Queued, nothing fetched yet
    Pending,
    /// Being materialized from the source
    Downloading,
    /// Passing through the configured transform
    Transforming,
    /// Being written to the destination
    Uploading,
    /// Transferred successfully
    Done,
    /// Transfer failed at some stage
    Failed,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Done | TransferStatus::Failed)
    }

    /// Check whether moving to `next` is a legal lifecycle step.
    ///
    /// The happy path is strictly forward, with `Transforming` optional;
    /// `Failed` is reachable from every non-terminal state.
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        use TransferStatus::*;
        match (self, next) {
            (Pending, Downloading) => true,
            (Downloading, Transforming) => true,
            (Downloading, Uploading) => true,
            (Transforming, Uploading) => true,
            (Uploading, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Downloading => "downloading",
            TransferStatus::Transforming => "transforming",
            TransferStatus::Uploading => "uploading",
            TransferStatus::Done => "done",
            TransferStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks one playlist through the transfer lifecycle, rejecting illegal
/// transitions and notifying the observer on each legal one.
#[derive(Debug)]
pub struct TransferItem {
    pub index: usize,
    pub name: String,
    status: TransferStatus,
}

impl TransferItem {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            name: String::new(),
            status: TransferStatus::Pending,
        }
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    /// The playlist name is unknown until the download yields it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn advance(&mut self, next: TransferStatus, observer: &dyn ProgressObserver) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(TransferError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        observer.on_transition(self);
        Ok(())
    }
}

/// Receives state-transition callbacks during a transfer.
pub trait ProgressObserver: Send + Sync {
    fn on_transition(&self, item: &TransferItem);
}

/// Default observer that reports transitions through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_transition(&self, item: &TransferItem) {
        match item.status() {
            TransferStatus::Failed => {
                error!(index = item.index, name = %item.name, "playlist transfer failed")
            }
            status => {
                info!(index = item.index, name = %item.name, status = %status, "playlist transfer")
            }
        }
    }
}
