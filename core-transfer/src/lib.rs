//! # Transfer Pipeline
//!
//! Orchestrates copying playlists between two services: a lazy download
//! stream, an optional pure transform, and per-playlist uploads with
//! failure isolation. Each playlist moves through a validated state
//! machine and reports its transitions to a progress observer.
//!
//! ## State Machine
//!
//! ```text
//! Pending → Downloading → Transforming → Uploading → Done
//!     ↓          ↓             ↓            ↓
//!     └──────────┴─────────────┴────────────┴──→ Failed
//! ```
//!
//! The `Transforming` step is skipped when no transform is configured.

pub mod error;
pub mod pipeline;
pub mod progress;

pub use error::{Result, TransferError};
pub use pipeline::{copy, copy_with_reconcile, FailedItem, TransferOptions, TransferReport};
pub use progress::{LogObserver, ProgressObserver, TransferItem, TransferStatus};
