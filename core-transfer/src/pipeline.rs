//! The copy pipeline: download, optional transform, upload.

use core_model::{Playlist, Ref};
use core_service::Service;
use futures::StreamExt;
use tracing::{info, warn};

use crate::error::{Result, TransferError};
use crate::progress::{LogObserver, ProgressObserver, TransferItem, TransferStatus};

/// A pure, order-preserving map applied to each playlist between download
/// and upload. Transforms may rewrite scalar fields such as the path or
/// description; entity pools pass through untouched.
pub type Transform = Box<dyn Fn(Playlist) -> Playlist + Send + Sync>;

/// Knobs for one copy invocation.
pub struct TransferOptions {
    pub transform: Option<Transform>,
    pub observer: Box<dyn ProgressObserver>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            transform: None,
            observer: Box::new(LogObserver),
        }
    }
}

impl TransferOptions {
    pub fn with_transform(transform: Transform) -> Self {
        Self {
            transform: Some(transform),
            ..Self::default()
        }
    }
}

/// One playlist that could not be transferred.
#[derive(Debug)]
pub struct FailedItem {
    pub index: usize,
    pub name: String,
    pub error: TransferError,
}

/// Outcome of a batch transfer. Failures recorded here were isolated to
/// single playlists; anything structural aborts the copy with an `Err`
/// instead.
#[derive(Debug, Default)]
pub struct TransferReport {
    pub completed: usize,
    pub failed: Vec<FailedItem>,
    /// Set when the optional write-back of updated playlists to the source
    /// failed. The forward transfer itself still stands.
    pub reconcile_error: Option<TransferError>,
}

impl TransferReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.reconcile_error.is_none()
    }
}

/// Copy every playlist behind `src_ref` into `dest_ref`.
///
/// The download stream is consumed lazily and each playlist is uploaded on
/// its own, so a failure on one playlist leaves the rest of the batch
/// running. Structural failures (an unsupported operation, authentication,
/// exhausted rate-limit retries) abort the batch; playlists already
/// uploaded are not rolled back.
pub async fn copy<S, D>(
    src: &S,
    src_ref: &Ref,
    dest: &D,
    dest_ref: &Ref,
    options: &TransferOptions,
) -> Result<TransferReport>
where
    S: Service + ?Sized,
    D: Service + ?Sized,
{
    let (report, _) = copy_inner(src, src_ref, dest, dest_ref, options).await?;
    Ok(report)
}

/// Like [`copy`], but pushes playlists the destination updated (e.g. with
/// newly assigned external ids) back into the source ref afterwards.
///
/// The write-back is not atomic with the forward transfer; if it fails,
/// the transfer stands and the failure is recorded on the report.
pub async fn copy_with_reconcile<S, D>(
    src: &S,
    src_ref: &Ref,
    dest: &D,
    dest_ref: &Ref,
    options: &TransferOptions,
) -> Result<TransferReport>
where
    S: Service + ?Sized,
    D: Service + ?Sized,
{
    let (mut report, updated) = copy_inner(src, src_ref, dest, dest_ref, options).await?;

    if !updated.is_empty() {
        info!(count = updated.len(), "writing updated playlists back to the source");
        if let Err(e) = src.upload(src_ref, updated).await {
            warn!(error = %e, "source reconciliation failed");
            report.reconcile_error = Some(TransferError::Reconcile(e));
        }
    }

    Ok(report)
}

async fn copy_inner<S, D>(
    src: &S,
    src_ref: &Ref,
    dest: &D,
    dest_ref: &Ref,
    options: &TransferOptions,
) -> Result<(TransferReport, Vec<Playlist>)>
where
    S: Service + ?Sized,
    D: Service + ?Sized,
{
    let observer = options.observer.as_ref();
    let mut stream = src.download(src_ref).await.map_err(TransferError::Download)?;

    let mut report = TransferReport::default();
    let mut updated: Vec<Playlist> = Vec::new();
    let mut index = 0;

    while let Some(next) = stream.next().await {
        let mut item = TransferItem::new(index);
        index += 1;

        let mut playlist = match next {
            Ok(playlist) => playlist,
            Err(e) => {
                item.advance(TransferStatus::Failed, observer)?;
                let error = TransferError::Download(e);
                if error.is_isolable() {
                    report.failed.push(FailedItem {
                        index: item.index,
                        name: item.name,
                        error,
                    });
                    continue;
                }
                return Err(error);
            }
        };
        item.set_name(&playlist.name);
        item.advance(TransferStatus::Downloading, observer)?;

        if let Some(transform) = &options.transform {
            item.advance(TransferStatus::Transforming, observer)?;
            playlist = transform(playlist);
            item.set_name(&playlist.name);
        }

        item.advance(TransferStatus::Uploading, observer)?;
        match dest.upload(dest_ref, vec![playlist]).await {
            Ok(returned) => {
                item.advance(TransferStatus::Done, observer)?;
                report.completed += 1;
                if let Some(playlists) = returned {
                    updated.extend(playlists);
                }
            }
            Err(e) => {
                item.advance(TransferStatus::Failed, observer)?;
                let error = TransferError::Upload(e);
                if error.is_isolable() {
                    warn!(name = %item.name, error = %error, "skipping playlist");
                    report.failed.push(FailedItem {
                        index: item.index,
                        name: item.name,
                        error,
                    });
                    continue;
                }
                return Err(error);
            }
        }
    }

    info!(
        completed = report.completed,
        failed = report.failed.len(),
        "transfer finished"
    );
    Ok((report, updated))
}
