//! The capability contract implemented by every service backend.

use async_trait::async_trait;
use core_model::{Playlist, RawRef, Ref};
use futures::stream::BoxStream;

use crate::error::{Result, ServiceError};

/// A lazy, single-pass sequence of playlists.
///
/// Downloads yield playlists as they are materialized so that long
/// listings can be consumed with bounded memory and incremental progress.
/// The stream is read exactly once; collecting it into a `Vec` is reserved
/// for defined boundaries such as uploads of small batches and tests.
pub type PlaylistStream = BoxStream<'static, Result<Playlist>>;

/// A wrapper around a music service's API (or a local storage format)
/// providing uniform access to playlists.
///
/// Every operation other than [`name`](Service::name) and
/// [`parse_ref`](Service::parse_ref) is optional; the default
/// implementations fail with [`ServiceError::Unsupported`] naming the
/// operation and the service.
#[async_trait]
pub trait Service: Send + Sync {
    /// The stable identifier of this service, used for display and for
    /// reconstructing token-form refs (`@<name>/<location>`).
    fn name(&self) -> &str;

    /// Try to interpret a raw reference as belonging to this service.
    ///
    /// Returns `None` (not an error) when the shape does not match, so the
    /// registry can continue with lower-priority services.
    fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref>;

    /// Materialize the playlists the ref points at, incrementally where
    /// the source supports paging.
    async fn download(&self, playlist_ref: &Ref) -> Result<PlaylistStream> {
        let _ = playlist_ref;
        Err(ServiceError::Unsupported {
            service: self.name().to_string(),
            operation: "download",
        })
    }

    /// Write the given playlists to the target.
    ///
    /// May return updated playlists (e.g. carrying newly assigned external
    /// ids) for the caller to persist back to the source.
    async fn upload(
        &self,
        playlist_ref: &Ref,
        playlists: Vec<Playlist>,
    ) -> Result<Option<Vec<Playlist>>> {
        let _ = (playlist_ref, playlists);
        Err(ServiceError::Unsupported {
            service: self.name().to_string(),
            operation: "upload",
        })
    }

    /// Remove the referenced resource.
    async fn remove(&self, playlist_ref: &Ref) -> Result<()> {
        let _ = playlist_ref;
        Err(ServiceError::Unsupported {
            service: self.name().to_string(),
            operation: "remove",
        })
    }

    /// Print a human-readable preview of the referenced resource. Mostly
    /// useful for debugging a service wiring.
    async fn preview(&self, playlist_ref: &Ref) -> Result<()> {
        let _ = playlist_ref;
        Err(ServiceError::Unsupported {
            service: self.name().to_string(),
            operation: "preview",
        })
    }
}
