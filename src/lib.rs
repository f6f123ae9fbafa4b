//! # Drum
//!
//! Playlist synchronization across music services and local storage.
//!
//! Drum resolves textual references ("refs") such as `@spotify/playlists`,
//! an `open.spotify.com` link, `-` or a plain file path to the service that
//! owns them, downloads the referenced playlists as a lazy stream, and can
//! pipe that stream (optionally transformed) into another service's upload
//! path. Entities discovered along the way (artists, albums, users) are
//! deduplicated per playlist through stable content-derived ids.
//!
//! ## Example
//!
//! ```ignore
//! use drum::{default_registry, transfer};
//!
//! let registry = default_registry(http, spotify_credentials, applemusic_credentials, "us");
//! let (src, src_ref) = registry.resolve("@spotify/playlists")?;
//! let (dest, dest_ref) = registry.resolve("backups")?;
//! let report = transfer::copy(src, &src_ref, dest, &dest_ref, &Default::default()).await?;
//! ```

pub mod logging;
pub mod services;

pub use services::{copy_refs, default_registry, AnyService};

pub use core_model as model;
pub use core_model::{Playlist, RawRef, Ref, ResourceLocation, ResourceType, Track};
pub use core_service::{
    HttpClient, PlaylistStream, RateLimiter, ReqwestClient, Result, Service, ServiceError,
    ServiceRegistry,
};
pub use core_transfer as transfer;
pub use core_transfer::{TransferError, TransferOptions, TransferReport, TransferStatus};
