//! The closed set of built-in services and the default registry.

use std::sync::Arc;

use async_trait::async_trait;
use core_auth::CredentialProvider;
use core_model::{Playlist, RawRef, Ref};
use core_service::{HttpClient, PlaylistStream, Result, Service, ServiceRegistry};
use core_transfer::{copy, TransferOptions, TransferReport};
use provider_applemusic::AppleMusicService;
use provider_local::{FileService, StdioService};
use provider_spotify::SpotifyService;

/// Every built-in service as one dispatchable type, so a registry can hold
/// a heterogeneous set without boxing.
pub enum AnyService {
    Spotify(SpotifyService),
    AppleMusic(AppleMusicService),
    Stdio(StdioService),
    File(FileService),
}

#[async_trait]
impl Service for AnyService {
    fn name(&self) -> &str {
        match self {
            AnyService::Spotify(s) => s.name(),
            AnyService::AppleMusic(s) => s.name(),
            AnyService::Stdio(s) => s.name(),
            AnyService::File(s) => s.name(),
        }
    }

    fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
        match self {
            AnyService::Spotify(s) => s.parse_ref(raw_ref),
            AnyService::AppleMusic(s) => s.parse_ref(raw_ref),
            AnyService::Stdio(s) => s.parse_ref(raw_ref),
            AnyService::File(s) => s.parse_ref(raw_ref),
        }
    }

    async fn download(&self, playlist_ref: &Ref) -> Result<PlaylistStream> {
        match self {
            AnyService::Spotify(s) => s.download(playlist_ref).await,
            AnyService::AppleMusic(s) => s.download(playlist_ref).await,
            AnyService::Stdio(s) => s.download(playlist_ref).await,
            AnyService::File(s) => s.download(playlist_ref).await,
        }
    }

    async fn upload(
        &self,
        playlist_ref: &Ref,
        playlists: Vec<Playlist>,
    ) -> Result<Option<Vec<Playlist>>> {
        match self {
            AnyService::Spotify(s) => s.upload(playlist_ref, playlists).await,
            AnyService::AppleMusic(s) => s.upload(playlist_ref, playlists).await,
            AnyService::Stdio(s) => s.upload(playlist_ref, playlists).await,
            AnyService::File(s) => s.upload(playlist_ref, playlists).await,
        }
    }

    async fn remove(&self, playlist_ref: &Ref) -> Result<()> {
        match self {
            AnyService::Spotify(s) => s.remove(playlist_ref).await,
            AnyService::AppleMusic(s) => s.remove(playlist_ref).await,
            AnyService::Stdio(s) => s.remove(playlist_ref).await,
            AnyService::File(s) => s.remove(playlist_ref).await,
        }
    }

    async fn preview(&self, playlist_ref: &Ref) -> Result<()> {
        match self {
            AnyService::Spotify(s) => s.preview(playlist_ref).await,
            AnyService::AppleMusic(s) => s.preview(playlist_ref).await,
            AnyService::Stdio(s) => s.preview(playlist_ref).await,
            AnyService::File(s) => s.preview(playlist_ref).await,
        }
    }
}

/// Build the registry with the built-in services in their fixed priority
/// order:
///
/// 1. `spotify` (tokens, `open.spotify.com` links, `spotify:` URNs)
/// 2. `applemusic` (tokens, `music.apple.com` links)
/// 3. `stdio` (`@stdin`, `@stdout`, `-`)
/// 4. `file` (any remaining path or `file:` URL)
///
/// The file service claims every non-token ref, so it must stay last.
pub fn default_registry(
    http: Arc<dyn HttpClient>,
    spotify_credentials: Arc<dyn CredentialProvider>,
    applemusic_credentials: Arc<dyn CredentialProvider>,
    storefront: impl Into<String>,
) -> ServiceRegistry<AnyService> {
    ServiceRegistry::new(vec![
        AnyService::Spotify(SpotifyService::new(http.clone(), spotify_credentials)),
        AnyService::AppleMusic(AppleMusicService::new(
            http,
            applemusic_credentials,
            storefront,
        )),
        AnyService::Stdio(StdioService::new()),
        AnyService::File(FileService::new()),
    ])
}

/// Copy every playlist behind `src` into `dest`, resolving both raw
/// references against the registry first.
pub async fn copy_refs(
    registry: &ServiceRegistry<AnyService>,
    src: &str,
    dest: &str,
    options: &TransferOptions,
) -> std::result::Result<TransferReport, core_transfer::TransferError> {
    let (src_service, src_ref) = registry
        .resolve(src)
        .map_err(core_transfer::TransferError::Download)?;
    let (dest_service, dest_ref) = registry
        .resolve(dest)
        .map_err(core_transfer::TransferError::Upload)?;
    copy(src_service, &src_ref, dest_service, &dest_ref, options).await
}
