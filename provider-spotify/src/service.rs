//! The Spotify service implementation.

use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use core_auth::{Credential, CredentialProvider};
use core_model::{derive_id, Playlist, PlaylistSpotify, RawRef, Ref, ResourceLocation, ResourceType, TrackSpotify};
use core_service::{
    paged, with_backoff, HttpClient, HttpRequest, Page, PageQuery, PlaylistStream, RateLimiter,
    Result, Service, ServiceError, MAX_PLAYLIST_TRACKS,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{
    SpAddTracksRequest, SpCreatePlaylistRequest, SpPaging, SpPlaylist, SpPlaylistTrack,
    SpSavedTrack, SpSearchResponse, SpUser, API_BASE,
};
use crate::convert;
use crate::refs;

pub const PLAYLISTS_CHUNK_SIZE: usize = 50;
pub const TRACKS_CHUNK_SIZE: usize = 100;
pub const SAVED_TRACKS_CHUNK_SIZE: usize = 50;
pub const MATCH_TRACKS_CHUNK_SIZE: usize = 50;
pub const UPLOAD_TRACKS_CHUNK_SIZE: usize = 100;

/// Max API calls per rate window. The window mirrors Spotify's rolling
/// 30-second budget closely enough to avoid 429s in practice.
const RATE_MAX_CALLS: u32 = 15;
const RATE_INTERVAL: Duration = Duration::from_secs(5);

/// Playlist access through the Spotify Web API.
///
/// Credentials come from the injected [`CredentialProvider`]; every API
/// call passes through a shared rate limiter, and the library download
/// additionally retries rate-limited playlists with bounded backoff.
#[derive(Clone)]
pub struct SpotifyService {
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialProvider>,
    limiter: Arc<RateLimiter>,
}

impl SpotifyService {
    pub fn new(http: Arc<dyn HttpClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http,
            credentials,
            limiter: Arc::new(RateLimiter::new(RATE_MAX_CALLS, RATE_INTERVAL)),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, credential: &Credential, url: String) -> Result<T> {
        self.limiter.acquire().await;
        let request = HttpRequest::get(url).header("Authorization", credential.authorization());
        self.http.execute(request).await?.error_for_status()?.json()
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        credential: &Credential,
        url: String,
        body: &B,
    ) -> Result<T> {
        self.limiter.acquire().await;
        let request = HttpRequest::post(url)
            .header("Authorization", credential.authorization())
            .json(body)?;
        self.http.execute(request).await?.error_for_status()?.json()
    }

    /// Collect the current user's playlist listing.
    async fn all_library_playlists(&self, credential: &Credential) -> Result<Vec<SpPlaylist>> {
        paged(PLAYLISTS_CHUNK_SIZE, MAX_PLAYLIST_TRACKS, |query: PageQuery| async move {
            let url = format!(
                "{API_BASE}/me/playlists?limit={}&offset={}",
                query.limit, query.offset
            );
            let page: SpPaging<SpPlaylist> = self.get_json(credential, url).await?;
            Ok(Page {
                items: page.items,
                total: page.total,
            })
        })
        .await
    }

    /// Materialize one playlist: entity pools, then every track page.
    async fn fetch_playlist(&self, credential: &Credential, sp_playlist: &SpPlaylist) -> Result<Playlist> {
        let mut playlist = convert::from_sp_playlist(sp_playlist);

        let playlist_id = sp_playlist.id.clone();
        let entries = paged(
            TRACKS_CHUNK_SIZE,
            MAX_PLAYLIST_TRACKS,
            |query: PageQuery| {
                let playlist_id = playlist_id.clone();
                async move {
                    let url = format!(
                        "{API_BASE}/playlists/{playlist_id}/tracks?limit={}&offset={}",
                        query.limit, query.offset
                    );
                    let page: SpPaging<SpPlaylistTrack> = self.get_json(credential, url).await?;
                    Ok(Page {
                        items: page.items,
                        total: page.total,
                    })
                }
            },
        )
        .await?;

        info!(name = %sp_playlist.name, tracks = entries.len(), "got playlist tracks");
        for entry in &entries {
            // Deleted or region-locked entries come back with a null track.
            if let Some(sp_track) = &entry.track {
                convert::store_sp_track(
                    &mut playlist,
                    sp_track,
                    entry.added_at.as_deref(),
                    entry.added_by.as_ref(),
                );
            }
        }

        Ok(playlist)
    }

    async fn fetch_playlist_by_id(&self, credential: &Credential, id: &str) -> Result<Playlist> {
        let sp_playlist: SpPlaylist = self
            .get_json(credential, format!("{API_BASE}/playlists/{id}"))
            .await?;
        self.fetch_playlist(credential, &sp_playlist).await
    }

    /// Build the saved-tracks pseudo-playlist, authored by the current user.
    async fn fetch_saved_tracks(&self, credential: &Credential) -> Result<Playlist> {
        let me: SpUser = self
            .get_json(credential, format!("{API_BASE}/me"))
            .await?;

        let mut playlist = Playlist::new("", "Saved Tracks");
        let me_id = convert::store_sp_user(&mut playlist, &me);
        playlist.id = derive_id(&me_id);
        playlist.author_id = Some(me_id);

        let entries = paged(
            SAVED_TRACKS_CHUNK_SIZE,
            MAX_PLAYLIST_TRACKS,
            |query: PageQuery| async move {
                let url = format!(
                    "{API_BASE}/me/tracks?limit={}&offset={}",
                    query.limit, query.offset
                );
                let page: SpPaging<SpSavedTrack> = self.get_json(credential, url).await?;
                Ok(Page {
                    items: page.items,
                    total: page.total,
                })
            },
        )
        .await?;

        info!(tracks = entries.len(), "got saved tracks");
        for entry in &entries {
            if let Some(sp_track) = &entry.track {
                convert::store_sp_track(&mut playlist, sp_track, entry.added_at.as_deref(), None);
            }
        }

        Ok(playlist)
    }

    /// Stream the whole playlist library, skipping playlists that fail for
    /// reasons local to them.
    fn download_library(&self) -> PlaylistStream {
        let this = self.clone();
        Box::pin(try_stream! {
            let credential = this.credentials.authenticate().await?;

            info!("querying playlists");
            let sp_playlists = this.all_library_playlists(&credential).await?;

            info!(count = sp_playlists.len(), "fetching playlists");
            for sp_playlist in sp_playlists {
                // Spotify's generated "Your Top Songs" playlists either 404
                // or return seemingly endless track listings. Skip them.
                if sp_playlist.name.starts_with("Your Top Songs") {
                    info!(name = %sp_playlist.name, "skipping playlist");
                    continue;
                }

                match with_backoff(|| this.fetch_playlist(&credential, &sp_playlist)).await {
                    Ok(playlist) => yield playlist,
                    Err(e) if e.is_isolable() => {
                        warn!(name = %sp_playlist.name, error = %e, "could not download playlist");
                    }
                    Err(e) => Err(e)?,
                }
            }
        })
    }

    /// Resolve each track to a Spotify id, either from the document or via
    /// search, and record newly matched ids back onto the tracks.
    async fn match_tracks(&self, credential: &Credential, playlist: &mut Playlist) -> Result<Vec<String>> {
        let phrases: Vec<Option<String>> = playlist
            .tracks
            .iter()
            .map(|track| match &track.spotify {
                Some(_) => None,
                None => Some(playlist.track_search_phrase(track)),
            })
            .collect();

        let mut matched = Vec::new();
        for (chunk_index, chunk) in playlist
            .tracks
            .chunks_mut(MATCH_TRACKS_CHUNK_SIZE)
            .enumerate()
        {
            debug!(chunk = chunk_index, "matching tracks");
            for (index_in_chunk, track) in chunk.iter_mut().enumerate() {
                let index = chunk_index * MATCH_TRACKS_CHUNK_SIZE + index_in_chunk;
                if let Some(sp) = &track.spotify {
                    matched.push(sp.id.clone());
                    continue;
                }

                let phrase = phrases[index].as_deref().unwrap_or(&track.name);
                let url = Url::parse_with_params(
                    &format!("{API_BASE}/search"),
                    &[("q", phrase), ("type", "track"), ("limit", "1")],
                )
                .map_err(|e| ServiceError::Parse(e.to_string()))?;

                let results: SpSearchResponse =
                    self.get_json(credential, url.to_string()).await?;
                let sp_track = results
                    .tracks
                    .and_then(|page| page.items.into_iter().next());

                match sp_track {
                    Some(sp_track) => {
                        info!(
                            track = %track.name,
                            matched = %sp_track.name,
                            "matched track on Spotify"
                        );
                        track.spotify = Some(TrackSpotify {
                            id: sp_track.id.clone(),
                        });
                        matched.push(sp_track.id);
                    }
                    None => {
                        warn!(track = %track.name, "no Spotify match, skipping track");
                    }
                }
            }
        }
        Ok(matched)
    }

    async fn upload_playlist(
        &self,
        credential: &Credential,
        me_id: &str,
        mut playlist: Playlist,
    ) -> Result<Playlist> {
        info!(tracks = playlist.tracks.len(), name = %playlist.name, "externalizing playlist tracks");
        let track_ids = self.match_tracks(credential, &mut playlist).await?;

        // Pushes always create a new (private) playlist rather than
        // overwriting an existing one.
        let created: SpPlaylist = self
            .post_json(
                credential,
                format!("{API_BASE}/users/{me_id}/playlists"),
                &SpCreatePlaylistRequest {
                    name: playlist.name.clone(),
                    description: playlist.description.clone(),
                    public: false,
                    collaborative: false,
                },
            )
            .await?;

        info!(tracks = track_ids.len(), "uploading playlist tracks");
        for chunk in track_ids.chunks(UPLOAD_TRACKS_CHUNK_SIZE) {
            let body = SpAddTracksRequest {
                uris: chunk
                    .iter()
                    .map(|id| format!("spotify:track:{id}"))
                    .collect(),
            };
            let _: serde_json::Value = self
                .post_json(
                    credential,
                    format!("{API_BASE}/playlists/{}/tracks", created.id),
                    &body,
                )
                .await?;
        }

        playlist.spotify = Some(PlaylistSpotify {
            id: created.id,
            public: Some(false),
            collaborative: Some(false),
            image_url: None,
        });
        Ok(playlist)
    }
}

#[async_trait]
impl Service for SpotifyService {
    fn name(&self) -> &str {
        refs::SERVICE_NAME
    }

    fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
        refs::parse_ref(raw_ref)
    }

    async fn download(&self, playlist_ref: &Ref) -> Result<PlaylistStream> {
        match (&playlist_ref.resource_type, &playlist_ref.resource_location) {
            (ResourceType::Special, ResourceLocation::Special(location)) => match location.as_str() {
                "playlists" => Ok(self.download_library()),
                "tracks" => {
                    let this = self.clone();
                    Ok(Box::pin(try_stream! {
                        let credential = this.credentials.authenticate().await?;
                        let playlist = this.fetch_saved_tracks(&credential).await?;
                        yield playlist;
                    }))
                }
                _ => Err(ServiceError::Unsupported {
                    service: self.name().to_string(),
                    operation: "download",
                }),
            },
            (ResourceType::Playlist, ResourceLocation::Id(id)) => {
                let this = self.clone();
                let id = id.clone();
                Ok(Box::pin(try_stream! {
                    let credential = this.credentials.authenticate().await?;
                    let playlist = this.fetch_playlist_by_id(&credential, &id).await?;
                    yield playlist;
                }))
            }
            _ => Err(ServiceError::Unsupported {
                service: self.name().to_string(),
                operation: "download",
            }),
        }
    }

    async fn upload(
        &self,
        playlist_ref: &Ref,
        playlists: Vec<Playlist>,
    ) -> Result<Option<Vec<Playlist>>> {
        let is_library = matches!(
            (&playlist_ref.resource_type, &playlist_ref.resource_location),
            (ResourceType::Special, ResourceLocation::Special(location)) if location == "playlists"
        );
        if !is_library {
            return Err(ServiceError::Unsupported {
                service: self.name().to_string(),
                operation: "upload",
            });
        }

        let credential = self.credentials.authenticate().await?;
        let me: SpUser = self
            .get_json(&credential, format!("{API_BASE}/me"))
            .await?;

        let mut updated = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            updated.push(self.upload_playlist(&credential, &me.id, playlist).await?);
        }
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use core_auth::StaticCredentialProvider;
    use core_service::HttpResponse;
    use futures::TryStreamExt;
    use mockall::mock;
    use mockall::predicate::function;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn ok_json(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn service(mock: MockHttpClient) -> SpotifyService {
        SpotifyService::new(
            Arc::new(mock),
            Arc::new(StaticCredentialProvider::new(Credential::bearer("token"))),
        )
    }

    fn playlist_ref(id: &str) -> Ref {
        Ref::new(
            "spotify",
            ResourceType::Playlist,
            ResourceLocation::Id(id.to_string()),
        )
    }

    #[tokio::test]
    async fn test_download_single_playlist() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.ends_with("/playlists/pl1")
            }))
            .times(1)
            .returning(|_| {
                Ok(ok_json(
                    r#"{
                        "id": "pl1",
                        "name": "Mix",
                        "description": "",
                        "public": true,
                        "collaborative": false,
                        "images": [],
                        "owner": {"id": "owner1", "display_name": "Owner"}
                    }"#,
                ))
            });
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.contains("/playlists/pl1/tracks")
            }))
            .times(1)
            .returning(|_| {
                Ok(ok_json(
                    r#"{
                        "items": [
                            {
                                "track": {
                                    "id": "t1",
                                    "name": "Song",
                                    "artists": [{"id": "a1", "name": "Artist"}],
                                    "album": {
                                        "id": "al1",
                                        "name": "Album",
                                        "artists": [{"id": "a1", "name": "Artist"}],
                                        "images": []
                                    },
                                    "duration_ms": 1000,
                                    "explicit": false,
                                    "external_ids": {}
                                },
                                "added_at": "2021-01-01T00:00:00Z",
                                "added_by": null
                            },
                            {"track": null}
                        ],
                        "total": 2
                    }"#,
                ))
            });

        let service = service(mock);
        let playlists: Vec<Playlist> = service
            .download(&playlist_ref("pl1"))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(playlists.len(), 1);
        let playlist = &playlists[0];
        assert_eq!(playlist.name, "Mix");
        // The null-track entry is dropped.
        assert_eq!(playlist.tracks.len(), 1);
        assert_eq!(playlist.artists.len(), 1);
        assert_eq!(playlist.albums.len(), 1);
        assert_eq!(playlist.author_id.as_deref(), Some(&derive_id("owner1")[..]));
        // Empty description is cleared.
        assert!(playlist.description.is_none());
    }

    #[tokio::test]
    async fn test_library_download_skips_generated_playlists() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .with(function(|r: &HttpRequest| r.url.contains("/me/playlists")))
            .times(1)
            .returning(|_| {
                Ok(ok_json(
                    r#"{
                        "items": [
                            {"id": "top", "name": "Your Top Songs 2024", "owner": null, "images": []},
                            {"id": "pl2", "name": "Real Mix", "owner": null, "images": []}
                        ],
                        "total": 2
                    }"#,
                ))
            });
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.contains("/playlists/pl2/tracks")
            }))
            .times(1)
            .returning(|_| Ok(ok_json(r#"{"items": [], "total": 0}"#)));

        let service = service(mock);
        let r = service
            .parse_ref(&RawRef::parse("@spotify/playlists"))
            .unwrap();
        let playlists: Vec<Playlist> = service
            .download(&r)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "Real Mix");
    }

    #[tokio::test]
    async fn test_upload_matches_unknown_tracks_by_search() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .with(function(|r: &HttpRequest| r.url.ends_with("/me")))
            .times(1)
            .returning(|_| Ok(ok_json(r#"{"id": "me1"}"#)));
        mock.expect_execute()
            .with(function(|r: &HttpRequest| r.url.contains("/search")))
            .times(1)
            .returning(|_| {
                Ok(ok_json(
                    r#"{"tracks": {"items": [{
                        "id": "found1",
                        "name": "Song",
                        "artists": [],
                        "album": null,
                        "external_ids": {}
                    }], "total": 1}}"#,
                ))
            });
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.ends_with("/users/me1/playlists")
            }))
            .times(1)
            .returning(|_| {
                Ok(ok_json(
                    r#"{"id": "created1", "name": "Mix", "owner": null, "images": []}"#,
                ))
            });
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.ends_with("/playlists/created1/tracks")
            }))
            .times(1)
            .returning(|r| {
                let body: serde_json::Value =
                    serde_json::from_slice(r.body.as_ref().unwrap()).unwrap();
                assert_eq!(body["uris"][0], "spotify:track:found1");
                Ok(ok_json(r#"{"snapshot_id": "snap"}"#))
            });

        let service = service(mock);
        let mut playlist = Playlist::new("p1", "Mix");
        playlist.store_track(core_model::Track {
            name: "Song".to_string(),
            ..Default::default()
        });

        let r = service
            .parse_ref(&RawRef::parse("@spotify/playlists"))
            .unwrap();
        let updated = service.upload(&r, vec![playlist]).await.unwrap().unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].spotify.as_ref().unwrap().id, "created1");
        assert_eq!(updated[0].tracks[0].spotify.as_ref().unwrap().id, "found1");
    }

    #[tokio::test]
    async fn test_upload_to_non_library_ref_is_unsupported() {
        let service = service(MockHttpClient::new());
        let err = service
            .upload(&playlist_ref("pl1"), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unsupported { .. }));
    }
}
