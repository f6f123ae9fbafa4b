//! The Apple Music service implementation.

use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use core_auth::{Credential, CredentialProvider};
use core_model::{Playlist, RawRef, Ref, ResourceLocation, ResourceType, TrackAppleMusic};
use core_service::{
    paged, HttpClient, HttpRequest, Page, PageQuery, PlaylistStream, RateLimiter, Result, Service,
    ServiceError, MAX_PLAYLIST_TRACKS,
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use url::Url;

use crate::api::{
    AmCreatePlaylistAttributes, AmCreatePlaylistRelationships, AmCreatePlaylistRequest,
    AmPlaylist, AmResponse, AmSearchResponse, AmTrack, AmTrackData, AmTrackRef, API_BASE,
};
use crate::convert::{self, TrackSource};
use crate::refs;

pub const CHUNK_SIZE: usize = 50;

/// The Apple Music API allows a generous request budget per minute.
const RATE_MAX_CALLS: u32 = 60;
const RATE_INTERVAL: Duration = Duration::from_secs(60);

/// Playlist access through the Apple Music API.
///
/// Requires a developer token plus a user token for library access; both
/// come from the injected [`CredentialProvider`] (the user token via
/// [`Credential::user_token`]). Catalog operations are scoped to the
/// configured storefront.
#[derive(Clone)]
pub struct AppleMusicService {
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialProvider>,
    storefront: String,
    limiter: Arc<RateLimiter>,
}

impl AppleMusicService {
    pub fn new(
        http: Arc<dyn HttpClient>,
        credentials: Arc<dyn CredentialProvider>,
        storefront: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            storefront: storefront.into(),
            limiter: Arc::new(RateLimiter::new(RATE_MAX_CALLS, RATE_INTERVAL)),
        }
    }

    fn authorize(&self, credential: &Credential, request: HttpRequest) -> HttpRequest {
        let mut request = request.header("Authorization", credential.authorization());
        if let Some(user_token) = &credential.user_token {
            request = request.header("Music-User-Token", user_token.clone());
        }
        request
    }

    async fn get_json<T: DeserializeOwned>(&self, credential: &Credential, url: String) -> Result<T> {
        self.limiter.acquire().await;
        let request = self.authorize(credential, HttpRequest::get(url));
        self.http.execute(request).await?.error_for_status()?.json()
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        credential: &Credential,
        url: String,
        body: &B,
    ) -> Result<T> {
        self.limiter.acquire().await;
        let request = self.authorize(credential, HttpRequest::post(url).json(body)?);
        self.http.execute(request).await?.error_for_status()?.json()
    }

    async fn all_library_playlists(&self, credential: &Credential) -> Result<Vec<AmPlaylist>> {
        paged(CHUNK_SIZE, MAX_PLAYLIST_TRACKS, |query: PageQuery| async move {
            let url = format!(
                "{API_BASE}/me/library/playlists?limit={}&offset={}",
                query.limit, query.offset
            );
            let response: AmResponse<AmPlaylist> = self.get_json(credential, url).await?;
            let total = response.total();
            Ok(Page {
                items: response.data,
                total,
            })
        })
        .await
    }

    /// Fetch all tracks of a library playlist. A 404 is swallowed; some
    /// library playlists simply have no track resource.
    async fn library_playlist_tracks(
        &self,
        credential: &Credential,
        library_id: &str,
    ) -> Result<Vec<AmTrack>> {
        let result = paged(CHUNK_SIZE, MAX_PLAYLIST_TRACKS, |query: PageQuery| async move {
            let url = format!(
                "{API_BASE}/me/library/playlists/{library_id}/tracks?limit={}&offset={}",
                query.limit, query.offset
            );
            let response: AmResponse<AmTrack> = self.get_json(credential, url).await?;
            let total = response.total();
            Ok(Page {
                items: response.data,
                total,
            })
        })
        .await;

        match result {
            Err(ServiceError::RemoteNotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    async fn fetch_library_playlist(
        &self,
        credential: &Credential,
        am_playlist: &AmPlaylist,
    ) -> Result<Playlist> {
        let mut playlist = convert::from_am_library_playlist(am_playlist);
        let am_tracks = self
            .library_playlist_tracks(credential, &am_playlist.id)
            .await?;
        info!(name = %playlist.name, tracks = am_tracks.len(), "got playlist tracks");
        for am_track in &am_tracks {
            convert::store_am_track(&mut playlist, am_track, TrackSource::Library);
        }
        Ok(playlist)
    }

    fn download_library(&self) -> PlaylistStream {
        let this = self.clone();
        Box::pin(try_stream! {
            let credential = this.credentials.authenticate().await?;

            info!("querying library playlists");
            let am_playlists = this.all_library_playlists(&credential).await?;

            info!(count = am_playlists.len(), "fetching playlists");
            for am_playlist in am_playlists {
                // Some library entries (e.g. folders) carry no name; they
                // are not playlists worth transferring.
                let has_name = am_playlist
                    .attributes
                    .as_ref()
                    .and_then(|a| a.name.as_ref())
                    .is_some();
                if !has_name {
                    continue;
                }

                match this.fetch_library_playlist(&credential, &am_playlist).await {
                    Ok(playlist) => yield playlist,
                    Err(e) if e.is_isolable() => {
                        warn!(id = %am_playlist.id, error = %e, "could not download playlist");
                    }
                    Err(e) => Err(e)?,
                }
            }
        })
    }

    fn download_catalog_playlist(&self, storefront: String, id: String) -> PlaylistStream {
        let this = self.clone();
        Box::pin(try_stream! {
            let credential = this.credentials.authenticate().await?;

            info!(storefront = %storefront, id = %id, "querying catalog playlist");
            let url = format!("{API_BASE}/catalog/{storefront}/playlists/{id}");
            let response: AmResponse<AmPlaylist> = this.get_json(&credential, url).await?;

            for am_playlist in &response.data {
                yield convert::from_am_catalog_playlist(am_playlist);
            }
        })
    }

    /// Resolve a track to a catalog id, either from the document or via a
    /// catalog search on the configured storefront.
    async fn to_catalog_track_id(
        &self,
        credential: &Credential,
        playlist: &Playlist,
        track_index: usize,
    ) -> Result<Option<String>> {
        let track = &playlist.tracks[track_index];
        if let Some(catalog_id) = track.applemusic.as_ref().and_then(|am| am.catalog_id.clone()) {
            return Ok(Some(catalog_id));
        }

        let phrase = playlist.track_search_phrase(track);
        let url = Url::parse_with_params(
            &format!("{API_BASE}/catalog/{}/search", self.storefront),
            &[("term", phrase.as_str()), ("limit", "1"), ("types", "songs")],
        )
        .map_err(|e| ServiceError::Parse(e.to_string()))?;

        let response: AmSearchResponse = self.get_json(credential, url.to_string()).await?;
        let am_track = response
            .results
            .and_then(|results| results.songs)
            .and_then(|songs| songs.data.into_iter().next());

        Ok(match am_track {
            Some(am_track) => {
                let matched_name = am_track
                    .attributes
                    .as_ref()
                    .and_then(|a| a.name.clone())
                    .unwrap_or_default();
                info!(track = %track.name, matched = %matched_name, "matched track on Apple Music");
                Some(am_track.id)
            }
            None => {
                warn!(track = %track.name, "no Apple Music match, skipping track");
                None
            }
        })
    }

    async fn upload_playlist(
        &self,
        credential: &Credential,
        mut playlist: Playlist,
    ) -> Result<Playlist> {
        info!(tracks = playlist.tracks.len(), name = %playlist.name, "externalizing playlist tracks");
        let mut catalog_ids = Vec::new();
        for index in 0..playlist.tracks.len() {
            if let Some(catalog_id) = self.to_catalog_track_id(credential, &playlist, index).await? {
                let track = &mut playlist.tracks[index];
                let am = track.applemusic.get_or_insert_with(TrackAppleMusic::default);
                if am.catalog_id.is_none() {
                    am.catalog_id = Some(catalog_id.clone());
                }
                catalog_ids.push(catalog_id);
            }
        }

        info!(tracks = catalog_ids.len(), "creating library playlist");
        let created: AmResponse<AmPlaylist> = self
            .post_json(
                credential,
                format!("{API_BASE}/me/library/playlists"),
                &AmCreatePlaylistRequest {
                    attributes: AmCreatePlaylistAttributes {
                        name: playlist.name.clone(),
                        description: playlist.description.clone(),
                    },
                    relationships: AmCreatePlaylistRelationships {
                        tracks: AmTrackData {
                            data: catalog_ids.iter().map(AmTrackRef::song).collect(),
                        },
                    },
                },
            )
            .await?;

        if let Some(created) = created.data.first() {
            let am = playlist
                .applemusic
                .get_or_insert_with(Default::default);
            am.library_id = Some(created.id.clone());
        }
        Ok(playlist)
    }
}

#[async_trait]
impl Service for AppleMusicService {
    fn name(&self) -> &str {
        refs::SERVICE_NAME
    }

    fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
        refs::parse_ref(raw_ref)
    }

    async fn download(&self, playlist_ref: &Ref) -> Result<PlaylistStream> {
        match (&playlist_ref.resource_type, &playlist_ref.resource_location) {
            (ResourceType::Special, ResourceLocation::Special(location))
                if location == "playlists" =>
            {
                Ok(self.download_library())
            }
            (ResourceType::Playlist, ResourceLocation::StorefrontId { storefront, id }) => {
                Ok(self.download_catalog_playlist(storefront.clone(), id.clone()))
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
        let mut updated = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            updated.push(self.upload_playlist(&credential, playlist).await?);
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

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn service(mock: MockHttpClient) -> AppleMusicService {
        let mut credential = Credential::bearer("dev-token");
        credential.user_token = Some("user-token".to_string());
        AppleMusicService::new(
            Arc::new(mock),
            Arc::new(StaticCredentialProvider::new(credential)),
            "us",
        )
    }

    fn library_ref() -> Ref {
        Ref::new(
            "applemusic",
            ResourceType::Special,
            ResourceLocation::Special("playlists".to_string()),
        )
    }

    #[tokio::test]
    async fn test_library_download_filters_nameless_and_swallows_track_404() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.contains("/me/library/playlists?")
            }))
            .times(1)
            .returning(|r| {
                assert_eq!(
                    r.headers.get("Music-User-Token"),
                    Some(&"user-token".to_string())
                );
                Ok(response(
                    200,
                    r#"{
                        "data": [
                            {"id": "p.folder", "attributes": {}},
                            {"id": "p.1", "attributes": {"name": "Mix"}}
                        ],
                        "meta": {"total": 2}
                    }"#,
                ))
            });
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.contains("/me/library/playlists/p.1/tracks")
            }))
            .times(1)
            .returning(|_| Ok(response(404, r#"{"errors": []}"#)));

        let service = service(mock);
        let playlists: Vec<Playlist> = service
            .download(&library_ref())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "Mix");
        assert!(playlists[0].tracks.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_playlist_download() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.ends_with("/catalog/us/playlists/pl.abc")
            }))
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{
                        "data": [{
                            "id": "pl.abc",
                            "attributes": {
                                "name": "Editorial",
                                "curatorName": "Apple Music Pop",
                                "playParams": {"id": "pl.abc"}
                            },
                            "relationships": {
                                "tracks": {
                                    "data": [{
                                        "id": "123",
                                        "attributes": {
                                            "name": "Song",
                                            "artistName": "A & B",
                                            "albumName": "Album",
                                            "playParams": {"id": "123"}
                                        }
                                    }]
                                }
                            }
                        }]
                    }"#,
                ))
            });

        let service = service(mock);
        let r = service
            .parse_ref(&RawRef::parse(
                "https://music.apple.com/us/playlist/editorial/pl.abc",
            ))
            .unwrap();
        let playlists: Vec<Playlist> = service
            .download(&r)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(playlists.len(), 1);
        let playlist = &playlists[0];
        assert_eq!(playlist.name, "Editorial");
        assert!(playlist.author_id.is_some());
        assert_eq!(playlist.tracks.len(), 1);
        assert_eq!(playlist.artists.len(), 2);
        let am = playlist.tracks[0].applemusic.as_ref().unwrap();
        assert_eq!(am.catalog_id.as_deref(), Some("123"));
    }

    #[tokio::test]
    async fn test_upload_searches_catalog_and_creates_playlist() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .with(function(|r: &HttpRequest| r.url.contains("/catalog/us/search")))
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"results": {"songs": {"data": [{
                        "id": "999",
                        "attributes": {"name": "Song", "artistName": "A"}
                    }]}}}"#,
                ))
            });
        mock.expect_execute()
            .with(function(|r: &HttpRequest| {
                r.url.ends_with("/me/library/playlists")
            }))
            .times(1)
            .returning(|r| {
                let body: serde_json::Value =
                    serde_json::from_slice(r.body.as_ref().unwrap()).unwrap();
                assert_eq!(body["relationships"]["tracks"]["data"][0]["id"], "999");
                Ok(response(
                    201,
                    r#"{"data": [{"id": "p.new", "attributes": {"name": "Mix"}}]}"#,
                ))
            });

        let service = service(mock);
        let mut playlist = Playlist::new("p1", "Mix");
        playlist.store_track(core_model::Track {
            name: "Song".to_string(),
            ..Default::default()
        });

        let updated = service
            .upload(&library_ref(), vec![playlist])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.len(), 1);
        let am = updated[0].applemusic.as_ref().unwrap();
        assert_eq!(am.library_id.as_deref(), Some("p.new"));
        let track_am = updated[0].tracks[0].applemusic.as_ref().unwrap();
        assert_eq!(track_am.catalog_id.as_deref(), Some("999"));
    }
}
