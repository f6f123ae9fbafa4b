//! Conversion from Apple Music API payloads into the shared model.
//!
//! Apple Music's attributes carry names rather than structured entity
//! references, so artist and album ids are derived from the names. Artist
//! name strings may list several artists separated by `,` or `&`; they are
//! split into individual pooled entities.

use chrono::{DateTime, NaiveDate, Utc};
use core_model::{
    derive_id, Album, AlbumAppleMusic, Artist, Playlist, PlaylistAppleMusic, Track,
    TrackAppleMusic, User,
};
use tracing::warn;

use crate::api::{AmArtwork, AmPlaylist, AmTrack};

/// Artwork dimensions requested when substituting the URL template.
pub const MAX_ARTWORK_WIDTH: u32 = 512;
pub const MAX_ARTWORK_HEIGHT: u32 = 512;

/// Whether a track came from the library or catalog API; the two carry
/// their ids in different `playParams` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    Library,
    Catalog,
}

/// Substitute `{w}`/`{h}` in a templated artwork URL, capping the
/// requested size at 512x512.
pub fn artwork_url(artwork: &AmArtwork) -> Option<String> {
    let width = artwork.width.map_or(MAX_ARTWORK_WIDTH, |w| w.min(MAX_ARTWORK_WIDTH));
    let height = artwork
        .height
        .map_or(MAX_ARTWORK_HEIGHT, |h| h.min(MAX_ARTWORK_HEIGHT));
    artwork.url.as_ref().map(|url| {
        url.replacen("{w}", &width.to_string(), 1)
            .replacen("{h}", &height.to_string(), 1)
    })
}

/// Split a combined artist name ("A, B & C") into individual names.
pub fn split_artist_names(combined: &str) -> Vec<String> {
    combined
        .split(|c| c == ',' || c == '&')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn store_artists_from_name(playlist: &mut Playlist, combined: &str) -> Vec<String> {
    split_artist_names(combined)
        .into_iter()
        .map(|name| {
            let id = derive_id(&name);
            playlist.store_artist(Artist {
                id: id.clone(),
                name: Some(name),
                spotify: None,
            });
            id
        })
        .collect()
}

fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Catalog tracks usually carry a plain date.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert a track, registering artists, composers and the album into the
/// playlist's pools, and append it to the track list.
pub fn store_am_track(playlist: &mut Playlist, am_track: &AmTrack, source: TrackSource) {
    let Some(attributes) = &am_track.attributes else {
        warn!(id = %am_track.id, "track without attributes, skipping");
        return;
    };

    let album_id = attributes.album_name.as_ref().map(|album_name| {
        let id = derive_id(album_name);
        playlist.store_album(Album {
            id: id.clone(),
            name: album_name.clone(),
            artist_ids: Vec::new(),
            spotify: None,
            applemusic: Some(AlbumAppleMusic {
                image_url: attributes
                    .artwork
                    .as_ref()
                    .and_then(artwork_url),
            }),
        });
        id
    });

    let artist_ids = attributes
        .artist_name
        .as_ref()
        .map(|name| store_artists_from_name(playlist, name))
        .unwrap_or_default();
    let composer_ids = attributes
        .composer_name
        .as_ref()
        .map(|name| store_artists_from_name(playlist, name))
        .unwrap_or_default();

    let play_params = attributes.play_params.as_ref();
    let applemusic = match source {
        TrackSource::Library => TrackAppleMusic {
            library_id: play_params.and_then(|p| p.id.clone()),
            catalog_id: play_params.and_then(|p| p.catalog_id.clone()),
            preview_url: None,
        },
        TrackSource::Catalog => TrackAppleMusic {
            library_id: None,
            catalog_id: play_params.and_then(|p| p.id.clone()),
            preview_url: attributes.previews.first().and_then(|p| p.url.clone()),
        },
    };

    playlist.store_track(Track {
        name: attributes.name.clone().unwrap_or_default(),
        artist_ids,
        composer_ids,
        album_id,
        genres: attributes.genre_names.clone(),
        duration_ms: attributes.duration_in_millis,
        isrc: attributes.isrc.clone(),
        released_at: attributes.release_date.as_deref().and_then(parse_release_date),
        applemusic: Some(applemusic),
        ..Track::default()
    });
}

/// Build a playlist shell from a library playlist's metadata.
pub fn from_am_library_playlist(am_playlist: &AmPlaylist) -> Playlist {
    let attributes = am_playlist.attributes.clone().unwrap_or_default();
    let play_params = attributes.play_params.unwrap_or_default();
    let library_id = play_params.id.clone();
    let global_id = play_params.global_id.clone();

    let external_id = global_id
        .clone()
        .or_else(|| library_id.clone())
        .unwrap_or_else(|| am_playlist.id.clone());
    let mut playlist = Playlist::new(
        derive_id(&external_id),
        attributes.name.clone().unwrap_or_default(),
    );
    playlist.description = attributes.description.and_then(|d| d.standard);
    playlist.applemusic = Some(PlaylistAppleMusic {
        library_id,
        global_id,
        public: attributes.is_public,
        editable: attributes.can_edit,
        image_url: attributes.artwork.as_ref().and_then(|a| a.url.clone()),
    });
    playlist
}

/// Build a playlist from a catalog playlist, including its curator and the
/// tracks embedded in the response's relationships.
pub fn from_am_catalog_playlist(am_playlist: &AmPlaylist) -> Playlist {
    let attributes = am_playlist.attributes.clone().unwrap_or_default();
    let global_id = attributes
        .play_params
        .as_ref()
        .and_then(|p| p.id.clone())
        .unwrap_or_else(|| am_playlist.id.clone());

    let mut playlist = Playlist::new(
        derive_id(&global_id),
        attributes.name.clone().unwrap_or_default(),
    );
    playlist.description = attributes.description.and_then(|d| d.standard);

    if let Some(curator_name) = &attributes.curator_name {
        let author_id = derive_id(curator_name);
        playlist.store_user(User {
            id: author_id.clone(),
            display_name: Some(curator_name.clone()),
            spotify: None,
        });
        playlist.author_id = Some(author_id);
    }

    let tracks = am_playlist
        .relationships
        .as_ref()
        .and_then(|r| r.tracks.as_ref())
        .map(|t| t.data.as_slice())
        .unwrap_or_default();
    for am_track in tracks {
        store_am_track(&mut playlist, am_track, TrackSource::Catalog);
    }

    playlist
}
