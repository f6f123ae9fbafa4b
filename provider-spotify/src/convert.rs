//! Conversion from Spotify API payloads into the shared playlist model.
//!
//! Converted entities are registered into the target playlist's pools as
//! they are encountered; the pools keep the first observation of every id,
//! so repeated artists, albums and users across tracks collapse into one
//! entry each.

use chrono::{DateTime, Utc};
use core_model::{
    derive_id, Album, AlbumSpotify, Artist, ArtistSpotify, Playlist, PlaylistSpotify, Track,
    TrackSpotify, User, UserSpotify,
};

use crate::api::{first_image_url, SpAlbum, SpArtist, SpPlaylist, SpTrack, SpUser};

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Register a user in the playlist's pool and return its internal id.
pub fn store_sp_user(playlist: &mut Playlist, sp_user: &SpUser) -> String {
    let id = derive_id(&sp_user.id);
    playlist.store_user(User {
        id: id.clone(),
        display_name: sp_user.display_name.clone(),
        spotify: Some(UserSpotify {
            id: sp_user.id.clone(),
            image_url: first_image_url(&sp_user.images),
        }),
    });
    id
}

/// Register an artist in the playlist's pool and return its internal id.
pub fn store_sp_artist(playlist: &mut Playlist, sp_artist: &SpArtist) -> String {
    let id = derive_id(&sp_artist.id);
    playlist.store_artist(Artist {
        id: id.clone(),
        name: Some(sp_artist.name.clone()),
        spotify: Some(ArtistSpotify {
            id: sp_artist.id.clone(),
            image_url: first_image_url(&sp_artist.images),
        }),
    });
    id
}

/// Register an album and its artists in the playlist's pools and return
/// the album's internal id.
pub fn store_sp_album(playlist: &mut Playlist, sp_album: &SpAlbum) -> String {
    let id = derive_id(&sp_album.id);
    let artist_ids = sp_album
        .artists
        .iter()
        .map(|sp_artist| store_sp_artist(playlist, sp_artist))
        .collect();
    playlist.store_album(Album {
        id: id.clone(),
        name: sp_album.name.clone(),
        artist_ids,
        spotify: Some(AlbumSpotify {
            id: sp_album.id.clone(),
            image_url: first_image_url(&sp_album.images),
        }),
        applemusic: None,
    });
    id
}

/// Convert a track, register every entity it references and append it to
/// the playlist's track list.
pub fn store_sp_track(
    playlist: &mut Playlist,
    sp_track: &SpTrack,
    added_at: Option<&str>,
    added_by: Option<&SpUser>,
) {
    let artist_ids = sp_track
        .artists
        .iter()
        .map(|sp_artist| store_sp_artist(playlist, sp_artist))
        .collect();
    let album_id = sp_track
        .album
        .as_ref()
        .map(|sp_album| store_sp_album(playlist, sp_album));
    let added_by = added_by.map(|sp_user| store_sp_user(playlist, sp_user));

    playlist.store_track(Track {
        name: sp_track.name.clone(),
        artist_ids,
        album_id,
        duration_ms: sp_track.duration_ms,
        explicit: sp_track.explicit,
        isrc: sp_track.external_ids.get("isrc").cloned(),
        added_at: parse_timestamp(added_at),
        added_by,
        spotify: Some(TrackSpotify {
            id: sp_track.id.clone(),
        }),
        ..Track::default()
    });
}

/// Build a playlist shell (metadata, owner) with empty pools, ready for
/// tracks to be stored into it.
pub fn from_sp_playlist(sp_playlist: &SpPlaylist) -> Playlist {
    let mut playlist = Playlist::new(derive_id(&sp_playlist.id), &sp_playlist.name);
    playlist.description = sp_playlist
        .description
        .clone()
        .filter(|description| !description.is_empty());
    playlist.spotify = Some(PlaylistSpotify {
        id: sp_playlist.id.clone(),
        public: sp_playlist.public,
        collaborative: sp_playlist.collaborative,
        image_url: first_image_url(&sp_playlist.images),
    });
    if let Some(sp_owner) = &sp_playlist.owner {
        let author_id = store_sp_user(&mut playlist, sp_owner);
        playlist.author_id = Some(author_id);
    }
    playlist
}
