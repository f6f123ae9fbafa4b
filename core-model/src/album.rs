//! Album entities and their per-service metadata.

use serde::{Deserialize, Serialize};

/// An album, i.e. a composition of tracks by an artist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Album {
    /// The internal id of the album.
    pub id: String,
    /// The name of the album.
    pub name: String,
    /// The internal artist ids of the album, resolvable in the owning
    /// playlist's artist pool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artist_ids: Vec<String>,
    /// Spotify-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<AlbumSpotify>,
    /// Apple Music-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applemusic: Option<AlbumAppleMusic>,
}

impl Album {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Spotify-specific metadata about an album.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlbumSpotify {
    /// The id of the album on Spotify.
    pub id: String,
    /// The URL of the album cover art on Spotify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Apple Music-specific metadata about an album.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlbumAppleMusic {
    /// The cover image of the album.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
