//! Artist entities and their per-service metadata.

use serde::{Deserialize, Serialize};

/// An artist.
///
/// Artists are identified by their internal [`id`](Artist::id) only; the
/// per-service sub-records carry the opaque external identifiers they were
/// derived from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Artist {
    /// The internal id of the artist.
    pub id: String,
    /// The displayed/formatted name of the artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Spotify-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<ArtistSpotify>,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            spotify: None,
        }
    }
}

/// Spotify-specific metadata about an artist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtistSpotify {
    /// The id of the artist on Spotify.
    pub id: String,
    /// The profile image of the artist on Spotify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
