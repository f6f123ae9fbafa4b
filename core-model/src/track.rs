//! Track entities and their per-service metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A track/song.
///
/// The artist, composer, album, and added-by fields are internal ids that
/// are only meaningful within the owning playlist's entity pools; they are
/// not globally unique across playlists. A track is immutable once
/// constructed aside from foreign ids backfilled during materialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    /// The name of the track.
    pub name: String,
    /// The internal artist ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artist_ids: Vec<String>,
    /// The internal composer ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composer_ids: Vec<String>,
    /// The internal album id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    /// The genre names of the track.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    /// The duration of the track in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Whether the track is explicit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
    /// The International Standard Recording Code of the track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    /// When the track was released.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    /// When the track was added to the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    /// The internal user id of whoever added the track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    /// Spotify-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<TrackSpotify>,
    /// Apple Music-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applemusic: Option<TrackAppleMusic>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Spotify-specific metadata about a track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackSpotify {
    /// The id of the track on Spotify.
    pub id: String,
}

/// Apple Music-specific metadata about a track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackAppleMusic {
    /// The library-scoped id of the track, if it came from a user library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
    /// The global catalog id of the track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    /// A short audio preview URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_omits_absent_fields() {
        let track = Track::new("Bohemian Rhapsody");
        let doc = serde_json::to_value(&track).unwrap();
        assert_eq!(doc, serde_json::json!({ "name": "Bohemian Rhapsody" }));
    }

    #[test]
    fn test_round_trip_with_populated_fields() {
        let track = Track {
            name: "Let it be".into(),
            artist_ids: vec!["1".into()],
            duration_ms: Some(243_026),
            explicit: Some(false),
            isrc: Some("GBAYE0601690".into()),
            spotify: Some(TrackSpotify {
                id: "7iN1s7xHE4ifF5povM6A48".into(),
            }),
            ..Default::default()
        };
        let bytes = serde_json::to_vec(&track).unwrap();
        let parsed: Track = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, track);
    }
}
