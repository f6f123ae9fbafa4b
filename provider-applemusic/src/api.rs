//! Apple Music API request and response types.
//!
//! See: https://developer.apple.com/documentation/applemusicapi

use serde::{Deserialize, Serialize};

/// Base URL of the Apple Music API
pub const API_BASE: &str = "https://api.music.apple.com/v1";

/// The `data` + `meta` envelope wrapping every listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct AmResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<AmMeta>,
}

impl<T> AmResponse<T> {
    pub fn total(&self) -> Option<usize> {
        self.meta.as_ref().and_then(|meta| meta.total)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmMeta {
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmPlayParams {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub global_id: Option<String>,
}

/// Artwork with a templated URL: `{w}` and `{h}` are substituted with the
/// requested dimensions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmArtwork {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmDescription {
    #[serde(default)]
    pub standard: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmPlaylist {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<AmPlaylistAttributes>,
    #[serde(default)]
    pub relationships: Option<AmPlaylistRelationships>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmPlaylistAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<AmDescription>,
    #[serde(default)]
    pub play_params: Option<AmPlayParams>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub can_edit: Option<bool>,
    #[serde(default)]
    pub artwork: Option<AmArtwork>,
    #[serde(default)]
    pub curator_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmPlaylistRelationships {
    #[serde(default)]
    pub tracks: Option<AmResponse<AmTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmTrack {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<AmTrackAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmTrackAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genre_names: Vec<String>,
    #[serde(default)]
    pub duration_in_millis: Option<u64>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub composer_name: Option<String>,
    #[serde(default)]
    pub artwork: Option<AmArtwork>,
    #[serde(default)]
    pub play_params: Option<AmPlayParams>,
    #[serde(default)]
    pub previews: Vec<AmPreview>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmPreview {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmSearchResponse {
    #[serde(default)]
    pub results: Option<AmSearchResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmSearchResults {
    #[serde(default)]
    pub songs: Option<AmResponse<AmTrack>>,
}

#[derive(Debug, Serialize)]
pub struct AmCreatePlaylistRequest {
    pub attributes: AmCreatePlaylistAttributes,
    pub relationships: AmCreatePlaylistRelationships,
}

#[derive(Debug, Serialize)]
pub struct AmCreatePlaylistAttributes {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AmCreatePlaylistRelationships {
    pub tracks: AmTrackData,
}

#[derive(Debug, Serialize)]
pub struct AmTrackData {
    pub data: Vec<AmTrackRef>,
}

#[derive(Debug, Serialize)]
pub struct AmTrackRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl AmTrackRef {
    pub fn song(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "songs".to_string(),
        }
    }
}
