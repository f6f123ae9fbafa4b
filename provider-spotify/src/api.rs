//! Spotify Web API response types.
//!
//! Only the fields the conversion layer consumes are modeled; everything
//! else in the responses is ignored during deserialization.
//!
//! See: https://developer.spotify.com/documentation/web-api

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Base URL of the Spotify Web API
pub const API_BASE: &str = "https://api.spotify.com/v1";

/// Spotify's offset/limit paging envelope
#[derive(Debug, Clone, Deserialize)]
pub struct SpPaging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpImage {
    pub url: String,
}

/// Extract the first (largest) image URL, the one Spotify lists first.
pub fn first_image_url(images: &[SpImage]) -> Option<String> {
    images.first().map(|image| image.url.clone())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpArtist>,
    #[serde(default)]
    pub images: Vec<SpImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpArtist>,
    pub album: Option<SpAlbum>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub explicit: Option<bool>,
    #[serde(default)]
    pub external_ids: HashMap<String, String>,
}

/// One entry of a playlist's track listing. `track` is nullable: deleted
/// and region-locked items come back as `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpPlaylistTrack {
    pub track: Option<SpTrack>,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub added_by: Option<SpUser>,
}

/// One entry of the saved-tracks listing
#[derive(Debug, Clone, Deserialize)]
pub struct SpSavedTrack {
    pub track: Option<SpTrack>,
    #[serde(default)]
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: Option<bool>,
    #[serde(default)]
    pub images: Vec<SpImage>,
    pub owner: Option<SpUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpSearchResponse {
    pub tracks: Option<SpPaging<SpTrack>>,
}

#[derive(Debug, Serialize)]
pub struct SpCreatePlaylistRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Serialize)]
pub struct SpAddTracksRequest {
    pub uris: Vec<String>,
}
