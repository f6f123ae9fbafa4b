//! User entities and their per-service metadata.

use serde::{Deserialize, Serialize};

/// A user, e.g. a playlist author or the adder of a track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    /// The internal id of the user.
    pub id: String,
    /// The general formatted name of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Spotify-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<UserSpotify>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Spotify-specific metadata about a user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserSpotify {
    /// The id of the user on Spotify.
    pub id: String,
    /// The profile image of the user on Spotify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
