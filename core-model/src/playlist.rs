//! Playlists: an ordered track sequence plus deduplicated entity pools.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::album::Album;
use crate::artist::Artist;
use crate::track::Track;
use crate::user::User;

/// An entity that lives in a playlist's pools, keyed by internal id.
pub trait Entity {
    fn id(&self) -> &str;
}

impl Entity for Artist {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Album {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A list of tracks with metadata.
///
/// The track sequence is ordered (playback order); the users, artists, and
/// albums pools are unordered maps from internal id to entity, deduplicated
/// with first-write-wins semantics via the [`store_user`](Playlist::store_user),
/// [`store_artist`](Playlist::store_artist), and
/// [`store_album`](Playlist::store_album) methods. Services register an
/// entity in its pool in the same operation that creates a reference to it,
/// so every id referenced by a track or album is resolvable by the time the
/// playlist is complete.
///
/// In the serialized document the pools appear as arrays of entities
/// (sorted by id) and are rebuilt into maps on deserialization, keeping the
/// document isomorphic to the in-memory structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Playlist {
    /// The internal id of the playlist.
    pub id: String,
    /// The name of the playlist.
    pub name: String,
    /// A description of the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The internal user id of the playlist author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// The root-relative folder segments this playlist is filed under.
    ///
    /// Volatile: directory-tree layouts strip this before persisting and
    /// recompute it from the file location on load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// Spotify-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<PlaylistSpotify>,
    /// Apple Music-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applemusic: Option<PlaylistAppleMusic>,
    /// Users referenced anywhere in the playlist, keyed by internal id.
    #[serde(
        default,
        with = "entity_pool",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub users: HashMap<String, User>,
    /// Artists referenced anywhere in the playlist, keyed by internal id.
    #[serde(
        default,
        with = "entity_pool",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub artists: HashMap<String, Artist>,
    /// Albums referenced anywhere in the playlist, keyed by internal id.
    #[serde(
        default,
        with = "entity_pool",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub albums: HashMap<String, Album>,
    /// The tracks of the playlist, in playback order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a track, preserving the order tracks were discovered in.
    pub fn store_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Insert an artist into the pool unless its id is already present
    /// (first-write-wins).
    pub fn store_artist(&mut self, artist: Artist) {
        self.artists.entry(artist.id.clone()).or_insert(artist);
    }

    /// Insert an album into the pool unless its id is already present
    /// (first-write-wins).
    pub fn store_album(&mut self, album: Album) {
        self.albums.entry(album.id.clone()).or_insert(album);
    }

    /// Insert a user into the pool unless its id is already present
    /// (first-write-wins).
    pub fn store_user(&mut self, user: User) {
        self.users.entry(user.id.clone()).or_insert(user);
    }

    /// Build the free-text phrase used to match a track against another
    /// service's search endpoint: the track name followed by its artist
    /// names as resolved through the artist pool.
    pub fn track_search_phrase(&self, track: &Track) -> String {
        let artist_names: Vec<&str> = track
            .artist_ids
            .iter()
            .filter_map(|id| self.artists.get(id))
            .filter_map(|artist| artist.name.as_deref())
            .collect();
        if artist_names.is_empty() {
            track.name.clone()
        } else {
            format!("{} {}", track.name, artist_names.join(" "))
        }
    }
}

/// Spotify-specific metadata about a playlist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaylistSpotify {
    /// The id of the playlist on Spotify.
    pub id: String,
    /// Whether the playlist is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Whether the playlist is collaborative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborative: Option<bool>,
    /// The cover image of the playlist on Spotify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Apple Music-specific metadata about a playlist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaylistAppleMusic {
    /// The library-scoped id of the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
    /// The global catalog id of the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    /// Whether the playlist is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Whether the playlist can be edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    /// The cover image of the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Serde adapter for entity pools: arrays of entities on the wire, id-keyed
/// maps in memory. Serialization sorts by id so documents are deterministic.
mod entity_pool {
    use super::Entity;
    use serde::de::DeserializeOwned;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S, T>(pool: &HashMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize + Entity,
    {
        let mut entities: Vec<&T> = pool.values().collect();
        entities.sort_by(|a, b| a.id().cmp(b.id()));
        let mut seq = serializer.serialize_seq(Some(entities.len()))?;
        for entity in entities {
            seq.serialize_element(entity)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Entity,
    {
        let entities = Vec::<T>::deserialize(deserializer)?;
        Ok(entities
            .into_iter()
            .map(|entity| (entity.id().to_string(), entity))
            .collect())
    }
}
