//! The persisted playlist document format.
//!
//! Playlists are stored as indented JSON documents: one playlist per
//! document, entity pools as arrays sorted by id, absent optional fields
//! omitted. The format is symmetric, a serialized playlist deserializes
//! to an equal value.

use core_model::Playlist;
use core_service::Result;

/// Serialize a playlist into document bytes.
pub fn serialize(playlist: &Playlist) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(playlist)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse a playlist from document bytes.
pub fn deserialize(bytes: &[u8]) -> Result<Playlist> {
    Ok(serde_json::from_slice(bytes)?)
}
