//! # Core Data Model
//!
//! Value types shared by every Drum service: tracks, artists, albums, users,
//! playlists, and the reference grammar used to address them.
//!
//! ## Overview
//!
//! A [`Playlist`] is an ordered sequence of [`Track`]s plus three deduplicated
//! entity pools (artists, albums, users) keyed by internal id. Internal ids
//! are derived exclusively through the [`ident`] module so that the same
//! remote entity always maps to the same pool entry, no matter how often a
//! service observes it.
//!
//! References enter the system as a [`RawRef`] (a lexical split of token vs.
//! locator forms) and are resolved by exactly one service into a [`Ref`],
//! which that service alone knows how to interpret.
//!
//! ## Serialized form
//!
//! All model types serialize to nested, string-keyed documents. Absent
//! optional fields are omitted rather than emitted as null, and the entity
//! pools serialize as arrays of entities (sorted by id for deterministic
//! output) while deserializing back into id-keyed maps. Round-tripping a
//! playlist through its document form is lossless for all populated fields.

pub mod album;
pub mod artist;
pub mod ident;
pub mod playlist;
pub mod raw_ref;
pub mod reference;
pub mod track;
pub mod user;

pub use album::{Album, AlbumAppleMusic, AlbumSpotify};
pub use artist::{Artist, ArtistSpotify};
pub use ident::{derive_id, derive_opt_id};
pub use playlist::{Playlist, PlaylistAppleMusic, PlaylistSpotify};
pub use raw_ref::RawRef;
pub use reference::{Ref, ResourceLocation, ResourceType};
pub use track::{Track, TrackAppleMusic, TrackSpotify};
pub use user::{User, UserSpotify};
