//! # Spotify Provider
//!
//! Playlist access through the Spotify Web API.
//!
//! ## Overview
//!
//! This module provides:
//! - Reference parsing for `@spotify/...` tokens, `open.spotify.com` links
//!   and `spotify:` URNs
//! - Lazy download of the playlist library, saved tracks and single
//!   playlists, with chunked paging and rate-limit backoff
//! - Upload of playlists into the library, matching tracks by known id or
//!   search phrase

pub mod api;
pub mod convert;
pub mod refs;
pub mod service;

pub use service::SpotifyService;
