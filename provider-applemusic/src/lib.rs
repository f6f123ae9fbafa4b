//! # Apple Music Provider
//!
//! Playlist access through the Apple Music API.
//!
//! ## Overview
//!
//! This module provides:
//! - Reference parsing for `@applemusic/...` tokens and `music.apple.com`
//!   storefront links
//! - Download of the playlist library (total-driven paging) and of catalog
//!   playlists
//! - Upload into the library via catalog search and a single create call

pub mod api;
pub mod convert;
pub mod refs;
pub mod service;

pub use service::AppleMusicService;
