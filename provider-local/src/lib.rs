//! # Local Providers
//!
//! Playlist storage without a remote service: JSON documents in a local
//! file tree, and the standard input/output streams for piping.

mod blocking;
pub mod codec;
pub mod file;
pub mod stdio;

pub use file::FileService;
pub use stdio::StdioService;
