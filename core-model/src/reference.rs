//! Resolved, service-owned resource references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The kind of resource a [`Ref`] points at.
///
/// Services only produce the subset of types they understand; `Special`
/// covers the per-service token locations (whole-library collections such
/// as `playlists` or `tracks`) and `Any` is used by services that make no
/// distinction (e.g. local files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Special,
    Playlist,
    Album,
    Artist,
    Track,
    User,
    Any,
}

impl ResourceType {
    /// Parse a resource type from its path segment in a service URL.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "playlist" => Some(ResourceType::Playlist),
            "album" => Some(ResourceType::Album),
            "artist" => Some(ResourceType::Artist),
            "track" => Some(ResourceType::Track),
            "user" => Some(ResourceType::User),
            _ => None,
        }
    }
}

/// Where a resource lives, from the owning service's point of view.
///
/// The payload is opaque to everything except the service that produced it:
/// a catalog id, a (storefront, id) pair, a filesystem path, the name of a
/// special collection, or the standard stream pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceLocation {
    /// A per-service special collection, e.g. `playlists` or `tracks`.
    Special(String),
    /// A single opaque id, e.g. a Spotify playlist id.
    Id(String),
    /// A storefront-qualified id (Apple Music catalog resources).
    StorefrontId { storefront: String, id: String },
    /// A local filesystem path.
    Path(PathBuf),
    /// The process's standard stream pair.
    Streams { input: bool, output: bool },
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocation::Special(name) => write!(f, "{}", name),
            ResourceLocation::Id(id) => write!(f, "{}", id),
            ResourceLocation::StorefrontId { storefront, id } => {
                write!(f, "{}/{}", storefront, id)
            }
            ResourceLocation::Path(path) => write!(f, "{}", path.display()),
            ResourceLocation::Streams { input, output } => match (input, output) {
                (true, true) => write!(f, "-"),
                (true, false) => write!(f, "stdin"),
                (false, true) => write!(f, "stdout"),
                (false, false) => write!(f, "(no streams)"),
            },
        }
    }
}

/// A resolved reference to a resource, usually one or multiple playlists.
///
/// A ref is created by exactly one service's parser, is immutable
/// thereafter, and is only ever consumed by that same service's download,
/// upload, remove, and preview operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    /// The name of the owning service.
    pub service_name: String,
    /// The type of the resource, may be service-dependent.
    pub resource_type: ResourceType,
    /// The location of the resource, interpreted only by the owning service.
    pub resource_location: ResourceLocation,
}

impl Ref {
    pub fn new(
        service_name: impl Into<String>,
        resource_type: ResourceType,
        resource_location: ResourceLocation,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            resource_type,
            resource_location,
        }
    }
}

impl fmt::Display for Ref {
    /// Formats token-form refs the way the user typed them
    /// (`@<service>/<location>`); other refs print their location.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_type {
            ResourceType::Special => {
                write!(f, "@{}/{}", self.service_name, self.resource_location)
            }
            _ => write!(f, "{}", self.resource_location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_parse() {
        assert_eq!(ResourceType::parse("playlist"), Some(ResourceType::Playlist));
        assert_eq!(ResourceType::parse("user"), Some(ResourceType::User));
        assert_eq!(ResourceType::parse("library"), None);
    }

    #[test]
    fn test_token_ref_display() {
        let r = Ref::new(
            "spotify",
            ResourceType::Special,
            ResourceLocation::Special("playlists".into()),
        );
        assert_eq!(r.to_string(), "@spotify/playlists");
    }

    #[test]
    fn test_locator_ref_display() {
        let r = Ref::new(
            "applemusic",
            ResourceType::Playlist,
            ResourceLocation::StorefrontId {
                storefront: "us".into(),
                id: "pl.abc".into(),
            },
        );
        assert_eq!(r.to_string(), "us/pl.abc");
    }
}
