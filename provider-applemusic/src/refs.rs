//! Reference parsing for Apple Music resources.
//!
//! Recognized shapes:
//!
//! - tokens: `@applemusic/playlists`, `@applemusic/tracks`
//! - storefront links:
//!   `https://music.apple.com/<storefront>/<type>/<name>/<id>`

use core_model::{RawRef, Ref, ResourceLocation, ResourceType};
use url::Url;

pub const SERVICE_NAME: &str = "applemusic";

fn parse_resource_type(raw: &str) -> Option<ResourceType> {
    match raw {
        "playlist" => Some(ResourceType::Playlist),
        "album" => Some(ResourceType::Album),
        "artist" => Some(ResourceType::Artist),
        _ => None,
    }
}

fn parse_link(raw: &str) -> Option<Ref> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str() != Some("music.apple.com") {
        return None;
    }

    // Path shape: /<storefront>/<type>/<url-name>/<id>. The readable name
    // segment is ignored; the trailing id is what the catalog API wants.
    let segments: Vec<&str> = url.path_segments()?.collect();
    if segments.len() != 4 {
        return None;
    }
    let storefront = segments[0];
    let resource_type = parse_resource_type(segments[1])?;
    let id = segments[3];
    if storefront.is_empty() || id.is_empty() {
        return None;
    }

    Some(Ref::new(
        SERVICE_NAME,
        resource_type,
        ResourceLocation::StorefrontId {
            storefront: storefront.to_string(),
            id: id.to_string(),
        },
    ))
}

/// Try to interpret a raw reference as an Apple Music resource.
pub fn parse_ref(raw_ref: &RawRef) -> Option<Ref> {
    if raw_ref.is_token {
        let location = match raw_ref.text.as_str() {
            "applemusic/playlists" => "playlists",
            "applemusic/tracks" => "tracks",
            _ => return None,
        };
        Some(Ref::new(
            SERVICE_NAME,
            ResourceType::Special,
            ResourceLocation::Special(location.to_string()),
        ))
    } else {
        parse_link(&raw_ref.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Option<Ref> {
        parse_ref(&RawRef::parse(raw))
    }

    #[test]
    fn test_tokens() {
        let r = parse("@applemusic/playlists").unwrap();
        assert_eq!(r.service_name, "applemusic");
        assert_eq!(r.resource_type, ResourceType::Special);

        assert!(parse("@applemusic/library").is_none());
        assert!(parse("@spotify/playlists").is_none());
    }

    #[test]
    fn test_storefront_links() {
        let r = parse("https://music.apple.com/us/playlist/some-name/pl.abc123").unwrap();
        assert_eq!(r.resource_type, ResourceType::Playlist);
        assert_eq!(
            r.resource_location,
            ResourceLocation::StorefrontId {
                storefront: "us".to_string(),
                id: "pl.abc123".to_string(),
            }
        );

        let r = parse("https://music.apple.com/de/album/ein-album/123456").unwrap();
        assert_eq!(r.resource_type, ResourceType::Album);

        // Wrong host, wrong depth, unknown type.
        assert!(parse("https://music.example.com/us/playlist/x/pl.1").is_none());
        assert!(parse("https://music.apple.com/us/playlist/pl.1").is_none());
        assert!(parse("https://music.apple.com/us/mixtape/x/pl.1").is_none());
    }

    #[test]
    fn test_plain_paths_are_not_claimed() {
        assert!(parse("playlists/mix.json").is_none());
    }
}
