//! Reference parsing for Spotify resources.
//!
//! Three shapes are recognized:
//!
//! - tokens: `@spotify/playlists`, `@spotify/tracks`
//! - web links: `https://open.spotify.com/<type>/<id>`
//! - URNs: `spotify:<type>:<id>`

use core_model::{RawRef, Ref, ResourceLocation, ResourceType};
use url::Url;

pub const SERVICE_NAME: &str = "spotify";

fn parse_resource_type(raw: &str) -> Option<ResourceType> {
    match raw {
        "playlist" => Some(ResourceType::Playlist),
        "album" => Some(ResourceType::Album),
        "artist" => Some(ResourceType::Artist),
        "track" => Some(ResourceType::Track),
        "user" => Some(ResourceType::User),
        _ => None,
    }
}

fn parse_link(raw: &str) -> Option<Ref> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str() != Some("open.spotify.com") {
        return None;
    }

    let mut segments = url.path_segments()?;
    let resource_type = parse_resource_type(segments.next()?)?;
    let id = segments.next()?;
    if id.is_empty() || segments.next().is_some() {
        return None;
    }

    Some(Ref::new(
        SERVICE_NAME,
        resource_type,
        ResourceLocation::Id(id.to_string()),
    ))
}

fn parse_urn(raw: &str) -> Option<Ref> {
    let rest = raw.strip_prefix("spotify:")?;
    let (type_part, id) = rest.split_once(':')?;
    let resource_type = parse_resource_type(type_part)?;
    if id.is_empty() || id.contains(':') {
        return None;
    }

    Some(Ref::new(
        SERVICE_NAME,
        resource_type,
        ResourceLocation::Id(id.to_string()),
    ))
}

/// Try to interpret a raw reference as a Spotify resource.
pub fn parse_ref(raw_ref: &RawRef) -> Option<Ref> {
    if raw_ref.is_token {
        let location = match raw_ref.text.as_str() {
            "spotify/playlists" => "playlists",
            "spotify/tracks" => "tracks",
            _ => return None,
        };
        Some(Ref::new(
            SERVICE_NAME,
            ResourceType::Special,
            ResourceLocation::Special(location.to_string()),
        ))
    } else {
        parse_link(&raw_ref.text).or_else(|| parse_urn(&raw_ref.text))
    }
}
