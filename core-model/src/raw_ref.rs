//! The unresolved, 'half-parsed' form of a resource reference.

use serde::{Deserialize, Serialize};

/// Prefix marking a reference as a token (e.g. `@spotify/playlists`).
pub const TOKEN_PREFIX: char = '@';

/// A lexically split but not yet resolved reference to a resource.
///
/// A raw ref only records whether the input began with the reserved `@`
/// sigil (with the sigil stripped); everything else is left to the
/// service-specific ref parsers, which decide applicability themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRef {
    /// The raw text (sigil-stripped if this is a token).
    pub text: String,
    /// Whether the original input began with the token sigil.
    pub is_token: bool,
}

impl RawRef {
    /// Parse a raw ref from user-supplied input.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_model::RawRef;
    ///
    /// let token = RawRef::parse("@spotify/playlists");
    /// assert!(token.is_token);
    /// assert_eq!(token.text, "spotify/playlists");
    ///
    /// let locator = RawRef::parse("playlists/road-trip.json");
    /// assert!(!locator.is_token);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(TOKEN_PREFIX) {
            Some(stripped) => Self {
                text: stripped.to_string(),
                is_token: true,
            },
            None => Self {
                text: raw.to_string(),
                is_token: false,
            },
        }
    }
}
