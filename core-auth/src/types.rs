use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bearer credential for a remote music service API.
///
/// Providers hand these out ready to use; the core never refreshes or
/// persists them itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The access token to present to the API.
    pub access_token: String,
    /// The token scheme, e.g. `Bearer`.
    pub token_type: String,
    /// When the token stops being valid, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// A secondary user-scoped token, for APIs that require one in
    /// addition to the app token (e.g. Apple Music's `Music-User-Token`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
}

impl Credential {
    /// A bearer credential with no known expiry.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_at: None,
            user_token: None,
        }
    }

    /// The value for an HTTP `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Whether the credential is expired as of `now`.
    ///
    /// A credential without a recorded expiry is treated as valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
