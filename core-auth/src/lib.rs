//! # Credential Provisioning
//!
//! The narrow contract between Drum's service backends and whatever
//! authentication machinery a host wires in: "give me a valid bearer
//! credential".
//!
//! ## Overview
//!
//! Interactive flows (browser OAuth dances, callback servers, token
//! persistence) live outside the core. Services receive a
//! [`CredentialProvider`] at construction time and ask it for a
//! [`Credential`] before talking to their remote API; there is no shared
//! mutable authentication state.
//!
//! Implementations must resolve within a bounded time. A provider that
//! waits on user interaction has to enforce its own timeout and fail with
//! [`AuthError::Timeout`] rather than blocking a transfer indefinitely.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{AuthError, Result};
pub use provider::{CredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
pub use types::Credential;
