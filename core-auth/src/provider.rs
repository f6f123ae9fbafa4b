use async_trait::async_trait;
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::types::Credential;

/// Source of valid credentials for one service.
///
/// Injected into a service at construction time; the service calls
/// [`authenticate`](CredentialProvider::authenticate) before each command
/// rather than caching tokens in shared state. Implementations may block on
/// user interaction but must bound that wait and fail with
/// [`AuthError::Timeout`] when it elapses.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authenticate(&self) -> Result<Credential>;
}

/// A provider that returns a fixed, pre-obtained credential.
///
/// Useful for tests and for hosts that manage tokens themselves.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn authenticate(&self) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}

/// A non-interactive provider that reads a token from an environment
/// variable, the way CI scripts supply pre-issued tokens.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    token_var: String,
    user_token_var: Option<String>,
}

impl EnvCredentialProvider {
    pub fn new(token_var: impl Into<String>) -> Self {
        Self {
            token_var: token_var.into(),
            user_token_var: None,
        }
    }

    /// Also read a secondary user token from `var`.
    pub fn with_user_token_var(mut self, var: impl Into<String>) -> Self {
        self.user_token_var = Some(var.into());
        self
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn authenticate(&self) -> Result<Credential> {
        let token = std::env::var(&self.token_var).map_err(|_| {
            AuthError::MissingConfig(format!("environment variable {} is not set", self.token_var))
        })?;
        let mut credential = Credential::bearer(token);
        if let Some(var) = &self.user_token_var {
            credential.user_token = Some(std::env::var(var).map_err(|_| {
                AuthError::MissingConfig(format!("environment variable {} is not set", var))
            })?);
        }
        debug!(var = %self.token_var, "credential loaded from environment");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_credential() {
        let provider = StaticCredentialProvider::new(Credential::bearer("tok"));
        let cred = provider.authenticate().await.unwrap();
        assert_eq!(cred.access_token, "tok");
    }

    #[tokio::test]
    async fn test_env_provider_reports_missing_var() {
        let provider = EnvCredentialProvider::new("DRUM_TEST_TOKEN_THAT_IS_NOT_SET");
        let err = provider.authenticate().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingConfig(_)));
    }
}
