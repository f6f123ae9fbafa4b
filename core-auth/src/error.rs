use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Required configuration (environment variables, key files) is absent.
    #[error("Missing credential configuration: {0}")]
    MissingConfig(String),

    /// The authentication backend rejected the request.
    #[error("Authentication failed: {0}")]
    Failed(String),

    /// The provider did not produce a credential within its time bound.
    #[error("Authentication timed out after {0} seconds")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, AuthError>;
