//! Bridging synchronous stream and filesystem calls onto the runtime.

use core_service::{Result, ServiceError};

/// Run blocking I/O on the dedicated thread pool so playlist operations do
/// not stall the async executor.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(e) => Err(ServiceError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e,
        ))),
    }
}
