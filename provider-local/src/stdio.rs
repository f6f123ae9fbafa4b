//! Playlist piping through the standard streams.

use std::io::{Read, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use core_model::{Playlist, RawRef, Ref, ResourceLocation, ResourceType};
use core_service::{PlaylistStream, Result, Service, ServiceError};
use futures::stream;
use tracing::debug;

use crate::blocking::run_blocking;
use crate::codec;

/// Reads playlist documents from stdin and writes them to stdout.
///
/// Claimed refs: the tokens `@stdin` and `@stdout` for one direction each,
/// and the conventional locator `-` for both. Useful for piping playlists
/// between invocations or into other tools.
pub struct StdioService {
    /// Taken on the first download; the input is a single document.
    input: Mutex<Option<Box<dyn Read + Send>>>,
    output: Mutex<Option<Box<dyn Write + Send>>>,
}

impl StdioService {
    pub fn new() -> Self {
        Self::with_streams(Box::new(std::io::stdin()), Box::new(std::io::stdout()))
    }

    /// Construct with explicit streams instead of the process streams.
    pub fn with_streams(input: Box<dyn Read + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input: Mutex::new(Some(input)),
            output: Mutex::new(Some(output)),
        }
    }

    fn stream_gone(which: &str) -> ServiceError {
        ServiceError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{which} stream is not available"),
        ))
    }

    fn streams(playlist_ref: &Ref) -> Result<(bool, bool)> {
        match &playlist_ref.resource_location {
            ResourceLocation::Streams { input, output } => Ok((*input, *output)),
            _ => Err(ServiceError::BadRef(format!(
                "expected a stream locator, got {playlist_ref}"
            ))),
        }
    }
}

impl Default for StdioService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for StdioService {
    fn name(&self) -> &str {
        "stdio"
    }

    fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
        let (input, output) = if raw_ref.is_token {
            match raw_ref.text.as_str() {
                "stdin" => (true, false),
                "stdout" => (false, true),
                _ => return None,
            }
        } else if raw_ref.text == "-" {
            (true, true)
        } else {
            return None;
        };
        Some(Ref::new(
            self.name(),
            ResourceType::Any,
            ResourceLocation::Streams { input, output },
        ))
    }

    async fn download(&self, playlist_ref: &Ref) -> Result<PlaylistStream> {
        let (input, _) = Self::streams(playlist_ref)?;
        if !input {
            return Ok(Box::pin(stream::empty()));
        }

        let mut reader = self
            .input
            .lock()
            .map_err(|_| Self::stream_gone("input"))?
            .take()
            .ok_or_else(|| Self::stream_gone("input"))?;

        let bytes = run_blocking(move || {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
        .await?;
        debug!(bytes = bytes.len(), "read playlist document from stdin");
        let playlist = codec::deserialize(&bytes)?;
        Ok(Box::pin(stream::iter([Ok::<_, ServiceError>(playlist)])))
    }

    async fn upload(
        &self,
        playlist_ref: &Ref,
        playlists: Vec<Playlist>,
    ) -> Result<Option<Vec<Playlist>>> {
        let (_, output) = Self::streams(playlist_ref)?;
        if !output {
            return Err(ServiceError::BadRef(
                "cannot upload to somewhere other than stdout".to_string(),
            ));
        }

        let documents: Vec<Vec<u8>> = playlists
            .iter()
            .map(codec::serialize)
            .collect::<Result<_>>()?;

        let mut writer = self
            .output
            .lock()
            .map_err(|_| Self::stream_gone("output"))?
            .take()
            .ok_or_else(|| Self::stream_gone("output"))?;

        let (writer, outcome) = run_blocking(move || {
            let outcome = (|| {
                for document in &documents {
                    writer.write_all(document)?;
                }
                writer.flush()
            })();
            Ok((writer, outcome))
        })
        .await?;

        // The writer goes back so later uploads can append to it.
        if let Ok(mut slot) = self.output.lock() {
            *slot = Some(writer);
        }
        outcome?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn service_with_input(bytes: Vec<u8>) -> StdioService {
        StdioService::with_streams(Box::new(io::Cursor::new(bytes)), Box::new(io::sink()))
    }

    #[test]
    fn test_parse_ref_tokens_and_dash() {
        let service = StdioService::with_streams(Box::new(io::empty()), Box::new(io::sink()));

        let r = service.parse_ref(&RawRef::parse("@stdin")).unwrap();
        assert_eq!(
            r.resource_location,
            ResourceLocation::Streams {
                input: true,
                output: false
            }
        );

        let r = service.parse_ref(&RawRef::parse("-")).unwrap();
        assert_eq!(
            r.resource_location,
            ResourceLocation::Streams {
                input: true,
                output: true
            }
        );

        assert!(service.parse_ref(&RawRef::parse("@stderr")).is_none());
        assert!(service.parse_ref(&RawRef::parse("some/path")).is_none());
    }

    #[tokio::test]
    async fn test_download_parses_one_document() {
        let playlist = Playlist::new("p1", "Piped");
        let service = service_with_input(codec::serialize(&playlist).unwrap());
        let r = service.parse_ref(&RawRef::parse("@stdin")).unwrap();

        let playlists: Vec<Playlist> = service
            .download(&r)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(playlists, vec![playlist]);
    }

    #[tokio::test]
    async fn test_upload_writes_documents_to_output() {
        let buffer = SharedBuffer::default();
        let service =
            StdioService::with_streams(Box::new(io::empty()), Box::new(buffer.clone()));
        let r = service.parse_ref(&RawRef::parse("@stdout")).unwrap();

        service
            .upload(&r, vec![Playlist::new("p1", "Out")])
            .await
            .unwrap();

        let written = buffer.0.lock().unwrap();
        let text = String::from_utf8(written.clone()).unwrap();
        assert!(text.contains("\"name\": \"Out\""));
    }

    #[tokio::test]
    async fn test_repeated_uploads_append_to_output() {
        let buffer = SharedBuffer::default();
        let service =
            StdioService::with_streams(Box::new(io::empty()), Box::new(buffer.clone()));
        let r = service.parse_ref(&RawRef::parse("@stdout")).unwrap();

        service
            .upload(&r, vec![Playlist::new("p1", "First")])
            .await
            .unwrap();
        service
            .upload(&r, vec![Playlist::new("p2", "Second")])
            .await
            .unwrap();

        let written = buffer.0.lock().unwrap();
        let text = String::from_utf8(written.clone()).unwrap();
        assert!(text.contains("\"name\": \"First\""));
        assert!(text.contains("\"name\": \"Second\""));
    }

    #[tokio::test]
    async fn test_input_is_consumed_by_the_first_download() {
        let playlist = Playlist::new("p1", "Piped");
        let service = service_with_input(codec::serialize(&playlist).unwrap());
        let r = service.parse_ref(&RawRef::parse("@stdin")).unwrap();

        service.download(&r).await.unwrap();
        let err = service.download(&r).await.err().unwrap();
        assert!(matches!(err, ServiceError::Io(_)));
    }

    #[tokio::test]
    async fn test_upload_to_stdin_only_ref_fails() {
        let service = service_with_input(Vec::new());
        let r = service.parse_ref(&RawRef::parse("@stdin")).unwrap();
        let err = service.upload(&r, vec![]).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRef(_)));
    }
}
