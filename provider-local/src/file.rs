//! Playlist storage in a local file tree.

use std::fs;
use std::path::{Path, PathBuf};

use async_stream::try_stream;
use async_trait::async_trait;
use core_model::{Playlist, RawRef, Ref, ResourceLocation, ResourceType};
use core_service::{PlaylistStream, Result, Service, ServiceError};
use tracing::{debug, info};
use url::Url;

use crate::blocking::run_blocking;
use crate::codec;

/// Initial length of the id prefix appended to generated file names.
const ID_PREFIX_LENGTH: usize = 6;

/// Reads and writes playlist documents in a local directory tree.
///
/// Claims every non-token reference (a bare path or a `file:` URL), so it
/// must be registered after every service with a more specific shape. A
/// directory maps to a collection of playlists: each `*.json` file below
/// it is one playlist, and the folder segments between the base and the
/// file become the playlist's `path`.
#[derive(Debug, Default, Clone)]
pub struct FileService;

impl FileService {
    pub fn new() -> Self {
        Self
    }

    /// Collect every playlist document below `base`, sorted for a stable
    /// traversal order.
    fn collect_documents(base: &Path) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();
        let mut pending = vec![base.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<_>>()?;
            entries.sort();
            for path in entries {
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    documents.push(path);
                }
            }
        }
        documents.sort();
        Ok(documents)
    }

    fn read_playlist(path: &Path) -> Result<Playlist> {
        codec::deserialize(&fs::read(path)?)
    }

    /// The folder segments between `base` and the document, used as the
    /// playlist's path.
    fn relative_folders(base: &Path, document: &Path) -> Vec<String> {
        document
            .parent()
            .and_then(|parent| parent.strip_prefix(base).ok())
            .map(|relative| {
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pick a file name of the form `<kebab-name>-<id-prefix>.json`,
    /// growing the id prefix for as long as the name collides with a
    /// different playlist.
    fn unique_document_path(dir: &Path, playlist: &Playlist) -> Result<PathBuf> {
        let stem = kebab_case(&playlist.name);
        let mut length = ID_PREFIX_LENGTH.min(playlist.id.len());
        loop {
            let candidate = dir.join(format!(
                "{stem}-{}.json",
                &playlist.id[..length.min(playlist.id.len())]
            ));
            if !candidate.exists() || Self::read_playlist(&candidate)?.id == playlist.id {
                return Ok(candidate);
            }
            if length >= playlist.id.len() {
                return Ok(candidate);
            }
            length += 1;
        }
    }

    fn write_playlist(base: &Path, playlist: &Playlist) -> Result<()> {
        // The path field is recomputed from the file location on load, so
        // it is stripped from the persisted document.
        let mut document = playlist.clone();
        let folders = std::mem::take(&mut document.path);

        let target = if base.exists() && !base.is_dir() {
            base.to_path_buf()
        } else {
            let mut dir = base.to_path_buf();
            for folder in &folders {
                dir.push(folder);
            }
            Self::unique_document_path(&dir, playlist)?
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %target.display(), "writing playlist document");
        fs::write(&target, codec::serialize(&document)?)?;
        Ok(())
    }
}

/// Convert a playlist name to kebab-case for use in file names.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_dash = true;
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_whitespace() || matches!(c, '_' | '/' | '-' | ':' | '.') {
            if !previous_dash {
                out.push('-');
                previous_dash = true;
            }
            previous_lower = false;
        } else {
            if c.is_uppercase() && previous_lower && !previous_dash {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            previous_dash = false;
            previous_lower = c.is_lowercase() || c.is_numeric();
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[async_trait]
impl Service for FileService {
    fn name(&self) -> &str {
        "file"
    }

    /// Claims every non-token ref: `file:` URLs are resolved to their
    /// path, anything else is taken as a path verbatim.
    fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
        if raw_ref.is_token {
            return None;
        }
        let path = if raw_ref.text.starts_with("file:") {
            Url::parse(&raw_ref.text)
                .ok()
                .and_then(|url| url.to_file_path().ok())?
        } else {
            PathBuf::from(&raw_ref.text)
        };
        Some(Ref::new(
            self.name(),
            ResourceType::Any,
            ResourceLocation::Path(path),
        ))
    }

    async fn download(&self, playlist_ref: &Ref) -> Result<PlaylistStream> {
        let ResourceLocation::Path(base) = &playlist_ref.resource_location else {
            return Err(ServiceError::BadRef(format!(
                "expected a path, got {playlist_ref}"
            )));
        };
        let base = base.clone();

        // The directory scan happens up front; document reads stay lazy.
        let (documents, is_collection) = run_blocking({
            let base = base.clone();
            move || {
                if base.is_dir() {
                    Ok((FileService::collect_documents(&base)?, true))
                } else {
                    Ok((vec![base], false))
                }
            }
        })
        .await?;
        debug!(count = documents.len(), base = %base.display(), "found playlist documents");

        Ok(Box::pin(try_stream! {
            for document in documents {
                let source = document.clone();
                let mut playlist =
                    run_blocking(move || FileService::read_playlist(&source)).await?;
                if is_collection {
                    playlist.path = FileService::relative_folders(&base, &document);
                }
                yield playlist;
            }
        }))
    }

    async fn upload(
        &self,
        playlist_ref: &Ref,
        playlists: Vec<Playlist>,
    ) -> Result<Option<Vec<Playlist>>> {
        let ResourceLocation::Path(base) = &playlist_ref.resource_location else {
            return Err(ServiceError::BadRef(format!(
                "expected a path, got {playlist_ref}"
            )));
        };
        let base = base.clone();
        run_blocking(move || {
            for playlist in &playlists {
                Self::write_playlist(&base, playlist)?;
            }
            Ok(None)
        })
        .await
    }

    async fn remove(&self, playlist_ref: &Ref) -> Result<()> {
        let ResourceLocation::Path(path) = &playlist_ref.resource_location else {
            return Err(ServiceError::BadRef(format!(
                "expected a path, got {playlist_ref}"
            )));
        };
        let path = path.clone();
        run_blocking(move || {
            if path.is_dir() {
                return Err(ServiceError::BadRef(
                    "removing directories is not supported".to_string(),
                ));
            }
            info!(path = %path.display(), "removing playlist document");
            fs::remove_file(&path)?;
            Ok(())
        })
        .await
    }
}
