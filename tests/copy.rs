//! End-to-end copy through the default registry, between two local
//! directories.

use std::sync::Arc;

use core_auth::{Credential, StaticCredentialProvider};
use core_model::{Playlist, Track};
use core_service::{HttpClient, HttpRequest, HttpResponse, Result as ServiceResult};
use drum::{copy_refs, default_registry, Service, TransferOptions};
use tempfile::TempDir;

struct UnreachableHttp;

#[async_trait::async_trait]
impl HttpClient for UnreachableHttp {
    async fn execute(&self, request: HttpRequest) -> ServiceResult<HttpResponse> {
        panic!("no HTTP expected for local copies, got {}", request.url);
    }
}

fn registry() -> drum::ServiceRegistry<drum::AnyService> {
    let credentials = Arc::new(StaticCredentialProvider::new(Credential::bearer("token")));
    default_registry(Arc::new(UnreachableHttp), credentials.clone(), credentials, "us")
}

fn sample_playlist(id: &str, name: &str, tracks: &[&str]) -> Playlist {
    let mut playlist = Playlist::new(id, name);
    for track_name in tracks {
        playlist.store_track(Track::new(*track_name));
    }
    playlist
}

#[tokio::test]
async fn test_copy_between_local_directories() {
    let registry = registry();
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let src_ref_str = src.path().to_str().unwrap().to_string();
    let dest_ref_str = dest.path().to_str().unwrap().to_string();

    // Seed the source directory through the file service itself.
    let (file_service, src_ref) = registry.resolve(&src_ref_str).unwrap();
    file_service
        .upload(
            &src_ref,
            vec![
                sample_playlist("aaa111", "Morning Mix", &["One", "Two"]),
                sample_playlist("bbb222", "Evening Mix", &["Three"]),
            ],
        )
        .await
        .unwrap();

    let report = copy_refs(
        &registry,
        &src_ref_str,
        &dest_ref_str,
        &TransferOptions::default(),
    )
    .await
    .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.completed, 2);

    // The destination now holds the same playlists.
    use futures::TryStreamExt;
    let (dest_service, dest_ref) = registry.resolve(&dest_ref_str).unwrap();
    let stream = dest_service.download(&dest_ref).await.unwrap();
    let mut copied: Vec<Playlist> = stream.try_collect().await.unwrap();
    copied.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(copied.len(), 2);
    assert_eq!(copied[0].name, "Evening Mix");
    assert_eq!(copied[0].tracks.len(), 1);
    assert_eq!(copied[1].name, "Morning Mix");
    assert_eq!(
        copied[1]
            .tracks
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>(),
        ["One", "Two"]
    );
}

#[tokio::test]
async fn test_unresolvable_source_fails_before_any_transfer() {
    let registry = registry();
    let dest = TempDir::new().unwrap();

    let err = copy_refs(
        &registry,
        "@nonexistent/playlists",
        dest.path().to_str().unwrap(),
        &TransferOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, drum::TransferError::Download(_)));
}
