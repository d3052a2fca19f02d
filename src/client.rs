use std::future::Future;
use std::io;
use std::path::Path;

use tokio::fs as async_fs;

use crate::error::ApiError;
use crate::release::Release;

/// Payload for a single release asset upload.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
    pub content_length: u64,
}

/// Release endpoints of the GitHub REST API, scoped to what the workflow needs.
///
/// Implementations own their credentials; callers never pass tokens around.
pub trait ReleaseClient: Send + Sync {
    fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> impl Future<Output = Result<Release, ApiError>> + Send;

    fn get_release(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> impl Future<Output = Result<Release, ApiError>> + Send;

    /// One page of releases, newest first. `page` starts at 1.
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> impl Future<Output = Result<Vec<Release>, ApiError>> + Send;

    fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: &str,
        draft: bool,
        prerelease: bool,
    ) -> impl Future<Output = Result<Release, ApiError>> + Send;

    fn delete_release(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `upload_url` is the release's upload endpoint without its URI template.
    fn upload_release_asset(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
        upload_url: &str,
        upload: AssetUpload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Provides the bytes of local files to upload.
pub trait AssetSource: Send + Sync {
    fn read_bytes(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    fn size_of(&self, path: &Path) -> impl Future<Output = io::Result<u64>> + Send;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsAssetSource;

impl AssetSource for FsAssetSource {
    async fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        async_fs::read(path).await
    }

    async fn size_of(&self, path: &Path) -> io::Result<u64> {
        Ok(async_fs::metadata(path).await?.len())
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") | Some("tgz") => "application/gzip",
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("txt") | Some("md") | Some("sha256") | Some("sha512") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("dist/app.tar.gz")), "application/gzip");
        assert_eq!(content_type_for(Path::new("app.zip")), "application/zip");
        assert_eq!(content_type_for(Path::new("README.md")), "text/plain");
        assert_eq!(content_type_for(Path::new("app.zip.sha512")), "text/plain");
        assert_eq!(
            content_type_for(Path::new("bin/readysteady")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn fs_source_reads_bytes_and_size() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello")?;

        let source = FsAssetSource;
        assert_eq!(source.read_bytes(&path).await?, b"hello");
        assert_eq!(source.size_of(&path).await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn fs_source_reports_missing_file() {
        let err = FsAssetSource
            .read_bytes(Path::new("does/not/exist.bin"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
