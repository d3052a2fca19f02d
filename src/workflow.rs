use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::client::{AssetSource, AssetUpload, ReleaseClient, content_type_for};
use crate::error::{ApiError, Error, Result};
use crate::release::{Release, release_name_for_tag};

const PAGE_SIZE: u8 = 100;

#[derive(Debug, Clone)]
pub struct WorkflowParameters {
    pub owner: String,
    pub repo: String,
    pub tag: String,
    pub force: bool,
    pub files: Vec<PathBuf>,
    /// Only a 404 counts as "tag available"; other lookup failures abort.
    pub strict_tag_check: bool,
}

/// Return true unless a release already exists for `tag`.
///
/// Any lookup failure counts as available, not only a 404.
pub async fn is_tag_available<C: ReleaseClient>(
    client: &C,
    owner: &str,
    repo: &str,
    tag: &str,
) -> bool {
    match check_tag_availability(client, owner, repo, tag).await {
        Ok(available) => available,
        Err(err) => {
            tracing::warn!(tag, error = %err, "tag lookup failed; treating tag as available");
            true
        }
    }
}

/// Like [`is_tag_available`], but only a 404 means available.
pub async fn check_tag_availability<C: ReleaseClient>(
    client: &C,
    owner: &str,
    repo: &str,
    tag: &str,
) -> std::result::Result<bool, ApiError> {
    match client.get_release_by_tag(owner, repo, tag).await {
        Ok(release) => {
            tracing::debug!(tag, id = release.id, "tag already has a release");
            Ok(false)
        }
        Err(err) if err.is_not_found() => Ok(true),
        Err(err) => Err(err),
    }
}

/// First draft release named `name`, walking the release list in API order.
pub async fn find_existing_draft_release<C: ReleaseClient>(
    client: &C,
    owner: &str,
    repo: &str,
    name: &str,
) -> Result<Option<Release>> {
    let mut page = 1;
    loop {
        let releases = client.list_releases(owner, repo, page, PAGE_SIZE).await?;
        let last_page = releases.len() < usize::from(PAGE_SIZE);
        if let Some(found) = releases.into_iter().find(|r| r.draft && r.is_named(name)) {
            tracing::debug!(name, id = found.id, page, "found existing draft release");
            return Ok(Some(found));
        }
        if last_page {
            return Ok(None);
        }
        page += 1;
    }
}

pub async fn delete_draft_release<C: ReleaseClient>(
    client: &C,
    owner: &str,
    repo: &str,
    release: &Release,
) -> Result<()> {
    release.ensure_draft()?;
    client.delete_release(owner, repo, release.id).await?;
    tracing::debug!(id = release.id, "deleted draft release");
    Ok(())
}

/// Create a draft, non-prerelease release. Failures propagate to the caller.
pub async fn create_draft_release<C: ReleaseClient>(
    client: &C,
    owner: &str,
    repo: &str,
    tag: &str,
    name: &str,
) -> Result<Release> {
    let release = client
        .create_release(owner, repo, tag, name, true, false)
        .await?;
    Ok(release)
}

/// Upload `files` as assets of a draft release.
///
/// Files are read in order and each upload is spawned as soon as its bytes
/// are ready. Every upload runs to completion; the first failure observed is
/// returned.
pub async fn upload_assets_to_release<C, S>(
    client: &Arc<C>,
    source: &S,
    owner: &str,
    repo: &str,
    release: &Release,
    files: &[PathBuf],
) -> Result<()>
where
    C: ReleaseClient + 'static,
    S: AssetSource,
{
    release.ensure_draft()?;
    if files.is_empty() {
        return Ok(());
    }
    tracing::info!("github: uploading {} assets", files.len());

    let mut uploads = JoinSet::new();
    for path in files {
        let upload = read_asset(source, path).await?;
        let client = Arc::clone(client);
        let owner = owner.to_string();
        let repo = repo.to_string();
        let release_id = release.id;
        let upload_url = release.upload_base().to_string();
        uploads.spawn(async move {
            let name = upload.name.clone();
            client
                .upload_release_asset(&owner, &repo, release_id, &upload_url, upload)
                .await
                .map_err(|source| Error::Upload { name, source })
        });
    }

    let mut first_failure = None;
    while let Some(joined) = uploads.join_next().await {
        if let Err(err) = joined.map_err(Error::from).and_then(|settled| settled) {
            tracing::warn!(error = %err, "asset upload failed");
            first_failure.get_or_insert(err);
        }
    }
    first_failure.map_or(Ok(()), Err)
}

async fn read_asset<S: AssetSource>(source: &S, path: &Path) -> Result<AssetUpload> {
    let read_err = |source: io::Error| Error::ReadAsset {
        path: path.to_path_buf(),
        source,
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| read_err(io::Error::new(io::ErrorKind::InvalidInput, "no file name")))?
        .to_string();
    let data = source.read_bytes(path).await.map_err(read_err)?;
    let content_length = source.size_of(path).await.map_err(read_err)?;
    Ok(AssetUpload {
        name,
        content_type: content_type_for(path),
        data,
        content_length,
    })
}

/// Check the tag, replace or refuse an existing draft, create the new draft
/// and attach the files.
///
/// Nothing is rolled back on failure: a draft created before a failed upload
/// stays in place.
pub async fn perform_release_workflow<C, S>(
    client: &Arc<C>,
    source: &S,
    params: &WorkflowParameters,
) -> Result<Release>
where
    C: ReleaseClient + 'static,
    S: AssetSource,
{
    let WorkflowParameters {
        owner, repo, tag, ..
    } = params;
    let name = release_name_for_tag(tag)?;

    tracing::info!("Checking that tag is available: {}", tag);
    let available = if params.strict_tag_check {
        check_tag_availability(client.as_ref(), owner, repo, tag).await?
    } else {
        is_tag_available(client.as_ref(), owner, repo, tag).await
    };
    if !available {
        return Err(Error::TagUnavailable { tag: tag.clone() });
    }
    tracing::info!("Tag is available for a draft release: {}", tag);

    tracing::info!("Checking if draft release is available: {}", name);
    if let Some(existing) = find_existing_draft_release(client.as_ref(), owner, repo, &name).await? {
        tracing::info!("A draft release already exists: {}", name);
        if !params.force {
            return Err(Error::DraftConflict { name });
        }
        tracing::info!("--force flag detected, deleting the existing draft release");
        delete_draft_release(client.as_ref(), owner, repo, &existing).await?;
        tracing::info!("Existing draft release deleted");
    }

    tracing::info!("Creating a new draft release: {}", name);
    let release = create_draft_release(client.as_ref(), owner, repo, tag, &name).await?;
    tracing::info!("A new draft release was created: {}", name);

    if params.files.is_empty() {
        return Ok(release);
    }

    tracing::info!("Uploading files to the draft release");
    upload_assets_to_release(client, source, owner, repo, &release, &params.files).await?;
    tracing::info!("Files uploaded to draft release");

    Ok(client.get_release(owner, repo, release.id).await?)
}
