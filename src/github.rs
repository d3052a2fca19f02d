use anyhow::{Context, anyhow};
use octocrab::Octocrab;
use reqwest::StatusCode;
use reqwest::header;
use urlencoding::encode as url_encode;

use crate::client::{AssetUpload, ReleaseClient};
use crate::error::ApiError;
use crate::release::Release;

pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Fetch the GitHub token from the named environment variable.
pub fn token(var: &str) -> anyhow::Result<String> {
    match std::env::var(var) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(anyhow!("{} environment variable not detected", var)),
    }
}

/// Release client backed by octocrab, with raw reqwest calls for asset uploads.
pub struct GitHubReleases {
    gh: Octocrab,
    http: reqwest::Client,
    token: String,
}

impl GitHubReleases {
    pub fn new(token: String, api_url: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.clone());
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .with_context(|| format!("invalid GitHub API url: {}", url))?;
        }
        let gh = builder.build().context("failed to build GitHub client")?;
        Ok(Self {
            gh,
            http: reqwest::Client::new(),
            token,
        })
    }
}

fn release_route(owner: &str, repo: &str, id: u64) -> String {
    format!("/repos/{}/{}/releases/{}", owner, repo, id)
}

impl ReleaseClient for GitHubReleases {
    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, ApiError> {
        let release = self
            .gh
            .repos(owner, repo)
            .releases()
            .get_by_tag(tag)
            .await
            .map_err(api_error)?;
        Ok(release.into())
    }

    async fn get_release(&self, owner: &str, repo: &str, id: u64) -> Result<Release, ApiError> {
        let release: octocrab::models::repos::Release = self
            .gh
            .get(release_route(owner, repo, id), None::<&()>)
            .await
            .map_err(api_error)?;
        Ok(release.into())
    }

    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Release>, ApiError> {
        let page = self
            .gh
            .repos(owner, repo)
            .releases()
            .list()
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .map_err(api_error)?;
        Ok(page.items.into_iter().map(Release::from).collect())
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: &str,
        draft: bool,
        prerelease: bool,
    ) -> Result<Release, ApiError> {
        let release = self
            .gh
            .repos(owner, repo)
            .releases()
            .create(tag)
            .name(name)
            .draft(draft)
            .prerelease(prerelease)
            .send()
            .await
            .map_err(api_error)?;
        Ok(release.into())
    }

    async fn delete_release(&self, owner: &str, repo: &str, id: u64) -> Result<(), ApiError> {
        let response = self
            .gh
            ._delete(release_route(owner, repo, id), None::<&()>)
            .await
            .map_err(api_error)?;
        octocrab::map_github_error(response)
            .await
            .map(drop)
            .map_err(api_error)
    }

    async fn upload_release_asset(
        &self,
        _owner: &str,
        _repo: &str,
        release_id: u64,
        upload_url: &str,
        upload: AssetUpload,
    ) -> Result<(), ApiError> {
        let url = format!("{}?name={}", upload_url, url_encode(&upload.name));
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::CONTENT_TYPE, upload.content_type)
            .header(header::CONTENT_LENGTH, upload.content_length)
            .body(upload.data)
            .send()
            .await
            .map_err(|err| ApiError::Other(err.into()))?;
        match resp.status() {
            status if status.is_success() => {
                tracing::debug!(release_id, "uploaded asset {}", upload.name);
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status => Err(ApiError::Other(anyhow!(
                "upload of {} returned {}",
                upload.name,
                status
            ))),
        }
    }
}

fn api_error(err: octocrab::Error) -> ApiError {
    if is_not_found(&err) {
        ApiError::NotFound
    } else {
        ApiError::Other(err.into())
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    if let octocrab::Error::GitHub { source, .. } = err {
        return source.status_code == StatusCode::NOT_FOUND;
    }
    false
}
