use crate::error::{Error, Result};

/// A GitHub release as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    pub assets: Vec<ReleaseAsset>,
    pub html_url: String,
    /// Hypermedia upload template, e.g. `.../assets{?name,label}`.
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub size: u64,
}

impl Release {
    pub fn ensure_draft(&self) -> Result<()> {
        if !self.draft {
            return Err(Error::NotADraft { id: self.id });
        }
        Ok(())
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Asset upload endpoint with the `{?name,label}` template removed.
    pub fn upload_base(&self) -> &str {
        self.upload_url
            .split('{')
            .next()
            .unwrap_or(&self.upload_url)
    }

    /// Page where the release can be edited in the browser.
    pub fn edit_url(&self) -> String {
        self.html_url.replacen("/tag/", "/edit/", 1)
    }
}

impl From<octocrab::models::repos::Release> for Release {
    fn from(release: octocrab::models::repos::Release) -> Self {
        let assets = release
            .assets
            .iter()
            .map(|asset| ReleaseAsset {
                name: asset.name.clone(),
                size: asset.size as u64,
            })
            .collect();
        Release {
            id: release.id.into_inner(),
            tag_name: release.tag_name,
            name: release.name,
            draft: release.draft,
            prerelease: release.prerelease,
            assets,
            html_url: release.html_url.to_string(),
            upload_url: release.upload_url,
        }
    }
}

/// Drop the version prefix from a tag: `v3.1.1` becomes `3.1.1`.
pub fn release_name_for_tag(tag: &str) -> Result<String> {
    let mut chars = tag.chars();
    chars.next();
    let name = chars.as_str();
    if name.is_empty() {
        return Err(Error::InvalidTag {
            tag: tag.to_string(),
        });
    }
    Ok(name.to_string())
}
