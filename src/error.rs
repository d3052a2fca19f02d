use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by the release client capability.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("tag is not available and has already been used: {tag}")]
    TagUnavailable { tag: String },

    #[error(
        "an existing draft release was found: {name}. Use --force to delete and replace with a new draft release"
    )]
    DraftConflict { name: String },

    #[error("release is not a draft (id={id})")]
    NotADraft { id: u64 },

    #[error("cannot derive a release name from tag {tag:?}")]
    InvalidTag { tag: String },

    #[error("failed to read asset {}", path.display())]
    ReadAsset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload asset failed for {name}")]
    Upload {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("GitHub API request failed")]
    Api(#[from] ApiError),

    #[error("upload task did not complete")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
