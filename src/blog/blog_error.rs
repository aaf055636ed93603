use thiserror::Error;

use crate::database::StoreError;

/// Outcomes of the blog lifecycle operations that are not a success.
#[derive(Debug, Error)]
pub enum BlogError {
    /// No record matched. Also returned when the record exists but belongs to someone else.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub const PUBLISHED_NOT_FOUND: &str = "Published blog not found.";
pub const OWNED_NOT_FOUND: &str = "Blog not found or you are not the owner.";
pub const DUPLICATE_TITLE: &str = "A blog with this title already exists.";
pub const PUBLISH_ONLY: &str = "Invalid state provided. Can only update to \"published\".";

impl BlogError {
    pub fn published_not_found() -> Self {
        BlogError::NotFound(PUBLISHED_NOT_FOUND.to_string())
    }

    pub fn owned_not_found() -> Self {
        BlogError::NotFound(OWNED_NOT_FOUND.to_string())
    }

    /// Maps a unique-index violation onto `Conflict`; every other store error passes through.
    pub fn from_write(err: StoreError) -> Self {
        if err.is_duplicate_key() {
            BlogError::Conflict(DUPLICATE_TITLE.to_string())
        } else {
            BlogError::Store(err)
        }
    }
}
