use thiserror::Error;

use crate::folder::FolderId;

#[derive(Error, Debug)]
pub enum FolderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid folder: {0}")]
    Validation(String),

    #[error("A change to folder {id:?} is already pending")]
    Busy { id: Option<FolderId> },

    #[error("Folder {id} not found")]
    NotFound { id: FolderId },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FolderError {
    /// True for failures the user can fix by editing the form and resubmitting.
    pub fn is_validation(&self) -> bool {
        matches!(self, FolderError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, FolderError>;
