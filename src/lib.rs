pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod expand_state;
pub mod folder;
pub mod i18n;
pub mod logging;
pub mod organizer;
pub mod render_tree;
pub mod tree;

#[cfg(test)]
mod testing;

pub use api::{FolderApi, HttpFolderApi};
pub use error::{FolderError, Result};
pub use folder::{FolderId, FolderNode};
pub use organizer::FolderOrganizer;
pub use tree::FolderTree;
