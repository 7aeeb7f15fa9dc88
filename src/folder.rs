use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{FolderError, Result};

pub type FolderId = i64;

/// Longest folder name accepted before a request is sent.
pub const MAX_NAME_LEN: usize = 255;

/// A recording folder as stored by the backend.
///
/// Nesting is never part of this record: the tree is derived from `parent_id`
/// at build time and lives only in [`crate::tree::FolderTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub recording_count: Option<u32>,
}

impl FolderNode {
    pub fn new(id: FolderId, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            sort_order: 0,
            created_by: None,
            created_at: None,
            is_deleted: false,
            color: None,
            icon: None,
            recording_count: None,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_recording_count(mut self, count: u32) -> Self {
        self.recording_count = Some(count);
        self
    }
}

/// Primary collation key: accents stripped and case folded, so "Ábaco"
/// sorts next to "abaco" rather than after "Zeta".
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sibling order: `sort_order`, then collated name, then raw name, then id.
pub fn sibling_order(a: &FolderNode, b: &FolderNode) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| collation_key(&a.name).cmp(&collation_key(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FolderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Trim and check a user-entered folder name.
pub fn validate_folder_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FolderError::Validation("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(FolderError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}
