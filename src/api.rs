//! Client for the backend's recording-folder endpoints.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{FolderError, Result};
use crate::folder::{CreateFolderRequest, FolderId, FolderNode, UpdateFolderRequest};

pub const FOLDERS_PATH: &str = "/api/recordings/folders";

/// The backend operations the organizer needs.
///
/// Calls block; the dispatcher runs them on worker threads.
pub trait FolderApi: Send + Sync {
    fn list_folders(&self) -> Result<Vec<FolderNode>>;
    fn create_folder(&self, request: &CreateFolderRequest) -> Result<FolderNode>;
    fn update_folder(&self, id: FolderId, request: &UpdateFolderRequest) -> Result<FolderNode>;
    /// The backend moves contained recordings to the deleted folder's parent.
    fn delete_folder(&self, id: FolderId) -> Result<()>;
}

/// The list endpoint answers with either a bare array or a `data` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<FolderNode>),
    Envelope { data: Vec<FolderNode> },
}

impl ListResponse {
    fn into_folders(self) -> Vec<FolderNode> {
        match self {
            ListResponse::Bare(folders) => folders,
            ListResponse::Envelope { data } => data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFolderApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpFolderApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, FOLDERS_PATH)
    }

    pub fn folder_url(&self, id: FolderId) -> String {
        format!("{}{}/{}", self.base_url, FOLDERS_PATH, id)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authorized(builder).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        warn!(status = status.as_u16(), "folder request rejected");
        Err(FolderError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes()?;
    serde_json::from_slice(&bytes).map_err(|e| FolderError::InvalidResponse(e.to_string()))
}

impl FolderApi for HttpFolderApi {
    fn list_folders(&self) -> Result<Vec<FolderNode>> {
        let url = self.collection_url();
        debug!(%url, "listing folders");
        let response = self.send(self.client.get(&url))?;
        let folders = decode::<ListResponse>(response)?.into_folders();
        debug!(count = folders.len(), "folders listed");
        Ok(folders)
    }

    fn create_folder(&self, request: &CreateFolderRequest) -> Result<FolderNode> {
        let url = self.collection_url();
        let response = self.send(self.client.post(&url).json(request))?;
        let folder: FolderNode = decode(response)?;
        info!(id = folder.id, name = %folder.name, "folder created");
        Ok(folder)
    }

    fn update_folder(&self, id: FolderId, request: &UpdateFolderRequest) -> Result<FolderNode> {
        let url = self.folder_url(id);
        let response = self.send(self.client.put(&url).json(request))?;
        let folder: FolderNode = decode(response)?;
        info!(id, name = %folder.name, "folder updated");
        Ok(folder)
    }

    fn delete_folder(&self, id: FolderId) -> Result<()> {
        let url = self.folder_url(id);
        self.send(self.client.delete(&url))?;
        info!(id, "folder deleted");
        Ok(())
    }
}

/// Records with the soft-delete flag set never reach the tree.
pub fn visible_folders(folders: Vec<FolderNode>) -> Vec<FolderNode> {
    folders.into_iter().filter(|f| !f.is_deleted).collect()
}
