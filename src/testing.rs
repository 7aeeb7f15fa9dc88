//! In-memory stand-in for the folder backend, used by unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use crate::api::FolderApi;
use crate::error::{FolderError, Result};
use crate::folder::{CreateFolderRequest, FolderId, FolderNode, UpdateFolderRequest};

#[derive(Default)]
pub struct FakeFolderApi {
    folders: Mutex<Vec<FolderNode>>,
    calls: Mutex<Vec<String>>,
    fail_mutations: AtomicBool,
    fail_list: AtomicBool,
    mutation_gate: Mutex<Option<Receiver<()>>>,
    list_gate: Mutex<Option<Receiver<()>>>,
}

impl FakeFolderApi {
    pub fn with_folders(folders: Vec<FolderNode>) -> Self {
        Self {
            folders: Mutex::new(folders),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Block every mutation until a unit is sent on the returned channel.
    pub fn hold_mutations(&self) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.mutation_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Block every list call until a unit is sent on the returned channel.
    pub fn hold_lists(&self) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.list_gate.lock().unwrap() = Some(rx);
        tx
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn wait(gate: &Mutex<Option<Receiver<()>>>) {
        let guard = gate.lock().unwrap();
        if let Some(rx) = guard.as_ref() {
            let _ = rx.recv();
        }
    }

    fn check_mutation(&self) -> Result<()> {
        Self::wait(&self.mutation_gate);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(FolderError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

impl FolderApi for FakeFolderApi {
    fn list_folders(&self) -> Result<Vec<FolderNode>> {
        self.record("list".to_string());
        Self::wait(&self.list_gate);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(FolderError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.folders.lock().unwrap().clone())
    }

    fn create_folder(&self, request: &CreateFolderRequest) -> Result<FolderNode> {
        self.record(format!("create {}", request.name));
        self.check_mutation()?;
        let mut folders = self.folders.lock().unwrap();
        let id = folders.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let mut folder = FolderNode::new(id, request.name.clone(), request.parent_id);
        folder.color = request.color.clone();
        folder.icon = request.icon.clone();
        folders.push(folder.clone());
        Ok(folder)
    }

    fn update_folder(&self, id: FolderId, request: &UpdateFolderRequest) -> Result<FolderNode> {
        self.record(format!("update {}", id));
        self.check_mutation()?;
        let mut folders = self.folders.lock().unwrap();
        let folder = folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(FolderError::NotFound { id })?;
        folder.name = request.name.clone();
        Ok(folder.clone())
    }

    fn delete_folder(&self, id: FolderId) -> Result<()> {
        self.record(format!("delete {}", id));
        self.check_mutation()?;
        let mut folders = self.folders.lock().unwrap();
        let pos = folders
            .iter()
            .position(|f| f.id == id)
            .ok_or(FolderError::NotFound { id })?;
        let removed = folders.remove(pos);
        for folder in folders.iter_mut().filter(|f| f.parent_id == Some(id)) {
            folder.parent_id = removed.parent_id;
        }
        Ok(())
    }
}
