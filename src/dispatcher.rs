use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{visible_folders, FolderApi};
use crate::error::{FolderError, Result};
use crate::folder::{
    validate_folder_name, CreateFolderRequest, FolderId, FolderNode, UpdateFolderRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Rename,
    Delete,
}

/// A user's request to change the folder list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create {
        parent_id: Option<FolderId>,
        name: String,
        color: Option<String>,
        icon: Option<String>,
    },
    Rename {
        id: FolderId,
        name: String,
    },
    Delete {
        id: FolderId,
    },
}

impl Intent {
    pub fn kind(&self) -> MutationKind {
        match self {
            Intent::Create { .. } => MutationKind::Create,
            Intent::Rename { .. } => MutationKind::Rename,
            Intent::Delete { .. } => MutationKind::Delete,
        }
    }

    /// The folder this intent touches. Creates are keyed by their parent,
    /// with `None` standing for the root level.
    pub fn target(&self) -> Option<FolderId> {
        match self {
            Intent::Create { parent_id, .. } => *parent_id,
            Intent::Rename { id, .. } | Intent::Delete { id } => Some(*id),
        }
    }

    fn normalized(self) -> Result<Self> {
        Ok(match self {
            Intent::Create {
                parent_id,
                name,
                color,
                icon,
            } => Intent::Create {
                parent_id,
                name: validate_folder_name(&name)?,
                color,
                icon,
            },
            Intent::Rename { id, name } => Intent::Rename {
                id,
                name: validate_folder_name(&name)?,
            },
            Intent::Delete { id } => Intent::Delete { id },
        })
    }
}

#[derive(Debug)]
pub enum DispatchEvent {
    Loaded {
        generation: u64,
        result: Result<Vec<FolderNode>>,
    },
    /// `ticket` is the value `dispatch` returned for this mutation.
    Mutated {
        ticket: u64,
        intent: Intent,
        result: Result<()>,
    },
}

/// Runs backend calls on worker threads and reports back over a channel.
///
/// Every successful mutation is followed by a full reload from the same
/// worker; callers never patch their folder list from a mutation response.
pub struct MutationDispatcher {
    api: Arc<dyn FolderApi>,
    tx: Sender<DispatchEvent>,
    rx: Receiver<DispatchEvent>,
    generation: Arc<AtomicU64>,
    tickets: AtomicU64,
    in_flight: Arc<DashMap<Option<FolderId>, MutationKind>>,
}

impl MutationDispatcher {
    pub fn new(api: Arc<dyn FolderApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            tx,
            rx,
            generation: Arc::new(AtomicU64::new(0)),
            tickets: AtomicU64::new(0),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Generation of the most recently issued list request.
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_in_flight(&self, target: Option<FolderId>) -> bool {
        self.in_flight.contains_key(&target)
    }

    /// Fetch the flat list in the background. Returns the request's generation.
    pub fn reload(&self) -> u64 {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = next_generation(&self.generation);
        thread::spawn(move || {
            run_reload(api.as_ref(), &tx, generation);
        });
        generation
    }

    /// Validate and submit a mutation, returning the ticket its
    /// `Mutated` event will carry.
    ///
    /// Fails without touching the network when the name is invalid or the
    /// target folder already has a mutation in flight.
    pub fn dispatch(&self, intent: Intent) -> Result<u64> {
        let intent = intent.normalized()?;
        let target = intent.target();

        match self.in_flight.entry(target) {
            Entry::Occupied(existing) => {
                warn!(?target, pending = ?existing.get(), "mutation rejected, folder busy");
                return Err(FolderError::Busy { id: target });
            }
            Entry::Vacant(slot) => {
                slot.insert(intent.kind());
            }
        }

        let ticket = next_generation(&self.tickets);
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let generation = Arc::clone(&self.generation);
        debug!(ticket, ?intent, "dispatching mutation");

        thread::spawn(move || {
            let result = execute(api.as_ref(), &intent);
            in_flight.remove(&target);

            let succeeded = result.is_ok();
            match &result {
                Ok(()) => info!(kind = ?intent.kind(), ?target, "mutation succeeded"),
                Err(err) => warn!(kind = ?intent.kind(), ?target, error = %err, "mutation failed"),
            }
            let _ = tx.send(DispatchEvent::Mutated {
                ticket,
                intent,
                result,
            });

            if succeeded {
                run_reload(api.as_ref(), &tx, next_generation(&generation));
            }
        });

        Ok(ticket)
    }

    pub fn try_next(&self) -> Option<DispatchEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<DispatchEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn next_generation(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

fn run_reload(api: &dyn FolderApi, tx: &Sender<DispatchEvent>, generation: u64) {
    let result = api.list_folders().map(visible_folders);
    if let Err(err) = &result {
        warn!(generation, error = %err, "folder reload failed");
    }
    let _ = tx.send(DispatchEvent::Loaded { generation, result });
}

fn execute(api: &dyn FolderApi, intent: &Intent) -> Result<()> {
    match intent {
        Intent::Create {
            parent_id,
            name,
            color,
            icon,
        } => {
            let request = CreateFolderRequest {
                name: name.clone(),
                parent_id: *parent_id,
                color: color.clone(),
                icon: icon.clone(),
            };
            api.create_folder(&request).map(|_| ())
        }
        Intent::Rename { id, name } => {
            let request = UpdateFolderRequest {
                name: name.clone(),
                color: None,
                icon: None,
            };
            api.update_folder(*id, &request).map(|_| ())
        }
        Intent::Delete { id } => api.delete_folder(*id),
    }
}
