use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::api::FolderApi;
use crate::config::Locale;
use crate::dispatcher::{DispatchEvent, Intent, MutationDispatcher, MutationKind};
use crate::error::{FolderError, Result};
use crate::expand_state::ExpansionState;
use crate::folder::{FolderId, FolderNode};
use crate::i18n::Messages;
use crate::render_tree::{build_render_view, row_index_of, RenderView, Selection};
use crate::tree::FolderTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Create { parent_id: Option<FolderId> },
    Rename { id: FolderId },
}

/// An open create or rename form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderForm {
    pub kind: FormKind,
    pub input: String,
    /// Dispatcher ticket of the request in flight. Cleared again on failure
    /// so the user can fix the name and retry.
    ticket: Option<u64>,
}

impl FolderForm {
    fn new(kind: FormKind, input: String) -> Self {
        Self {
            kind,
            input,
            ticket: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.ticket.is_some()
    }

    /// Only the submission this form made can close it; a result for a
    /// cancelled form with the same target is ignored.
    fn owns(&self, ticket: u64) -> bool {
        self.ticket == Some(ticket)
    }
}

/// A delete waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: FolderId,
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

/// Owns the flat folder list and everything derived from it.
///
/// The tree is rebuilt from `folders` after every load and is never edited
/// directly. Mutations go through the dispatcher, which reloads on success.
pub struct FolderOrganizer {
    dispatcher: MutationDispatcher,
    messages: &'static Messages,
    folders: Vec<FolderNode>,
    tree: FolderTree,
    expansion: ExpansionState,
    selection: Selection,
    cursor: Option<FolderId>,
    form: Option<FolderForm>,
    pending_delete: Option<PendingDelete>,
    notifications: Vec<Notification>,
    applied_generation: u64,
}

impl FolderOrganizer {
    pub fn new(api: Arc<dyn FolderApi>, locale: Locale) -> Self {
        Self {
            dispatcher: MutationDispatcher::new(api),
            messages: Messages::for_locale(locale),
            folders: Vec::new(),
            tree: FolderTree::default(),
            expansion: ExpansionState::default(),
            selection: Selection::default(),
            cursor: None,
            form: None,
            pending_delete: None,
            notifications: Vec::new(),
            applied_generation: 0,
        }
    }

    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    pub fn folders(&self) -> &[FolderNode] {
        &self.folders
    }

    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn cursor(&self) -> Option<FolderId> {
        self.cursor
    }

    pub fn form(&self) -> Option<&FolderForm> {
        self.form.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub fn is_loading(&self) -> bool {
        self.applied_generation < self.dispatcher.latest_generation()
    }

    pub fn view(&self) -> RenderView {
        build_render_view(&self.tree, &self.expansion, &self.selection)
    }

    pub fn reload(&mut self) {
        let generation = self.dispatcher.reload();
        debug!(generation, "folder reload requested");
    }

    /// Apply every event that has arrived so far without blocking.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.dispatcher.try_next() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Block up to `timeout` for one event, then drain anything else queued.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        match self.dispatcher.next_timeout(timeout) {
            Some(event) => {
                self.apply(event);
                1 + self.poll()
            }
            None => 0,
        }
    }

    fn apply(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Loaded { generation, result } => self.apply_loaded(generation, result),
            DispatchEvent::Mutated {
                ticket,
                intent,
                result,
            } => self.apply_mutated(ticket, intent, result),
        }
    }

    fn apply_loaded(&mut self, generation: u64, result: Result<Vec<FolderNode>>) {
        if generation <= self.applied_generation {
            debug!(generation, applied = self.applied_generation, "ignoring stale folder list");
            return;
        }
        self.applied_generation = generation;

        match result {
            Ok(folders) => self.replace_folders(folders),
            Err(err) => {
                let message = format!("{}: {}", self.messages.load_failed, err);
                self.notify(NotificationKind::Error, message);
            }
        }
    }

    fn replace_folders(&mut self, folders: Vec<FolderNode>) {
        self.folders = folders;
        self.tree = FolderTree::build(&self.folders);
        self.expansion.retain_known(&self.tree);
        self.selection.retain_known(&self.tree);

        let cursor_valid = self.cursor.map(|id| self.tree.contains(id)).unwrap_or(false);
        if !cursor_valid {
            self.cursor = self.view().rows().first().map(|row| row.id);
        }
        debug!(count = self.folders.len(), "folder tree rebuilt");
    }

    fn apply_mutated(&mut self, ticket: u64, intent: Intent, result: Result<()>) {
        let form_matches = self.form.as_ref().map(|f| f.owns(ticket)).unwrap_or(false);

        match result {
            Ok(()) => {
                let message = match intent.kind() {
                    MutationKind::Create => self.messages.folder_created,
                    MutationKind::Rename => self.messages.folder_renamed,
                    MutationKind::Delete => self.messages.folder_deleted,
                };
                self.notify(NotificationKind::Success, message.to_string());
                if form_matches {
                    self.form = None;
                }
            }
            Err(err) => {
                let message = format!("{}: {}", self.failure_message(intent.kind()), err);
                self.notify(NotificationKind::Error, message);
                if form_matches {
                    if let Some(form) = self.form.as_mut() {
                        form.ticket = None;
                    }
                }
            }
        }
    }

    fn failure_message(&self, kind: MutationKind) -> &'static str {
        match kind {
            MutationKind::Create => self.messages.create_failed,
            MutationKind::Rename => self.messages.rename_failed,
            MutationKind::Delete => self.messages.delete_failed,
        }
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        info!(?kind, %message, "notification");
        self.notifications.push(Notification {
            kind,
            message,
            created_at: Instant::now(),
        });
    }

    fn notify_dispatch_error(&mut self, kind: MutationKind, err: &FolderError) {
        let message = match err {
            FolderError::Busy { .. } => self.messages.busy.to_string(),
            other => format!("{}: {}", self.failure_message(kind), other),
        };
        self.notify(NotificationKind::Error, message);
    }

    pub fn expire_notifications(&mut self, ttl: Duration) {
        self.notifications.retain(|n| n.created_at.elapsed() < ttl);
    }

    // --- navigation ---

    /// Set the folder filter; `None` shows all recordings. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<FolderId>) {
        if let Some(id) = id {
            if !self.tree.contains(id) {
                return;
            }
        }
        self.selection.set(id);
    }

    pub fn select_cursor(&mut self) {
        self.select(self.cursor);
    }

    pub fn toggle(&mut self, id: FolderId) {
        self.expansion.toggle(&self.tree, id);
        self.reveal_cursor();
    }

    pub fn toggle_cursor(&mut self) {
        if let Some(id) = self.cursor {
            self.toggle(id);
        }
    }

    pub fn expand(&mut self, id: FolderId) {
        if self.tree.has_children(id) {
            self.expansion.expand(id);
        }
    }

    pub fn collapse(&mut self, id: FolderId) {
        if self.tree.has_children(id) {
            self.expansion.collapse(id);
            self.reveal_cursor();
        }
    }

    /// Right arrow: open the folder under the cursor.
    pub fn expand_cursor(&mut self) {
        if let Some(id) = self.cursor {
            self.expand(id);
        }
    }

    /// Left arrow: close the folder under the cursor, or jump to its parent
    /// when it is already closed or has no children.
    pub fn collapse_cursor(&mut self) {
        let Some(id) = self.cursor else {
            return;
        };
        if self.expansion.is_expanded(&self.tree, id) {
            self.collapse(id);
        } else if let Some(parent) = self.tree.parent_id(id) {
            self.cursor = Some(parent);
        }
    }

    pub fn expand_all(&mut self) {
        self.expansion.expand_all();
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all(&self.tree);
        self.reveal_cursor();
    }

    /// Move a cursor hidden under a collapsed folder onto the outermost
    /// collapsed ancestor, which is always visible.
    fn reveal_cursor(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let hidden_under = self
            .tree
            .ancestors(cursor)
            .into_iter()
            .filter(|id| !self.expansion.is_expanded(&self.tree, *id))
            .last();
        if let Some(id) = hidden_under {
            self.cursor = Some(id);
        }
    }

    pub fn move_cursor_to(&mut self, id: FolderId) {
        if self.tree.contains(id) {
            self.cursor = Some(id);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let view = self.view();
        let rows = view.rows();
        if rows.is_empty() {
            self.cursor = None;
            return;
        }
        let current = self.cursor.and_then(|id| row_index_of(rows, id));
        let next = match current {
            Some(index) => (index as isize + delta).clamp(0, rows.len() as isize - 1) as usize,
            None => 0,
        };
        self.cursor = Some(rows[next].id);
    }

    // --- create / rename ---

    pub fn begin_create(&mut self, parent_id: Option<FolderId>) -> bool {
        if let Some(parent) = parent_id {
            if !self.tree.contains(parent) {
                return false;
            }
        }
        self.pending_delete = None;
        self.form = Some(FolderForm::new(FormKind::Create { parent_id }, String::new()));
        true
    }

    pub fn begin_rename(&mut self, id: FolderId) -> bool {
        let Some(folder) = self.tree.get(id) else {
            return false;
        };
        let input = folder.name.clone();
        self.pending_delete = None;
        self.form = Some(FolderForm::new(FormKind::Rename { id }, input));
        true
    }

    /// Editable form text, unavailable while the form is being submitted.
    pub fn form_input_mut(&mut self) -> Option<&mut String> {
        self.form
            .as_mut()
            .filter(|f| !f.is_submitting())
            .map(|f| &mut f.input)
    }

    /// Send the open form. The form stays open until the backend answers.
    pub fn submit_form(&mut self) -> Result<()> {
        let Some(form) = self.form.as_ref() else {
            return Ok(());
        };
        if form.is_submitting() {
            return Ok(());
        }

        let intent = match &form.kind {
            FormKind::Create { parent_id } => Intent::Create {
                parent_id: *parent_id,
                name: form.input.clone(),
                color: None,
                icon: None,
            },
            FormKind::Rename { id } => Intent::Rename {
                id: *id,
                name: form.input.clone(),
            },
        };
        let kind = intent.kind();

        match self.dispatcher.dispatch(intent) {
            Ok(ticket) => {
                if let Some(form) = self.form.as_mut() {
                    form.ticket = Some(ticket);
                }
                Ok(())
            }
            Err(err) => {
                self.notify_dispatch_error(kind, &err);
                Err(err)
            }
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    // --- delete ---

    /// Ask for confirmation before deleting. Nothing is sent yet.
    pub fn request_delete(&mut self, id: FolderId) -> bool {
        let Some(folder) = self.tree.get(id) else {
            return false;
        };
        let name = folder.name.clone();
        self.form = None;
        self.pending_delete = Some(PendingDelete {
            id,
            prompt: self.messages.delete_confirmation(&name),
            name,
        });
        true
    }

    pub fn confirm_delete(&mut self) -> Result<()> {
        let Some(pending) = self.pending_delete.take() else {
            return Ok(());
        };
        match self.dispatcher.dispatch(Intent::Delete { id: pending.id }) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.notify_dispatch_error(MutationKind::Delete, &err);
                Err(err)
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        if let Some(pending) = self.pending_delete.take() {
            debug!(id = pending.id, "delete cancelled");
            self.notify(NotificationKind::Info, self.messages.delete_cancelled.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFolderApi;

    const WAIT: Duration = Duration::from_secs(5);

    fn sample_folders() -> Vec<FolderNode> {
        vec![
            FolderNode::new(1, "Calls", None),
            FolderNode::new(2, "Inbound", Some(1)),
            FolderNode::new(3, "Chats", None),
        ]
    }

    fn loaded(api: &Arc<FakeFolderApi>) -> FolderOrganizer {
        let mut organizer = FolderOrganizer::new(api.clone(), Locale::En);
        organizer.reload();
        wait_until(&mut organizer, |o| !o.is_loading());
        organizer
    }

    fn wait_until(organizer: &mut FolderOrganizer, done: impl Fn(&FolderOrganizer) -> bool) {
        let deadline = Instant::now() + WAIT;
        while !done(organizer) {
            assert!(Instant::now() < deadline, "timed out waiting for organizer");
            organizer.wait(Duration::from_millis(50));
        }
    }

    fn name_of(organizer: &FolderOrganizer, id: FolderId) -> Option<String> {
        organizer.tree().get(id).map(|f| f.name.clone())
    }

    #[test]
    fn test_initial_load_builds_tree() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let organizer = loaded(&api);

        let ids: Vec<FolderId> = organizer.view().rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(organizer.cursor(), Some(1));
        assert!(organizer.notifications().is_empty());
    }

    #[test]
    fn test_empty_list_shows_empty_state() {
        let api = Arc::new(FakeFolderApi::default());
        let organizer = loaded(&api);
        assert!(organizer.view().is_empty());
        assert!(organizer.notifications().is_empty());
        assert_eq!(organizer.messages().no_folders, "No folders yet");
    }

    #[test]
    fn test_load_failure_keeps_previous_tree() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);

        api.fail_list(true);
        organizer.reload();
        wait_until(&mut organizer, |o| !o.is_loading());

        assert_eq!(organizer.tree().len(), 3);
        let last = organizer.latest_notification().unwrap();
        assert_eq!(last.kind, NotificationKind::Error);
        assert!(last.message.starts_with("Could not load folders"));
    }

    #[test]
    fn test_rename_shows_new_name_only_after_reload() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);
        let release = api.hold_lists();

        assert!(organizer.begin_rename(1));
        assert_eq!(organizer.form().unwrap().input, "Calls");
        *organizer.form_input_mut().unwrap() = "Phone calls".to_string();
        organizer.submit_form().unwrap();

        wait_until(&mut organizer, |o| o.form().is_none());
        assert_eq!(organizer.latest_notification().unwrap().kind, NotificationKind::Success);
        // The backend accepted the rename but the reload has not landed yet.
        assert_eq!(name_of(&organizer, 1).as_deref(), Some("Calls"));

        release.send(()).unwrap();
        wait_until(&mut organizer, |o| name_of(o, 1).as_deref() == Some("Phone calls"));
    }

    #[test]
    fn test_cancelled_delete_sends_nothing() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);

        assert!(organizer.request_delete(1));
        assert!(organizer.pending_delete().unwrap().prompt.contains("parent folder"));
        organizer.cancel_delete();
        assert!(organizer.pending_delete().is_none());
        let last = organizer.latest_notification().unwrap();
        assert_eq!(last.kind, NotificationKind::Info);
        assert_eq!(last.message, "Delete cancelled");

        assert_eq!(organizer.wait(Duration::from_millis(100)), 0);
        assert_eq!(api.calls(), vec!["list"]);
        assert_eq!(organizer.tree().len(), 3);
    }

    #[test]
    fn test_confirmed_delete_reloads_with_reparented_children() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);

        organizer.request_delete(1);
        organizer.confirm_delete().unwrap();
        wait_until(&mut organizer, |o| !o.tree().contains(1));

        let roots: Vec<FolderId> = organizer.tree().roots().iter().map(|f| f.id).collect();
        assert_eq!(roots, vec![3, 2]);
        assert_eq!(api.calls(), vec!["list", "delete 1", "list"]);
    }

    #[test]
    fn test_failed_create_keeps_form_open() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);
        api.fail_mutations(true);

        assert!(organizer.begin_create(Some(1)));
        organizer.form_input_mut().unwrap().push_str("Missed");
        organizer.submit_form().unwrap();
        assert!(organizer.form_input_mut().is_none());

        wait_until(&mut organizer, |o| o.form().map(|f| !f.is_submitting()).unwrap_or(false));
        assert_eq!(organizer.form().unwrap().input, "Missed");
        assert_eq!(organizer.latest_notification().unwrap().kind, NotificationKind::Error);
        assert_eq!(organizer.tree().len(), 3);
    }

    #[test]
    fn test_blank_name_is_rejected_locally() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);

        organizer.begin_create(None);
        let err = organizer.submit_form().unwrap_err();
        assert!(err.is_validation());
        assert!(organizer.form().is_some());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let api = Arc::new(FakeFolderApi::default());
        let mut organizer = FolderOrganizer::new(api, Locale::En);

        organizer.apply(DispatchEvent::Loaded {
            generation: 2,
            result: Ok(vec![FolderNode::new(1, "Fresh", None)]),
        });
        organizer.apply(DispatchEvent::Loaded {
            generation: 1,
            result: Ok(vec![FolderNode::new(1, "Stale", None)]),
        });
        assert_eq!(name_of(&organizer, 1).as_deref(), Some("Fresh"));
    }

    #[test]
    fn test_busy_folder_rejects_second_mutation() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);
        let release = api.hold_mutations();

        organizer.begin_rename(1);
        *organizer.form_input_mut().unwrap() = "Renamed".to_string();
        organizer.submit_form().unwrap();

        organizer.request_delete(1);
        let err = organizer.confirm_delete().unwrap_err();
        assert!(matches!(err, FolderError::Busy { id: Some(1) }));
        assert_eq!(organizer.latest_notification().unwrap().message, organizer.messages().busy);

        release.send(()).unwrap();
        wait_until(&mut organizer, |o| name_of(o, 1).as_deref() == Some("Renamed"));
    }

    #[test]
    fn test_selection_and_toggle_are_independent() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);

        organizer.select(Some(2));
        assert_eq!(organizer.selection().get(), Some(2));
        assert!(organizer.expansion.is_expanded(organizer.tree(), 1));

        organizer.select(Some(99));
        assert_eq!(organizer.selection().get(), Some(2));

        organizer.select(None);
        assert_eq!(organizer.selection().get(), None);
    }

    #[test]
    fn test_cursor_moves_over_visible_rows() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);

        organizer.move_cursor(1);
        assert_eq!(organizer.cursor(), Some(2));
        organizer.move_cursor(5);
        assert_eq!(organizer.cursor(), Some(3));
        organizer.move_cursor(-1);
        assert_eq!(organizer.cursor(), Some(2));

        // Collapsing the parent pulls the cursor up onto it.
        organizer.toggle(1);
        assert_eq!(organizer.cursor(), Some(1));
        organizer.move_cursor(1);
        assert_eq!(organizer.cursor(), Some(3));
    }

    #[test]
    fn test_selection_cleared_when_selected_folder_deleted() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);
        organizer.select(Some(3));

        organizer.request_delete(3);
        organizer.confirm_delete().unwrap();
        wait_until(&mut organizer, |o| !o.tree().contains(3));
        assert_eq!(organizer.selection().get(), None);
    }

    #[test]
    fn test_expired_notifications_are_dropped() {
        let api = Arc::new(FakeFolderApi::default());
        let mut organizer = FolderOrganizer::new(api, Locale::En);
        organizer.notify(NotificationKind::Success, "hello".to_string());
        organizer.expire_notifications(Duration::from_secs(60));
        assert_eq!(organizer.notifications().len(), 1);
        organizer.expire_notifications(Duration::ZERO);
        assert!(organizer.notifications().is_empty());
    }

    #[test]
    fn test_cancelled_create_ignores_its_late_result() {
        let api = Arc::new(FakeFolderApi::with_folders(sample_folders()));
        let mut organizer = loaded(&api);
        let release = api.hold_mutations();

        organizer.begin_create(None);
        organizer.form_input_mut().unwrap().push_str("First");
        organizer.submit_form().unwrap();
        organizer.cancel_form();

        // Same parent as the abandoned form.
        organizer.begin_create(None);
        organizer.form_input_mut().unwrap().push_str("Second");

        release.send(()).unwrap();
        wait_until(&mut organizer, |o| o.tree().roots().iter().any(|f| f.name == "First"));

        let form = organizer.form().unwrap();
        assert_eq!(form.kind, FormKind::Create { parent_id: None });
        assert_eq!(form.input, "Second");
        assert!(!form.is_submitting());
        assert_eq!(organizer.latest_notification().unwrap().kind, NotificationKind::Success);
    }

    fn nested_folders() -> Vec<FolderNode> {
        vec![
            FolderNode::new(1, "Calls", None),
            FolderNode::new(2, "Inbound", Some(1)),
            FolderNode::new(4, "Missed", Some(2)),
            FolderNode::new(3, "Chats", None),
        ]
    }

    fn visible_ids(organizer: &FolderOrganizer) -> Vec<FolderId> {
        organizer.view().rows().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_collapse_all_then_expand_all() {
        let api = Arc::new(FakeFolderApi::with_folders(nested_folders()));
        let mut organizer = loaded(&api);
        organizer.move_cursor_to(4);

        organizer.collapse_all();
        assert_eq!(visible_ids(&organizer), vec![1, 3]);
        assert_eq!(organizer.cursor(), Some(1));

        // Expanding the root shows its child, which is still collapsed.
        organizer.expand(1);
        assert_eq!(visible_ids(&organizer), vec![1, 2, 3]);

        organizer.expand_all();
        assert_eq!(visible_ids(&organizer), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_arrow_keys_expand_collapse_and_climb() {
        let api = Arc::new(FakeFolderApi::with_folders(nested_folders()));
        let mut organizer = loaded(&api);
        organizer.move_cursor_to(4);

        // A leaf has nothing to close, so the cursor climbs to its parent.
        organizer.collapse_cursor();
        assert_eq!(organizer.cursor(), Some(2));
        organizer.collapse_cursor();
        assert_eq!(visible_ids(&organizer), vec![1, 2, 3]);
        assert_eq!(organizer.cursor(), Some(2));
        organizer.collapse_cursor();
        assert_eq!(organizer.cursor(), Some(1));

        organizer.move_cursor_to(2);
        organizer.expand_cursor();
        assert_eq!(visible_ids(&organizer), vec![1, 2, 4, 3]);

        // Leaves carry no expansion state.
        organizer.collapse(3);
        organizer.expand(3);
        assert_eq!(organizer.view().rows()[3].expanded, None);
    }
}
