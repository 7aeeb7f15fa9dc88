use std::collections::HashSet;

use crate::folder::FolderId;
use crate::tree::FolderTree;

/// Tracks which folders are collapsed.
///
/// Folders with children start expanded, so only the collapsed ones are
/// recorded. Leaves have no state at all.
#[derive(Debug, Default, Clone)]
pub struct ExpansionState {
    collapsed: HashSet<FolderId>,
}

impl ExpansionState {
    pub fn expand(&mut self, id: FolderId) {
        self.collapsed.remove(&id);
    }

    pub fn collapse(&mut self, id: FolderId) {
        self.collapsed.insert(id);
    }

    /// Flip a folder between expanded and collapsed. Leaves are ignored.
    pub fn toggle(&mut self, tree: &FolderTree, id: FolderId) {
        if !tree.has_children(id) {
            return;
        }
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
    }

    /// `None` for leaves and unknown ids.
    pub fn state(&self, tree: &FolderTree, id: FolderId) -> Option<bool> {
        if !tree.has_children(id) {
            return None;
        }
        Some(!self.collapsed.contains(&id))
    }

    pub fn is_expanded(&self, tree: &FolderTree, id: FolderId) -> bool {
        self.state(tree, id).unwrap_or(false)
    }

    pub fn collapse_all(&mut self, tree: &FolderTree) {
        tree.walk(|folder, _| {
            if tree.has_children(folder.id) {
                self.collapsed.insert(folder.id);
            }
        });
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Forget folders that no longer exist after a reload.
    pub fn retain_known(&mut self, tree: &FolderTree) {
        self.collapsed.retain(|id| tree.contains(*id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::FolderNode;

    fn sample_tree() -> FolderTree {
        FolderTree::build(&[
            FolderNode::new(1, "root", None),
            FolderNode::new(2, "child", Some(1)),
            FolderNode::new(3, "grandchild", Some(2)),
            FolderNode::new(4, "other", None),
        ])
    }

    #[test]
    fn test_parents_start_expanded_leaves_have_no_state() {
        let tree = sample_tree();
        let state = ExpansionState::default();
        assert_eq!(state.state(&tree, 1), Some(true));
        assert_eq!(state.state(&tree, 2), Some(true));
        assert_eq!(state.state(&tree, 3), None);
        assert_eq!(state.state(&tree, 4), None);
    }

    #[test]
    fn test_toggle() {
        let tree = sample_tree();
        let mut state = ExpansionState::default();

        state.toggle(&tree, 1);
        assert!(!state.is_expanded(&tree, 1));
        state.toggle(&tree, 1);
        assert!(state.is_expanded(&tree, 1));

        // Leaves never become collapsed.
        state.toggle(&tree, 3);
        assert_eq!(state.state(&tree, 3), None);
    }

    #[test]
    fn test_collapse_all_and_expand_all() {
        let tree = sample_tree();
        let mut state = ExpansionState::default();

        state.collapse_all(&tree);
        assert!(!state.is_expanded(&tree, 1));
        assert!(!state.is_expanded(&tree, 2));

        state.expand_all();
        assert!(state.is_expanded(&tree, 1));
        assert!(state.is_expanded(&tree, 2));
    }

    #[test]
    fn test_retain_known_drops_vanished_folders() {
        let tree = sample_tree();
        let mut state = ExpansionState::default();
        state.collapse(1);
        state.collapse(2);

        let reloaded = FolderTree::build(&[
            FolderNode::new(1, "root", None),
            FolderNode::new(5, "new", Some(1)),
        ]);
        state.retain_known(&reloaded);
        assert!(!state.is_expanded(&reloaded, 1));
        assert!(!state.collapsed.contains(&2));
    }
}
