use indextree::{Arena, NodeId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::folder::{sibling_order, FolderId, FolderNode};

/// Nested view of one folder and its subtree, used for JSON output only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderBranch {
    #[serde(flatten)]
    pub folder: FolderNode,
    pub children: Vec<FolderBranch>,
}

/// Sorted folder forest built from the flat list returned by the backend.
///
/// Nodes live in an arena and are looked up by folder id; `roots` keeps the
/// top level in display order since the arena itself has no single root.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    arena: Arena<FolderNode>,
    roots: Vec<NodeId>,
    id_to_node: HashMap<FolderId, NodeId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl FolderTree {
    /// Build a forest from a flat, unordered list of records.
    ///
    /// Records whose parent is missing, is themselves, or sits on a parent
    /// cycle end up at the root level instead of being dropped.
    pub fn build(folders: &[FolderNode]) -> Self {
        let mut arena = Arena::new();
        let mut id_to_node = HashMap::with_capacity(folders.len());
        let mut order: Vec<FolderId> = Vec::with_capacity(folders.len());

        // Pass 1: clone every record into the arena.
        for folder in folders {
            if id_to_node.contains_key(&folder.id) {
                warn!(id = folder.id, name = %folder.name, "duplicate folder id, keeping first record");
                continue;
            }
            let node_id = arena.new_node(folder.clone());
            id_to_node.insert(folder.id, node_id);
            order.push(folder.id);
        }

        // Pass 2: resolve parents.
        let mut parent_of: HashMap<FolderId, Option<FolderId>> = HashMap::with_capacity(order.len());
        for folder in folders {
            if parent_of.contains_key(&folder.id) {
                continue;
            }
            let parent = match folder.parent_id {
                None => None,
                Some(parent) if parent == folder.id => {
                    debug!(id = folder.id, "folder is its own parent, treating as root");
                    None
                }
                Some(parent) if id_to_node.contains_key(&parent) => Some(parent),
                Some(parent) => {
                    debug!(id = folder.id, parent, "unknown parent, treating as root");
                    None
                }
            };
            parent_of.insert(folder.id, parent);
        }

        break_cycles(&arena, &id_to_node, &order, &mut parent_of);

        // Group siblings, sort each group, then attach in that order.
        let mut children_of: HashMap<Option<FolderId>, Vec<NodeId>> = HashMap::new();
        for id in &order {
            if let (Some(&node_id), Some(&parent)) = (id_to_node.get(id), parent_of.get(id)) {
                children_of.entry(parent).or_default().push(node_id);
            }
        }
        for group in children_of.values_mut() {
            sort_group(&arena, group);
        }

        let mut roots = children_of.remove(&None).unwrap_or_default();
        let mut parents: Vec<(FolderId, Vec<NodeId>)> = children_of
            .into_iter()
            .filter_map(|(parent, group)| parent.map(|p| (p, group)))
            .collect();
        parents.sort_by_key(|(parent, _)| *parent);

        let mut detached = Vec::new();
        for (parent, group) in parents {
            let Some(&parent_node) = id_to_node.get(&parent) else {
                detached.extend(group);
                continue;
            };
            for child in group {
                if let Err(err) = parent_node.checked_append(child, &mut arena) {
                    warn!(parent, error = %err, "could not attach folder, treating as root");
                    detached.push(child);
                }
            }
        }
        if !detached.is_empty() {
            roots.extend(detached);
            sort_group(&arena, &mut roots);
        }

        Self {
            arena,
            roots,
            id_to_node,
        }
    }

    pub fn len(&self) -> usize {
        self.id_to_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_node.is_empty()
    }

    pub fn contains(&self, id: FolderId) -> bool {
        self.id_to_node.contains_key(&id)
    }

    pub fn get(&self, id: FolderId) -> Option<&FolderNode> {
        let node_id = self.id_to_node.get(&id)?;
        self.arena.get(*node_id).map(|n| n.get())
    }

    /// Top-level folders in display order.
    pub fn roots(&self) -> Vec<&FolderNode> {
        self.roots.iter().filter_map(|n| self.folder(*n)).collect()
    }

    /// Direct children of `id` in display order; empty for leaves and unknown ids.
    pub fn children(&self, id: FolderId) -> Vec<&FolderNode> {
        match self.id_to_node.get(&id) {
            Some(node_id) => node_id
                .children(&self.arena)
                .filter_map(|child| self.folder(child))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn has_children(&self, id: FolderId) -> bool {
        self.id_to_node
            .get(&id)
            .and_then(|node_id| self.arena.get(*node_id))
            .map(|node| node.first_child().is_some())
            .unwrap_or(false)
    }

    /// Parent as placed in the tree; `None` for roots, including orphans.
    pub fn parent_id(&self, id: FolderId) -> Option<FolderId> {
        let node_id = self.id_to_node.get(&id)?;
        let parent = self.arena.get(*node_id)?.parent()?;
        self.folder(parent).map(|f| f.id)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: FolderId) -> Vec<FolderId> {
        match self.id_to_node.get(&id) {
            Some(node_id) => node_id
                .ancestors(&self.arena)
                .skip(1)
                .filter_map(|n| self.folder(n).map(|f| f.id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Distance from the nearest root (roots are depth 0).
    pub fn depth(&self, id: FolderId) -> Option<usize> {
        self.id_to_node
            .get(&id)
            .map(|node_id| node_id.ancestors(&self.arena).count() - 1)
    }

    /// Pre-order walk over every folder with its depth.
    pub fn walk(&self, mut visit: impl FnMut(&FolderNode, usize)) {
        for root in &self.roots {
            for node_id in root.descendants(&self.arena) {
                if let Some(folder) = self.folder(node_id) {
                    let depth = node_id.ancestors(&self.arena).count() - 1;
                    visit(folder, depth);
                }
            }
        }
    }

    /// Every record in pre-order, without any nesting.
    pub fn flatten(&self) -> Vec<FolderNode> {
        let mut out = Vec::with_capacity(self.len());
        self.walk(|folder, _| out.push(folder.clone()));
        out
    }

    pub fn to_branches(&self) -> Vec<FolderBranch> {
        self.roots.iter().filter_map(|n| self.branch(*n)).collect()
    }

    fn branch(&self, node_id: NodeId) -> Option<FolderBranch> {
        let folder = self.folder(node_id)?.clone();
        let children = node_id
            .children(&self.arena)
            .filter_map(|child| self.branch(child))
            .collect();
        Some(FolderBranch { folder, children })
    }

    fn folder(&self, node_id: NodeId) -> Option<&FolderNode> {
        self.arena.get(node_id).map(|n| n.get())
    }
}

fn sort_group(arena: &Arena<FolderNode>, group: &mut [NodeId]) {
    group.sort_by(|a, b| match (arena.get(*a), arena.get(*b)) {
        (Some(a), Some(b)) => sibling_order(a.get(), b.get()),
        _ => std::cmp::Ordering::Equal,
    });
}

/// Promote one member of every parent cycle to the root level.
///
/// The promoted member is the one that sorts first among its cycle, so the
/// outcome does not depend on input order.
fn break_cycles(
    arena: &Arena<FolderNode>,
    id_to_node: &HashMap<FolderId, NodeId>,
    order: &[FolderId],
    parent_of: &mut HashMap<FolderId, Option<FolderId>>,
) {
    let mut state: HashMap<FolderId, Visit> = HashMap::with_capacity(order.len());

    for &start in order {
        if state.contains_key(&start) {
            continue;
        }

        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            match state.get(&id) {
                Some(Visit::Done) => break,
                Some(Visit::InProgress) => {
                    let Some(pos) = path.iter().position(|p| *p == id) else {
                        break;
                    };
                    let cycle = &path[pos..];
                    let promoted = cycle
                        .iter()
                        .copied()
                        .filter_map(|member| {
                            let node_id = id_to_node.get(&member)?;
                            arena.get(*node_id).map(|n| n.get())
                        })
                        .min_by(|a, b| sibling_order(a, b))
                        .map(|f| f.id);
                    if let Some(promoted) = promoted {
                        warn!(id = promoted, cycle_len = cycle.len(), "parent cycle detected, promoting folder to root");
                        parent_of.insert(promoted, None);
                    }
                    break;
                }
                None => {
                    state.insert(id, Visit::InProgress);
                    path.push(id);
                    current = parent_of.get(&id).copied().flatten();
                }
            }
        }

        for id in path {
            state.insert(id, Visit::Done);
        }
    }
}
