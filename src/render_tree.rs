use crate::expand_state::ExpansionState;
use crate::folder::{FolderId, FolderNode};
use crate::tree::FolderTree;

/// Columns of indentation per depth level.
pub const INDENT_UNIT: usize = 2;

/// The single selected folder of a tree view.
///
/// `None` means no folder filter is applied and every recording is shown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Selection(Option<FolderId>);

impl Selection {
    pub fn new(id: Option<FolderId>) -> Self {
        Self(id)
    }

    pub fn get(&self) -> Option<FolderId> {
        self.0
    }

    pub fn set(&mut self, id: Option<FolderId>) {
        self.0 = id;
    }

    pub fn is_selected(&self, id: FolderId) -> bool {
        self.0 == Some(id)
    }

    /// Clear the selection if it points at a folder the tree no longer has.
    pub fn retain_known(&mut self, tree: &FolderTree) {
        if let Some(id) = self.0 {
            if !tree.contains(id) {
                self.0 = None;
            }
        }
    }
}

/// One visible line of the folder navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRow {
    pub id: FolderId,
    pub name: String,
    pub depth: usize,
    pub indent: usize,
    pub has_children: bool,
    /// `None` for leaves.
    pub expanded: Option<bool>,
    pub selected: bool,
    pub recording_count: Option<u32>,
    pub color: Option<String>,
}

impl RenderRow {
    fn from_folder(folder: &FolderNode, depth: usize, expanded: Option<bool>, selected: bool) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            depth,
            indent: depth * INDENT_UNIT,
            has_children: expanded.is_some(),
            expanded,
            selected,
            recording_count: folder.recording_count,
            color: folder.color.clone(),
        }
    }

    /// Name plus the recording count when there is at least one recording.
    pub fn label(&self) -> String {
        match self.recording_count {
            Some(count) if count > 0 => format!("{} ({})", self.name, count),
            _ => self.name.clone(),
        }
    }

    pub fn marker(&self) -> &'static str {
        match self.expanded {
            Some(true) => "▾",
            Some(false) => "▸",
            None => " ",
        }
    }

    /// Indented single-line rendering used by the CLI and as a TUI fallback.
    pub fn to_line(&self) -> String {
        format!("{}{} {}", " ".repeat(self.indent), self.marker(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderView {
    /// No folders at all; show the "no folders" message.
    Empty,
    Rows(Vec<RenderRow>),
}

impl RenderView {
    pub fn rows(&self) -> &[RenderRow] {
        match self {
            RenderView::Empty => &[],
            RenderView::Rows(rows) => rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderView::Empty)
    }
}

/// Walk the forest pre-order and emit the rows currently visible.
pub fn build_render_view(
    tree: &FolderTree,
    expansion: &ExpansionState,
    selection: &Selection,
) -> RenderView {
    if tree.is_empty() {
        return RenderView::Empty;
    }

    let mut rows = Vec::with_capacity(tree.len());
    for root in tree.roots() {
        push_rows(tree, root, 0, expansion, selection, &mut rows);
    }
    RenderView::Rows(rows)
}

fn push_rows(
    tree: &FolderTree,
    folder: &FolderNode,
    depth: usize,
    expansion: &ExpansionState,
    selection: &Selection,
    out: &mut Vec<RenderRow>,
) {
    let expanded = expansion.state(tree, folder.id);
    out.push(RenderRow::from_folder(
        folder,
        depth,
        expanded,
        selection.is_selected(folder.id),
    ));

    if expanded == Some(true) {
        for child in tree.children(folder.id) {
            push_rows(tree, child, depth + 1, expansion, selection, out);
        }
    }
}

pub fn row_index_of(rows: &[RenderRow], id: FolderId) -> Option<usize> {
    rows.iter().position(|row| row.id == id)
}
