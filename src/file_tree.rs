//! Hierarchical folder/file tree with O(1) path lookup, multi-selection,
//! expansion, focus, and cycle-rejecting move (§4.E).
//!
//! Grounded on the teacher's id-indexed arena pattern
//! (`dock_builder.rs`'s `BTreeMap<DockNodeId, Node<Pane>>`): nodes live
//! in a single `path -> TreeNode` map, the same way the teacher's arena
//! holds `NodeId -> Node<Pane>`, and a folder's `children` field stores
//! child *paths* rather than owned subtrees. A lookup by path is then a
//! single map access, never a tree walk.

use ahash::{HashMap, HashSet};

/// Opaque per-file metadata the host attaches; the manager never inspects
/// its contents.
pub type FileData = std::collections::BTreeMap<String, String>;

/// One node of the file tree. A folder's `children` are the paths of its
/// immediate children, looked up through the owning
/// [`FileTreeManager`]'s arena.
#[derive(Clone, Debug)]
pub enum TreeNode {
    File { id: String, name: String, path: String, depth: u32, data: FileData },
    Folder { id: String, name: String, path: String, depth: u32, children: Vec<String> },
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            Self::File { id, .. } | Self::Folder { id, .. } => id,
        }
    }
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Folder { name, .. } => name,
        }
    }
    pub fn path(&self) -> &str {
        match self {
            Self::File { path, .. } | Self::Folder { path, .. } => path,
        }
    }
    pub fn depth(&self) -> u32 {
        match self {
            Self::File { depth, .. } | Self::Folder { depth, .. } => *depth,
        }
    }
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }
    /// Paths of the immediate children, in storage order. Empty for files.
    pub fn children(&self) -> &[String] {
        match self {
            Self::Folder { children, .. } => children,
            Self::File { .. } => &[],
        }
    }
}

fn child_path(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() {
        name.to_owned()
    } else {
        format!("{parent_path}/{name}")
    }
}

fn depth_of(path: &str) -> u32 {
    if path.is_empty() {
        0
    } else {
        u32::try_from(path.matches('/').count()).expect("path separator count fits u32") + 1
    }
}

/// Path-indexed arena plus selection state (§3 "FileTreeState"). Every
/// node, file or folder, lives in `nodes`; `get_file`/`get_folder`/
/// `get_node` are a single map lookup, matching the arena pattern
/// `dock::DockTreeManager` uses for panels.
pub struct FileTreeManager {
    nodes: HashMap<String, TreeNode>,
    root_path: String,
    selected: HashSet<String>,
    anchor: Option<String>,
    last_selected: Option<String>,
    is_add_mode: bool,
    expanded: HashSet<String>,
    focused: Option<String>,
}

/// Reported by [`FileTreeManager::check_duplicate_name`].
#[derive(Debug, PartialEq, Eq)]
pub struct DuplicateNameError(pub String);

/// Where a node is dropped relative to a target (§4.E `Move`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovePosition {
    Before,
    After,
    Inside,
}

impl FileTreeManager {
    /// A manager rooted at an empty folder (path `""`).
    pub fn new() -> Self {
        let root_path = String::new();
        let root = TreeNode::Folder { id: crate::ids::fresh_default(), name: String::new(), path: root_path.clone(), depth: 0, children: Vec::new() };
        let mut nodes = HashMap::default();
        nodes.insert(root_path.clone(), root);
        Self {
            nodes,
            root_path,
            selected: HashSet::default(),
            anchor: None,
            last_selected: None,
            is_add_mode: false,
            expanded: HashSet::default(),
            focused: None,
        }
    }

    /// O(1) lookup of a file node by path.
    pub fn get_file(&self, path: &str) -> Option<&TreeNode> {
        match self.nodes.get(path) {
            found @ Some(TreeNode::File { .. }) => found,
            _ => None,
        }
    }

    /// O(1) lookup of a folder node by path.
    pub fn get_folder(&self, path: &str) -> Option<&TreeNode> {
        match self.nodes.get(path) {
            found @ Some(TreeNode::Folder { .. }) => found,
            _ => None,
        }
    }

    /// O(1) lookup of any node by path.
    pub fn get_node(&self, path: &str) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    pub fn root(&self) -> &TreeNode {
        self.nodes.get(&self.root_path).expect("root is never removed from the arena")
    }

    /// Reports a name clash with an existing sibling (other than `except`),
    /// compared case-insensitively.
    pub fn check_duplicate_name(&self, parent_path: &str, name: &str, except: Option<&str>) -> Option<DuplicateNameError> {
        let TreeNode::Folder { children, .. } = self.get_folder(parent_path)? else {
            return None;
        };
        let clash = children
            .iter()
            .any(|child_path| Some(child_path.as_str()) != except && self.nodes.get(child_path).is_some_and(|c| c.name().eq_ignore_ascii_case(name)));
        if clash {
            Some(DuplicateNameError(format!("\"{name}\" already exists in this folder")))
        } else {
            None
        }
    }

    /// Adds a file under `parent_path`. Fails (returns `None`) if the
    /// parent doesn't exist or the name clashes with a sibling.
    pub fn add_file(&mut self, parent_path: &str, name: &str, data: FileData) -> Option<String> {
        if self.check_duplicate_name(parent_path, name, None).is_some() {
            log::warn!("add_file rejected: duplicate name {name:?} under {parent_path:?}");
            return None;
        }
        if self.get_folder(parent_path).is_none() {
            return None;
        }
        let path = child_path(parent_path, name);
        let node = TreeNode::File { id: crate::ids::fresh_default(), name: name.to_owned(), path: path.clone(), depth: depth_of(&path), data };
        self.nodes.insert(path.clone(), node);
        if let Some(TreeNode::Folder { children, .. }) = self.nodes.get_mut(parent_path) {
            children.push(path.clone());
        }
        log::debug!("add_file: {path}");
        Some(path)
    }

    /// Adds a folder under `parent_path`. Same rejection rules as
    /// [`Self::add_file`].
    pub fn add_folder(&mut self, parent_path: &str, name: &str) -> Option<String> {
        if self.check_duplicate_name(parent_path, name, None).is_some() {
            log::warn!("add_folder rejected: duplicate name {name:?} under {parent_path:?}");
            return None;
        }
        if self.get_folder(parent_path).is_none() {
            return None;
        }
        let path = child_path(parent_path, name);
        let node = TreeNode::Folder { id: crate::ids::fresh_default(), name: name.to_owned(), path: path.clone(), depth: depth_of(&path), children: Vec::new() };
        self.nodes.insert(path.clone(), node);
        if let Some(TreeNode::Folder { children, .. }) = self.nodes.get_mut(parent_path) {
            children.push(path.clone());
        }
        log::debug!("add_folder: {path}");
        Some(path)
    }

    /// Detaches `path` from its parent, removes its descendants from the
    /// arena, and evicts any selection referencing removed paths.
    /// Returns `false` if `path` doesn't exist or is the root.
    pub fn remove(&mut self, path: &str) -> bool {
        if path.is_empty() || !self.nodes.contains_key(path) {
            return false;
        }
        let Some((parent_path, _)) = split_parent(path) else {
            return false;
        };
        let Some(TreeNode::Folder { children, .. }) = self.nodes.get_mut(&parent_path) else {
            return false;
        };
        let Some(index) = children.iter().position(|c| c == path) else {
            return false;
        };
        children.remove(index);
        self.remove_subtree(path);
        log::debug!("remove: {path}");
        true
    }

    /// Removes `path` and its descendants from the arena and evicts every
    /// selection/expansion/focus reference that pointed at one of them.
    fn remove_subtree(&mut self, path: &str) {
        let mut stack = vec![path.to_owned()];
        while let Some(p) = stack.pop() {
            if let Some(TreeNode::Folder { children, .. }) = self.nodes.remove(&p) {
                stack.extend(children);
            }
            self.evict_path(&p);
        }
    }

    fn evict_path(&mut self, path: &str) {
        self.selected.remove(path);
        self.expanded.remove(path);
        if self.anchor.as_deref() == Some(path) {
            self.anchor = None;
        }
        if self.last_selected.as_deref() == Some(path) {
            self.last_selected = None;
        }
        if self.focused.as_deref() == Some(path) {
            self.focused = None;
        }
    }

    /// Moves `old_path` (and one node at a time, every node beneath it)
    /// to a child of `new_parent_path`, recomputing `path`/`depth` and
    /// re-mapping any selection/expansion/anchor/focus entry that held
    /// the node's old path. Returns the node's new path.
    fn rewrite_subtree_path(&mut self, old_path: &str, new_parent_path: &str, mapping: &mut HashMap<String, String>) -> String {
        let mut node = self.nodes.remove(old_path).expect("caller only rewrites paths that exist");
        let name = node.name().to_owned();
        let new_path = child_path(new_parent_path, &name);

        match &mut node {
            TreeNode::File { path, depth, .. } => {
                *path = new_path.clone();
                *depth = depth_of(&new_path);
            }
            TreeNode::Folder { path, depth, children, .. } => {
                let old_children = std::mem::take(children);
                let new_children: Vec<String> = old_children.iter().map(|old_child| self.rewrite_subtree_path(old_child, &new_path, mapping)).collect();
                *path = new_path.clone();
                *depth = depth_of(&new_path);
                *children = new_children;
            }
        }

        self.nodes.insert(new_path.clone(), node);
        self.remap_path_keyed_state(old_path, &new_path);
        mapping.insert(old_path.to_owned(), new_path.clone());
        new_path
    }

    /// Re-points `selected`/`expanded`/`anchor`/`last_selected`/`focused`
    /// entries from `old_path` to `new_path` when they match exactly.
    fn remap_path_keyed_state(&mut self, old_path: &str, new_path: &str) {
        if self.selected.remove(old_path) {
            self.selected.insert(new_path.to_owned());
        }
        if self.expanded.remove(old_path) {
            self.expanded.insert(new_path.to_owned());
        }
        if self.anchor.as_deref() == Some(old_path) {
            self.anchor = Some(new_path.to_owned());
        }
        if self.last_selected.as_deref() == Some(old_path) {
            self.last_selected = Some(new_path.to_owned());
        }
        if self.focused.as_deref() == Some(old_path) {
            self.focused = Some(new_path.to_owned());
        }
    }

    /// Moves `source` to `position` relative to `target`. Fails without
    /// mutating on: `source == target`, `target` a descendant of
    /// `source` (cycle), `Inside` on a non-folder target, or a name
    /// clash at the destination. Every selection/expansion/anchor/focus
    /// entry under `source` is re-mapped to its new path so the state
    /// never outlives the node it names.
    pub fn move_node(&mut self, source: &str, target: &str, position: MovePosition) -> bool {
        if source == target {
            return false;
        }
        if is_descendant_path(source, target) {
            log::warn!("move_node rejected: {target} is a descendant of {source}");
            return false;
        }
        let Some(target_node) = self.get_node(target) else {
            return false;
        };
        if position == MovePosition::Inside && !target_node.is_folder() {
            return false;
        }

        let Some(source_node) = self.get_node(source) else {
            return false;
        };
        let name = source_node.name().to_owned();

        let new_parent_path = match position {
            MovePosition::Inside => target.to_owned(),
            MovePosition::Before | MovePosition::After => {
                let Some((parent, _)) = split_parent(target) else {
                    return false;
                };
                parent
            }
        };

        let except = if new_parent_path == parent_of(source) { Some(source) } else { None };
        if self.check_duplicate_name(&new_parent_path, &name, except).is_some() {
            return false;
        }

        let Some((old_parent_path, _)) = split_parent(source) else {
            return false;
        };
        let Some(TreeNode::Folder { children: old_children, .. }) = self.nodes.get_mut(&old_parent_path) else {
            return false;
        };
        let Some(old_index) = old_children.iter().position(|c| c == source) else {
            return false;
        };
        old_children.remove(old_index);

        let mut mapping = HashMap::default();
        let new_source_path = self.rewrite_subtree_path(source, &new_parent_path, &mut mapping);

        let Some(TreeNode::Folder { children: new_children, .. }) = self.nodes.get_mut(&new_parent_path) else {
            // Validated above: the new parent exists and is a folder.
            unreachable!("new parent folder vanished mid-move")
        };
        let insert_index = match position {
            MovePosition::Inside => new_children.len(),
            MovePosition::Before | MovePosition::After => {
                let target_index = new_children.iter().position(|c| c == target).unwrap_or(new_children.len());
                if position == MovePosition::Before { target_index } else { target_index + 1 }
            }
        };
        let insert_index = insert_index.min(new_children.len());
        new_children.insert(insert_index, new_source_path);

        log::debug!("move_node: {source} -> {new_parent_path} ({position:?})");
        true
    }

    // ---- Selection (§4.E "Selection") ----

    pub fn select(&mut self, path: &str) {
        self.selected.clear();
        self.selected.insert(path.to_owned());
        self.anchor = Some(path.to_owned());
        self.last_selected = Some(path.to_owned());
        self.is_add_mode = false;
    }

    pub fn toggle_selection(&mut self, path: &str) {
        if !self.selected.remove(path) {
            self.selected.insert(path.to_owned());
        }
        self.anchor = Some(path.to_owned());
        self.last_selected = Some(path.to_owned());
        self.is_add_mode = true;
    }

    /// Selects the contiguous run of visible nodes between the anchor and
    /// `path`, inclusive. Clears the prior selection first unless
    /// `add_to_existing`.
    pub fn select_range(&mut self, path: &str, add_to_existing: bool) {
        let visible = self.visible_nodes();
        let anchor = self.anchor.clone().unwrap_or_else(|| path.to_owned());
        let Some(anchor_idx) = visible.iter().position(|p| p == &anchor) else {
            self.select(path);
            return;
        };
        let Some(target_idx) = visible.iter().position(|p| p == path) else {
            return;
        };

        if !add_to_existing {
            self.selected.clear();
        }

        let (lo, hi) = if anchor_idx <= target_idx { (anchor_idx, target_idx) } else { (target_idx, anchor_idx) };
        for p in &visible[lo..=hi] {
            self.selected.insert(p.clone());
        }
        self.last_selected = Some(path.to_owned());
        self.is_add_mode = add_to_existing;
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn is_add_mode(&self) -> bool {
        self.is_add_mode
    }

    // ---- Expansion (§4.E "Expansion") ----

    pub fn expand(&mut self, path: &str) {
        self.expanded.insert(path.to_owned());
    }

    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    pub fn toggle(&mut self, path: &str) {
        if self.expanded.contains(path) {
            self.collapse(path);
        } else {
            self.expand(path);
        }
    }

    pub fn expand_all(&mut self) {
        let mut stack = vec![self.root_path.clone()];
        let mut paths = Vec::new();
        while let Some(path) = stack.pop() {
            if let Some(TreeNode::Folder { children, .. }) = self.nodes.get(&path) {
                paths.push(path);
                stack.extend(children.iter().cloned());
            }
        }
        for path in paths {
            self.expanded.insert(path);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expands every sibling folder of `path`.
    pub fn expand_siblings(&mut self, path: &str) {
        let Some((parent_path, _)) = split_parent(path) else {
            return;
        };
        let Some(TreeNode::Folder { children, .. }) = self.get_node(&parent_path) else {
            return;
        };
        let sibling_paths: Vec<String> = children.iter().filter(|p| self.nodes.get(p.as_str()).is_some_and(TreeNode::is_folder)).cloned().collect();
        for p in sibling_paths {
            self.expanded.insert(p);
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    // ---- Focus ----

    pub fn set_focused(&mut self, path: Option<String>) {
        self.focused = path;
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    // ---- Visible nodes & ordering (§4.E) ----

    /// Depth-first traversal of the root, descending into folders only
    /// when expanded. Folders sort before files, both case-insensitively
    /// by locale comparison; insertion order is preserved in storage.
    pub fn visible_nodes(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.visit_visible(self.root(), &mut out, true);
        out
    }

    fn visit_visible(&self, node: &TreeNode, out: &mut Vec<String>, is_root: bool) {
        let TreeNode::Folder { path, children, .. } = node else {
            return;
        };
        if !is_root && !self.expanded.contains(path) {
            return;
        }
        for child in sorted_children(children.iter().filter_map(|p| self.nodes.get(p))) {
            out.push(child.path().to_owned());
            if child.is_folder() {
                self.visit_visible(child, out, false);
            }
        }
    }
}

impl Default for FileTreeManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Folders first, then files, both by case-insensitive name comparison.
/// Storage order (insertion order) is left untouched; this is a
/// visibility-time view only.
fn sorted_children<'a>(children: impl Iterator<Item = &'a TreeNode>) -> Vec<&'a TreeNode> {
    use itertools::Itertools as _;
    children
        .sorted_by(|a, b| b.is_folder().cmp(&a.is_folder()).then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase())))
        .collect()
}

fn split_parent(path: &str) -> Option<(String, String)> {
    if path.is_empty() {
        return None;
    }
    match path.rfind('/') {
        Some(idx) => Some((path[..idx].to_owned(), path[idx + 1..].to_owned())),
        None => Some((String::new(), path.to_owned())),
    }
}

fn parent_of(path: &str) -> String {
    split_parent(path).map(|(p, _)| p).unwrap_or_default()
}

fn is_descendant_path(ancestor: &str, candidate: &str) -> bool {
    if ancestor.is_empty() {
        return !candidate.is_empty();
    }
    candidate.starts_with(ancestor) && candidate[ancestor.len()..].starts_with('/')
}

/// Walks the arena from the root and verifies it's internally consistent
/// — every child path resolves, siblings are uniquely named
/// (case-insensitive) — and that every selection reference exists,
/// grounded in §9's "invariant checker that walks the tree and compares
/// against the indices."
pub mod invariants {
    use super::{FileTreeManager, TreeNode};

    pub fn check(manager: &FileTreeManager) -> Result<(), String> {
        walk(manager, &manager.root_path)?;

        for selected in manager.selected() {
            if manager.get_node(selected).is_none() {
                return Err(format!("selected path {selected} does not exist"));
            }
        }
        if let Some(anchor) = &manager.anchor {
            if manager.get_node(anchor).is_none() {
                return Err(format!("anchor {anchor} does not exist"));
            }
        }
        if let Some(last_selected) = &manager.last_selected {
            if manager.get_node(last_selected).is_none() {
                return Err(format!("last_selected path {last_selected} does not exist"));
            }
        }
        if let Some(focused) = manager.focused() {
            if manager.get_node(focused).is_none() {
                return Err(format!("focused path {focused} does not exist"));
            }
        }
        for expanded in &manager.expanded {
            if manager.get_folder(expanded).is_none() {
                return Err(format!("expanded path {expanded} is not a folder in the arena"));
            }
        }

        Ok(())
    }

    fn walk(manager: &FileTreeManager, path: &str) -> Result<(), String> {
        match manager.nodes.get(path) {
            Some(TreeNode::File { .. }) => Ok(()),
            Some(TreeNode::Folder { children, .. }) => {
                let mut seen = std::collections::HashSet::new();
                for child_path in children {
                    let Some(child) = manager.nodes.get(child_path) else {
                        return Err(format!("dangling child path {child_path} under {path:?}"));
                    };
                    if !seen.insert(child.name().to_lowercase()) {
                        return Err(format!("duplicate sibling name under {path:?}: {}", child.name()));
                    }
                    walk(manager, child_path)?;
                }
                Ok(())
            }
            None => Err(format!("dangling path {path}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> FileData {
        FileData::new()
    }

    #[test]
    fn add_file_and_folder_then_lookup() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "src").unwrap();
        let file_path = tree.add_file("src", "main.rs", data()).unwrap();
        assert_eq!(file_path, "src/main.rs");
        assert!(tree.get_file("src/main.rs").is_some());
        assert!(tree.get_folder("src").is_some());
        invariants::check(&tree).unwrap();
    }

    #[test]
    fn duplicate_name_rejected_case_insensitively() {
        let mut tree = FileTreeManager::new();
        tree.add_file("", "a.txt", data()).unwrap();
        assert!(tree.add_file("", "A.txt", data()).is_none());
        assert_eq!(
            tree.check_duplicate_name("", "A.TXT", None),
            Some(DuplicateNameError("\"A.TXT\" already exists in this folder".to_owned()))
        );
    }

    #[test]
    fn remove_evicts_descendants_and_selection() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "src").unwrap();
        tree.add_file("src", "lib.rs", data()).unwrap();
        tree.select("src/lib.rs");

        assert!(tree.remove("src"));
        assert!(tree.get_folder("src").is_none());
        assert!(tree.get_file("src/lib.rs").is_none());
        assert!(tree.selected().is_empty());
        invariants::check(&tree).unwrap();
    }

    #[test]
    fn move_cycle_rejected_and_tree_unchanged() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "src").unwrap();
        tree.add_folder("src", "util").unwrap();

        let before = tree.visible_nodes();
        assert!(!tree.move_node("src", "src/util", MovePosition::Inside));
        let after = tree.visible_nodes();
        assert_eq!(before, after);
        invariants::check(&tree).unwrap();
    }

    #[test]
    fn move_rewrites_paths_and_depths() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "a").unwrap();
        tree.add_folder("", "b").unwrap();
        tree.add_file("a", "x.txt", data()).unwrap();

        assert!(tree.move_node("a/x.txt", "b", MovePosition::Inside));
        assert!(tree.get_file("a/x.txt").is_none());
        let moved = tree.get_file("b/x.txt").unwrap();
        assert_eq!(moved.depth(), 2);
        invariants::check(&tree).unwrap();
    }

    #[test]
    fn move_inside_non_folder_rejected() {
        let mut tree = FileTreeManager::new();
        tree.add_file("", "a.txt", data()).unwrap();
        tree.add_file("", "b.txt", data()).unwrap();
        assert!(!tree.move_node("a.txt", "b.txt", MovePosition::Inside));
    }

    #[test]
    fn move_remaps_selection_expansion_anchor_and_focus() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "a").unwrap();
        tree.add_folder("", "b").unwrap();
        tree.add_file("a", "x.txt", data()).unwrap();

        tree.select("a/x.txt");
        tree.set_focused(Some("a/x.txt".to_owned()));

        assert!(tree.move_node("a/x.txt", "b", MovePosition::Inside));

        let mut selected: Vec<&str> = tree.selected().iter().map(String::as_str).collect();
        selected.sort_unstable();
        assert_eq!(selected, vec!["b/x.txt"]);
        assert_eq!(tree.focused(), Some("b/x.txt"));
        invariants::check(&tree).unwrap();
    }

    #[test]
    fn move_remaps_selection_within_folder_being_moved() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "a").unwrap();
        tree.add_folder("", "b").unwrap();
        tree.add_folder("a", "nested").unwrap();
        tree.add_file("a/nested", "y.txt", data()).unwrap();

        tree.select("a/nested/y.txt");
        tree.expand("a/nested");

        assert!(tree.move_node("a", "b", MovePosition::Inside));

        assert!(tree.selected().contains("b/a/nested/y.txt"));
        assert!(tree.is_expanded("b/a/nested"));
        invariants::check(&tree).unwrap();
    }

    #[test]
    fn range_selection_scenario() {
        // visible nodes [a, b, c, d]
        let mut tree = FileTreeManager::new();
        tree.add_file("", "a", data()).unwrap();
        tree.add_file("", "b", data()).unwrap();
        tree.add_file("", "c", data()).unwrap();
        tree.add_file("", "d", data()).unwrap();

        tree.select("a");
        tree.select_range("c", false);
        let mut got: Vec<&str> = tree.selected().iter().map(String::as_str).collect();
        got.sort_unstable();
        assert_eq!(got, vec!["a", "b", "c"]);

        tree.select_range("d", true);
        let mut got: Vec<&str> = tree.selected().iter().map(String::as_str).collect();
        got.sort_unstable();
        assert_eq!(got, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn expand_siblings_expands_all_folder_siblings() {
        let mut tree = FileTreeManager::new();
        tree.add_folder("", "a").unwrap();
        tree.add_folder("", "b").unwrap();
        tree.add_file("", "c.txt", data()).unwrap();

        tree.expand_siblings("a");
        assert!(tree.is_expanded("a"));
        assert!(tree.is_expanded("b"));
    }

    #[test]
    fn visible_nodes_sort_folders_before_files_case_insensitive() {
        let mut tree = FileTreeManager::new();
        tree.add_file("", "Zebra.txt", data()).unwrap();
        tree.add_folder("", "apples").unwrap();
        tree.add_file("", "banana.txt", data()).unwrap();

        let visible = tree.visible_nodes();
        assert_eq!(visible, vec!["apples", "banana.txt", "Zebra.txt"]);
    }
}
