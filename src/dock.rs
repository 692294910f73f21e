//! Recursive panel/split/tab tree with an event bus (§4.F).
//!
//! Internally an arena keyed by [`NodeKey`] rather than a tree of owned
//! [`Box`]es — grounded on the teacher's `Tiles<Pane>` (tile-id-indexed
//! storage in `container/tabs.rs`'s `children: Vec<TileId>`) generalized
//! from a widget-tree arena to a dock-tree arena. Mutations locate a
//! node's parent by a single downward walk from the root (no parent
//! pointers, per §9) and rewrite the parent's child slot in place.

use ahash::{HashMap, HashSet};
use std::cell::{Cell, RefCell};

use crate::drop_intent::DropIntent;

/// Binary split orientation of a [`DockNode::Container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

/// Public, owned description of a dock tree: the shape callers supply as
/// an initial layout and the shape [`DockTreeManager::snapshot`] returns.
/// An empty `id` asks the manager to mint a fresh one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DockNode {
    Panel { id: String, title: Option<String>, content_key: Option<String>, content: Option<String> },
    Container { id: String, split: SplitDirection, first: Box<DockNode>, second: Box<DockNode>, size: f32 },
    TabContainer { id: String, panels: Vec<DockNode>, active_id: String },
}

impl DockNode {
    /// A single unnamed panel with no content binding, suitable as a
    /// default root.
    pub fn empty_panel() -> Self {
        Self::Panel { id: String::new(), title: None, content_key: None, content: None }
    }
}

type NodeKey = u64;

#[derive(Clone, Debug)]
enum NodeData {
    Panel { id: String, title: Option<String>, content_key: Option<String>, content: Option<String> },
    Container { id: String, split: SplitDirection, first: NodeKey, second: NodeKey, size: f32 },
    TabContainer { id: String, panels: Vec<NodeKey>, active: NodeKey },
}

impl NodeData {
    fn id(&self) -> &str {
        match self {
            Self::Panel { id, .. } | Self::Container { id, .. } | Self::TabContainer { id, .. } => id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParentRef {
    Root,
    Container { parent: NodeKey, is_first: bool },
    Tab { parent: NodeKey, index: usize },
}

/// Events published by [`DockTreeManager`] (§4.F, §5 ordering guarantees:
/// granular events fire before `layoutChanged` within one operation).
#[derive(Clone, Debug, PartialEq)]
pub enum DockEvent {
    PanelAdded { id: String },
    PanelRemoved { id: String },
    PanelEdited { id: String },
    PanelMoved { source: String, target: String, position: DropIntent },
    Resize { node: String, size: f32 },
    ActivePanelChanged { tab_container: String, panel: String },
    LayoutChanged,
    PanelMaximized { id: String },
    PanelRestored { id: String },
}

/// Small publish/subscribe bus. Reentrant `emit` is permitted: a handler
/// may itself call `subscribe`; the subscriber list is swapped out for
/// the duration of dispatch and any additions are merged back in after,
/// so a handler-triggered nested `emit` sees no subscribers (grounded on
/// the teacher's `drop_queue.rs` "queue now, replace list after" shape).
pub struct EventBus<E> {
    subscribers: RefCell<Vec<(u64, Box<dyn FnMut(&E)>)>>,
    next_token: Cell<u64>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self { subscribers: RefCell::new(Vec::new()), next_token: Cell::new(0) }
    }

    /// Registers `handler`, returning a token for [`Self::unsubscribe`].
    pub fn subscribe(&self, handler: impl FnMut(&E) + 'static) -> u64 {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.subscribers.borrow_mut().push((token, Box::new(handler)));
        token
    }

    pub fn unsubscribe(&self, token: u64) {
        self.subscribers.borrow_mut().retain(|(t, _)| *t != token);
    }

    pub(crate) fn emit(&self, event: &E) {
        let mut subs = self.subscribers.take();
        for (_, handler) in &mut subs {
            handler(event);
        }
        self.subscribers.borrow_mut().splice(0..0, subs);
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive panel/split/tab tree plus the event bus that publishes its
/// mutations (§3 "DockState").
pub struct DockTreeManager {
    arena: HashMap<NodeKey, NodeData>,
    id_index: HashMap<String, NodeKey>,
    root: NodeKey,
    active_panels: HashMap<NodeKey, NodeKey>,
    maximized: Option<NodeKey>,
    #[allow(dead_code)]
    instance_id: String,
    next_key: NodeKey,
    events: EventBus<DockEvent>,
}

impl DockTreeManager {
    /// Builds the tree from `initial_layout`, or a single empty panel if
    /// `None` (§0.3 "no `Platform::detect()`"-style rule: hosts supply
    /// their own starting layout rather than the manager inventing one).
    pub fn new(initial_layout: Option<DockNode>) -> Self {
        let mut manager = Self {
            arena: HashMap::default(),
            id_index: HashMap::default(),
            root: 0,
            active_panels: HashMap::default(),
            maximized: None,
            instance_id: crate::ids::fresh_default(),
            next_key: 0,
            events: EventBus::new(),
        };
        let layout = initial_layout.unwrap_or_else(DockNode::empty_panel);
        manager.root = manager.insert_dock_node(layout);
        manager.recalculate_active_panels();
        manager
    }

    pub fn subscribe(&self, handler: impl FnMut(&DockEvent) + 'static) -> u64 {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, token: u64) {
        self.events.unsubscribe(token);
    }

    /// A read-only copy of the current tree (§9 "snapshots are returned
    /// by copy so observers never mutate owned state").
    pub fn snapshot(&self) -> DockNode {
        self.build_dock_node(self.root)
    }

    pub fn maximized_panel_id(&self) -> Option<&str> {
        self.maximized.map(|key| self.arena[&key].id())
    }

    fn alloc_key(&mut self) -> NodeKey {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    fn insert_dock_node(&mut self, node: DockNode) -> NodeKey {
        match node {
            DockNode::Panel { id, title, content_key, content } => {
                let id = if id.is_empty() { crate::ids::fresh_default() } else { id };
                let key = self.alloc_key();
                self.arena.insert(key, NodeData::Panel { id: id.clone(), title, content_key, content });
                self.id_index.insert(id, key);
                key
            }
            DockNode::Container { id, split, first, second, size } => {
                let first_key = self.insert_dock_node(*first);
                let second_key = self.insert_dock_node(*second);
                let id = if id.is_empty() { crate::ids::fresh_default() } else { id };
                let key = self.alloc_key();
                self.arena.insert(key, NodeData::Container { id, split, first: first_key, second: second_key, size: size.clamp(0.1, 0.9) });
                key
            }
            DockNode::TabContainer { id, panels, active_id } => {
                let panel_keys: Vec<NodeKey> = panels.into_iter().map(|p| self.insert_dock_node(p)).collect();
                let active_key = panel_keys
                    .iter()
                    .copied()
                    .find(|k| self.arena[k].id() == active_id)
                    .unwrap_or(*panel_keys.first().expect("TabContainer panels is non-empty"));
                let id = if id.is_empty() { crate::ids::fresh_default() } else { id };
                let key = self.alloc_key();
                self.arena.insert(key, NodeData::TabContainer { id, panels: panel_keys, active: active_key });
                key
            }
        }
    }

    fn build_dock_node(&self, key: NodeKey) -> DockNode {
        match &self.arena[&key] {
            NodeData::Panel { id, title, content_key, content } => {
                DockNode::Panel { id: id.clone(), title: title.clone(), content_key: content_key.clone(), content: content.clone() }
            }
            NodeData::Container { id, split, first, second, size } => DockNode::Container {
                id: id.clone(),
                split: *split,
                first: Box::new(self.build_dock_node(*first)),
                second: Box::new(self.build_dock_node(*second)),
                size: *size,
            },
            NodeData::TabContainer { id, panels, active } => DockNode::TabContainer {
                id: id.clone(),
                panels: panels.iter().map(|p| self.build_dock_node(*p)).collect(),
                active_id: self.arena[active].id().to_owned(),
            },
        }
    }

    fn find_parent(&self, target: NodeKey) -> Option<ParentRef> {
        if self.root == target {
            return Some(ParentRef::Root);
        }
        self.find_parent_rec(self.root, target)
    }

    fn find_parent_rec(&self, current: NodeKey, target: NodeKey) -> Option<ParentRef> {
        match self.arena.get(&current)? {
            NodeData::Panel { .. } => None,
            NodeData::Container { first, second, .. } => {
                if *first == target {
                    return Some(ParentRef::Container { parent: current, is_first: true });
                }
                if *second == target {
                    return Some(ParentRef::Container { parent: current, is_first: false });
                }
                self.find_parent_rec(*first, target).or_else(|| self.find_parent_rec(*second, target))
            }
            NodeData::TabContainer { panels, .. } => {
                panels.iter().position(|p| *p == target).map(|index| ParentRef::Tab { parent: current, index })
            }
        }
    }

    fn set_child(&mut self, parent_ref: ParentRef, new_key: NodeKey) {
        match parent_ref {
            ParentRef::Root => self.root = new_key,
            ParentRef::Container { parent, is_first } => {
                if let Some(NodeData::Container { first, second, .. }) = self.arena.get_mut(&parent) {
                    if is_first {
                        *first = new_key;
                    } else {
                        *second = new_key;
                    }
                }
            }
            ParentRef::Tab { parent, index } => {
                if let Some(NodeData::TabContainer { panels, .. }) = self.arena.get_mut(&parent) {
                    if index < panels.len() {
                        panels[index] = new_key;
                    }
                }
            }
        }
    }

    fn replace_with(&mut self, old_key: NodeKey, new_key: NodeKey) {
        if self.root == old_key {
            self.root = new_key;
            return;
        }
        if let Some(parent_ref) = self.find_parent(old_key) {
            self.set_child(parent_ref, new_key);
        }
    }

    /// Unlinks `key` from wherever it sits, collapsing a now-single-child
    /// Container or now-single-panel TabContainer (invariants 2, 3). Does
    /// not remove `key`'s own arena entry — callers either reinsert it
    /// elsewhere or remove it themselves.
    fn detach(&mut self, key: NodeKey) {
        match self.find_parent(key) {
            None | Some(ParentRef::Root) => {}
            Some(ParentRef::Container { parent, is_first }) => {
                let sibling = match self.arena.get(&parent) {
                    Some(NodeData::Container { first, second, .. }) => {
                        if is_first {
                            *second
                        } else {
                            *first
                        }
                    }
                    _ => return,
                };
                self.arena.remove(&parent);
                self.replace_with(parent, sibling);
            }
            Some(ParentRef::Tab { parent, index }) => {
                let collapse_to = if let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&parent) {
                    panels.remove(index);
                    if panels.len() == 1 {
                        Some(panels[0])
                    } else {
                        if !panels.contains(active) {
                            *active = panels[0];
                        }
                        None
                    }
                } else {
                    None
                };
                if let Some(sole) = collapse_to {
                    self.arena.remove(&parent);
                    self.active_panels.remove(&parent);
                    self.replace_with(parent, sole);
                } else if let Some(NodeData::TabContainer { active, .. }) = self.arena.get(&parent) {
                    self.active_panels.insert(parent, *active);
                }
            }
        }
    }

    fn wrap_tab(&mut self, target_key: NodeKey, source_key: NodeKey, source_first: bool) -> NodeKey {
        let tab_key = self.alloc_key();
        let panels = if source_first { vec![source_key, target_key] } else { vec![target_key, source_key] };
        self.arena.insert(tab_key, NodeData::TabContainer { id: crate::ids::fresh_default(), panels, active: source_key });
        self.replace_with(target_key, tab_key);
        tab_key
    }

    fn collect_panel_titles(&self) -> HashSet<String> {
        self.arena
            .values()
            .filter_map(|n| match n {
                NodeData::Panel { title, .. } => Some(title.clone().unwrap_or_else(|| "Panel".to_owned())),
                _ => None,
            })
            .collect()
    }

    fn new_panel(&mut self, content_key: Option<String>, title: Option<String>) -> NodeKey {
        let id = crate::ids::fresh_default();
        let title = title.unwrap_or_else(|| crate::ids::unique_name("Panel", &self.collect_panel_titles()));
        let key = self.alloc_key();
        self.arena.insert(key, NodeData::Panel { id: id.clone(), title: Some(title), content_key, content: None });
        self.id_index.insert(id, key);
        key
    }

    /// Ensures every TabContainer's `active` member still exists
    /// (preferring the previously recorded active id, else the first
    /// panel), drops stale `active_panels` entries, and clears
    /// `maximizedPanelId` if it no longer names a Panel.
    fn recalculate_active_panels(&mut self) {
        let tab_keys: Vec<NodeKey> = self.arena.iter().filter_map(|(k, v)| matches!(v, NodeData::TabContainer { .. }).then_some(*k)).collect();
        for tab_key in tab_keys {
            let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get(&tab_key) else { continue };
            if panels.contains(active) {
                self.active_panels.insert(tab_key, *active);
                continue;
            }
            let resolved = self.active_panels.get(&tab_key).copied().filter(|p| panels.contains(p)).unwrap_or(panels[0]);
            if let Some(NodeData::TabContainer { active, .. }) = self.arena.get_mut(&tab_key) {
                *active = resolved;
            }
            self.active_panels.insert(tab_key, resolved);
        }
        self.active_panels.retain(|k, _| self.arena.contains_key(k));
        if let Some(max_key) = self.maximized {
            if !matches!(self.arena.get(&max_key), Some(NodeData::Panel { .. })) {
                self.maximized = None;
            }
        }
    }

    fn validate_move_target(&self, target_key: NodeKey, position: DropIntent) -> bool {
        match (self.arena.get(&target_key), position) {
            (Some(NodeData::Container { .. }), DropIntent::TabInto | DropIntent::TabBefore | DropIntent::TabAfter) => false,
            (Some(_), _) => true,
            (None, _) => false,
        }
    }

    /// Creates a Panel with a unique title and wires it into the tree per
    /// the root-kind rules in §4.F; returns its id.
    pub fn add_panel(&mut self, content_key: Option<String>, title: Option<String>) -> String {
        let panel_key = self.new_panel(content_key, title);
        let panel_id = self.arena[&panel_key].id().to_owned();

        match self.arena.get(&self.root) {
            Some(NodeData::Panel { .. }) => {
                let old_root = self.root;
                let container_key = self.alloc_key();
                self.arena.insert(
                    container_key,
                    NodeData::Container { id: crate::ids::fresh_default(), split: SplitDirection::Horizontal, first: old_root, second: panel_key, size: 0.5 },
                );
                self.root = container_key;
            }
            Some(NodeData::Container { second, .. }) => {
                let old_second = *second;
                let vertical_key = self.alloc_key();
                self.arena.insert(
                    vertical_key,
                    NodeData::Container { id: crate::ids::fresh_default(), split: SplitDirection::Vertical, first: old_second, second: panel_key, size: 0.5 },
                );
                if let Some(NodeData::Container { second, .. }) = self.arena.get_mut(&self.root) {
                    *second = vertical_key;
                }
            }
            Some(NodeData::TabContainer { .. }) => {
                let root = self.root;
                if let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&root) {
                    panels.push(panel_key);
                    *active = panel_key;
                }
                self.active_panels.insert(root, panel_key);
            }
            None => unreachable!("root always has an arena entry"),
        }

        self.recalculate_active_panels();
        log::debug!("add_panel: {panel_id}");
        self.events.emit(&DockEvent::PanelAdded { id: panel_id.clone() });
        self.events.emit(&DockEvent::LayoutChanged);
        panel_id
    }

    /// Wraps `target` into a TabContainer with a new panel, or appends to
    /// it if it's already one. Returns the new panel's id, or `None` if
    /// `target` doesn't exist.
    pub fn add_tab(&mut self, target_id: &str, content_key: Option<String>, title: Option<String>) -> Option<String> {
        let &target_key = self.id_index.get(target_id)?;
        let panel_key = self.new_panel(content_key, title);
        let panel_id = self.arena[&panel_key].id().to_owned();

        match self.arena.get(&target_key) {
            Some(NodeData::Panel { .. }) => {
                let tab_key = self.alloc_key();
                self.arena.insert(tab_key, NodeData::TabContainer { id: crate::ids::fresh_default(), panels: vec![target_key, panel_key], active: panel_key });
                self.replace_with(target_key, tab_key);
                self.active_panels.insert(tab_key, panel_key);
            }
            Some(NodeData::TabContainer { .. }) => {
                if let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&target_key) {
                    panels.push(panel_key);
                    *active = panel_key;
                }
                self.active_panels.insert(target_key, panel_key);
            }
            _ => {
                self.arena.remove(&panel_key);
                self.id_index.remove(&panel_id);
                return None;
            }
        }

        self.recalculate_active_panels();
        log::debug!("add_tab: {panel_id} onto {target_id}");
        self.events.emit(&DockEvent::PanelAdded { id: panel_id.clone() });
        self.events.emit(&DockEvent::LayoutChanged);
        Some(panel_id)
    }

    /// Removes the panel with `id`. Fails if it doesn't exist or is the
    /// sole remaining node (a tree must always have a root).
    pub fn remove_panel(&mut self, panel_id: &str) -> bool {
        let Some(&panel_key) = self.id_index.get(panel_id) else { return false };
        if !matches!(self.arena.get(&panel_key), Some(NodeData::Panel { .. })) {
            return false;
        }
        if self.arena.len() == 1 {
            log::warn!("remove_panel rejected: {panel_id} is the sole remaining node");
            return false;
        }

        if self.maximized == Some(panel_key) {
            self.maximized = None;
        }

        self.detach(panel_key);
        self.arena.remove(&panel_key);
        self.id_index.remove(panel_id);
        self.recalculate_active_panels();

        log::debug!("remove_panel: {panel_id}");
        self.events.emit(&DockEvent::PanelRemoved { id: panel_id.to_owned() });
        self.events.emit(&DockEvent::LayoutChanged);
        true
    }

    /// Moves `source_id` to `position` relative to `target_id`. See §4.F
    /// for the full precondition and reorder-in-place rules.
    pub fn move_panel(&mut self, source_id: &str, target_id: &str, position: DropIntent) -> bool {
        if self.maximized.is_some() {
            return false;
        }
        if source_id == target_id {
            return false;
        }
        let Some(&source_key) = self.id_index.get(source_id) else { return false };
        let Some(&target_key) = self.id_index.get(target_id) else { return false };
        if !matches!(self.arena.get(&source_key), Some(NodeData::Panel { .. })) {
            return false;
        }
        if !self.validate_move_target(target_key, position) {
            return false;
        }

        if matches!(position, DropIntent::TabBefore | DropIntent::TabAfter | DropIntent::TabInto) {
            if let (Some(ParentRef::Tab { parent: source_tab, index: source_index }), Some(ParentRef::Tab { parent: target_tab, index: target_index })) =
                (self.find_parent(source_key), self.find_parent(target_key))
            {
                if source_tab == target_tab {
                    self.reorder_tab_in_place(source_tab, source_index, target_index, position);
                    log::debug!("move_panel: reorder {source_id} within tab container");
                    self.events.emit(&DockEvent::PanelMoved { source: source_id.to_owned(), target: target_id.to_owned(), position });
                    self.events.emit(&DockEvent::LayoutChanged);
                    return true;
                }
            }
        }

        let target_is_tab_container = matches!(self.arena.get(&target_key), Some(NodeData::TabContainer { .. }));
        self.detach(source_key);

        match position {
            DropIntent::TabInto if target_is_tab_container => {
                if let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&target_key) {
                    panels.push(source_key);
                    *active = source_key;
                }
                self.active_panels.insert(target_key, source_key);
            }
            DropIntent::TabInto => {
                let tab_key = self.wrap_tab(target_key, source_key, false);
                self.active_panels.insert(tab_key, source_key);
            }
            DropIntent::TabBefore | DropIntent::TabAfter => match self.find_parent(target_key) {
                Some(ParentRef::Tab { parent: tab_key, index }) => {
                    let insert_index = if position == DropIntent::TabBefore { index } else { index + 1 };
                    if let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&tab_key) {
                        let insert_index = insert_index.min(panels.len());
                        panels.insert(insert_index, source_key);
                        *active = source_key;
                    }
                    self.active_panels.insert(tab_key, source_key);
                }
                _ if target_is_tab_container => {
                    let insert_index = if position == DropIntent::TabBefore { 0 } else { usize::MAX };
                    if let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&target_key) {
                        let insert_index = insert_index.min(panels.len());
                        panels.insert(insert_index, source_key);
                        *active = source_key;
                    }
                    self.active_panels.insert(target_key, source_key);
                }
                _ => {
                    let source_first = position == DropIntent::TabBefore;
                    let tab_key = self.wrap_tab(target_key, source_key, source_first);
                    self.active_panels.insert(tab_key, source_key);
                }
            },
            DropIntent::Top | DropIntent::Bottom | DropIntent::Left | DropIntent::Right => {
                let split = if matches!(position, DropIntent::Left | DropIntent::Right) { SplitDirection::Horizontal } else { SplitDirection::Vertical };
                let (first, second) = match position {
                    DropIntent::Top | DropIntent::Left => (source_key, target_key),
                    _ => (target_key, source_key),
                };
                let container_key = self.alloc_key();
                self.arena.insert(container_key, NodeData::Container { id: crate::ids::fresh_default(), split, first, second, size: 0.5 });
                self.replace_with(target_key, container_key);
            }
        }

        self.recalculate_active_panels();
        log::debug!("move_panel: {source_id} -> {target_id} ({position:?})");
        self.events.emit(&DockEvent::PanelMoved { source: source_id.to_owned(), target: target_id.to_owned(), position });
        self.events.emit(&DockEvent::LayoutChanged);
        true
    }

    fn reorder_tab_in_place(&mut self, tab_key: NodeKey, source_index: usize, target_index: usize, position: DropIntent) {
        let Some(NodeData::TabContainer { panels, active, .. }) = self.arena.get_mut(&tab_key) else { return };
        let source_panel = panels.remove(source_index);
        let mut insert_at = if source_index < target_index { target_index - 1 } else { target_index };
        if matches!(position, DropIntent::TabAfter | DropIntent::TabInto) {
            insert_at += 1;
        }
        let insert_at = insert_at.min(panels.len());
        panels.insert(insert_at, source_panel);
        *active = source_panel;
        self.active_panels.insert(tab_key, source_panel);
    }

    /// Clamps `new_size` to `[0.1, 0.9]`. Fails while a panel is
    /// maximized or `node_id` isn't a Container.
    pub fn resize_container(&mut self, node_id: &str, new_size: f32) -> bool {
        if self.maximized.is_some() {
            return false;
        }
        let Some(&key) = self.id_index.get(node_id) else { return false };
        let clamped = new_size.clamp(0.1, 0.9);
        if let Some(NodeData::Container { size, .. }) = self.arena.get_mut(&key) {
            *size = clamped;
            self.events.emit(&DockEvent::Resize { node: node_id.to_owned(), size: clamped });
            self.events.emit(&DockEvent::LayoutChanged);
            true
        } else {
            false
        }
    }

    /// Sets the active member of `panel_id`'s enclosing TabContainer.
    /// No-op (returns `false`) if the panel has no TabContainer ancestor.
    pub fn activate_panel(&mut self, panel_id: &str) -> bool {
        let Some(&panel_key) = self.id_index.get(panel_id) else { return false };
        if !matches!(self.arena.get(&panel_key), Some(NodeData::Panel { .. })) {
            return false;
        }
        let Some(ParentRef::Tab { parent: tab_key, .. }) = self.find_parent(panel_key) else { return false };
        if let Some(NodeData::TabContainer { active, .. }) = self.arena.get_mut(&tab_key) {
            *active = panel_key;
        }
        self.active_panels.insert(tab_key, panel_key);
        let tab_id = self.arena[&tab_key].id().to_owned();
        self.events.emit(&DockEvent::ActivePanelChanged { tab_container: tab_id, panel: panel_id.to_owned() });
        true
    }

    pub fn maximize(&mut self, panel_id: &str) -> bool {
        let Some(&panel_key) = self.id_index.get(panel_id) else { return false };
        if !matches!(self.arena.get(&panel_key), Some(NodeData::Panel { .. })) {
            return false;
        }
        self.maximized = Some(panel_key);
        self.events.emit(&DockEvent::PanelMaximized { id: panel_id.to_owned() });
        true
    }

    pub fn restore(&mut self) -> bool {
        let Some(panel_key) = self.maximized.take() else { return false };
        let id = self.arena[&panel_key].id().to_owned();
        self.events.emit(&DockEvent::PanelRestored { id });
        true
    }

    pub fn update_panel_content_key(&mut self, panel_id: &str, content_key: Option<String>) -> bool {
        let Some(&key) = self.id_index.get(panel_id) else { return false };
        if let Some(NodeData::Panel { content_key: ck, .. }) = self.arena.get_mut(&key) {
            *ck = content_key;
            self.events.emit(&DockEvent::PanelEdited { id: panel_id.to_owned() });
            true
        } else {
            false
        }
    }

    pub fn update_panel_title(&mut self, panel_id: &str, title: Option<String>) -> bool {
        let Some(&key) = self.id_index.get(panel_id) else { return false };
        if let Some(NodeData::Panel { title: t, .. }) = self.arena.get_mut(&key) {
            *t = title;
            self.events.emit(&DockEvent::PanelEdited { id: panel_id.to_owned() });
            self.events.emit(&DockEvent::LayoutChanged);
            true
        } else {
            false
        }
    }
}

/// Walks the tree checking the six invariants in §3: unique ids, no
/// degenerate Containers/TabContainers, every TabContainer's `active`
/// member exists, and a sane `maximizedPanelId`.
pub mod invariants {
    use super::{DockTreeManager, NodeData, NodeKey};

    pub fn check(manager: &DockTreeManager) -> Result<(), String> {
        let mut seen_ids = std::collections::HashSet::new();
        check_node(manager, manager.root, &mut seen_ids)?;
        if let Some(max_key) = manager.maximized {
            if !matches!(manager.arena.get(&max_key), Some(NodeData::Panel { .. })) {
                return Err("maximizedPanelId does not reference an existing panel".to_owned());
            }
        }
        Ok(())
    }

    fn check_node(manager: &DockTreeManager, key: NodeKey, seen_ids: &mut std::collections::HashSet<String>) -> Result<(), String> {
        let Some(node) = manager.arena.get(&key) else {
            return Err(format!("dangling node key {key}"));
        };
        if !seen_ids.insert(node.id().to_owned()) {
            return Err(format!("duplicate id {}", node.id()));
        }
        match node {
            NodeData::Panel { .. } => Ok(()),
            NodeData::Container { first, second, .. } => {
                check_node(manager, *first, seen_ids)?;
                check_node(manager, *second, seen_ids)
            }
            NodeData::TabContainer { panels, active, id, .. } => {
                if panels.len() < 2 {
                    return Err(format!("TabContainer {id} has fewer than 2 panels"));
                }
                if !panels.contains(active) {
                    return Err(format!("TabContainer {id} activeId does not reference a member panel"));
                }
                for panel in panels {
                    check_node(manager, *panel, seen_ids)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_panel(id: &str, title: &str) -> DockNode {
        DockNode::Panel { id: id.to_owned(), title: Some(title.to_owned()), content_key: None, content: None }
    }

    fn two_panel_manager() -> DockTreeManager {
        DockTreeManager::new(Some(named_panel("A", "A")))
    }

    #[test]
    fn split_scenario() {
        let mut dock = two_panel_manager();
        dock.add_panel(Some("k".to_owned()), Some("B".to_owned()));
        invariants::check(&dock).unwrap();
        let b_id = match dock.snapshot() {
            DockNode::Container { split: SplitDirection::Horizontal, first, second, size, .. } => {
                assert_eq!(first.as_ref(), &named_panel("A", "A"));
                assert_eq!(size, 0.5);
                match *second {
                    DockNode::Panel { id, .. } => id,
                    _ => panic!("expected panel"),
                }
            }
            other => panic!("expected Container, got {other:?}"),
        };

        assert!(dock.move_panel(&b_id, "A", DropIntent::Right));
        invariants::check(&dock).unwrap();
        let DockNode::Container { split: SplitDirection::Horizontal, .. } = dock.snapshot() else {
            panic!("expected horizontal container after moving right onto A");
        };

        assert!(dock.move_panel(&b_id, "A", DropIntent::Bottom));
        invariants::check(&dock).unwrap();
        let DockNode::Container { split: SplitDirection::Vertical, first, second, .. } = dock.snapshot() else {
            panic!("expected vertical container after moving bottom onto A");
        };
        assert!(matches!(first.as_ref(), DockNode::Panel { id, .. } if id == "A"));
        assert!(matches!(second.as_ref(), DockNode::Panel { .. }));
    }

    #[test]
    fn tabify_scenario() {
        let mut dock = two_panel_manager();
        dock.add_panel(Some("k".to_owned()), Some("B".to_owned()));
        let b_id = match dock.snapshot() {
            DockNode::Container { second, .. } => match *second {
                DockNode::Panel { id, .. } => id,
                _ => panic!("expected panel"),
            },
            _ => panic!("expected container"),
        };

        assert!(dock.move_panel(&b_id, "A", DropIntent::TabInto));
        invariants::check(&dock).unwrap();
        match dock.snapshot() {
            DockNode::TabContainer { panels, active_id, .. } => {
                assert_eq!(panels.len(), 2);
                assert!(matches!(&panels[0], DockNode::Panel{id,..} if id=="A"));
                assert_eq!(active_id, b_id);
            }
            other => panic!("expected TabContainer, got {other:?}"),
        }
    }

    #[test]
    fn tab_reorder_in_place_no_detach() {
        let mut dock = DockTreeManager::new(Some(DockNode::TabContainer {
            id: "tabs".to_owned(),
            panels: vec![named_panel("A", "A"), named_panel("B", "B"), named_panel("C", "C")],
            active_id: "A".to_owned(),
        }));

        assert!(dock.move_panel("C", "A", DropIntent::TabBefore));
        invariants::check(&dock).unwrap();
        match dock.snapshot() {
            DockNode::TabContainer { panels, active_id, .. } => {
                let ids: Vec<&str> = panels
                    .iter()
                    .map(|p| match p {
                        DockNode::Panel { id, .. } => id.as_str(),
                        _ => panic!("expected panel"),
                    })
                    .collect();
                assert_eq!(ids, vec!["C", "A", "B"]);
                assert_eq!(active_id, "C");
            }
            other => panic!("expected TabContainer, got {other:?}"),
        }
    }

    #[test]
    fn remove_collapses_tab_container_into_sole_panel() {
        let mut dock = DockTreeManager::new(Some(DockNode::Container {
            id: "root".to_owned(),
            split: SplitDirection::Horizontal,
            first: Box::new(named_panel("X", "X")),
            second: Box::new(DockNode::TabContainer {
                id: "tabs".to_owned(),
                panels: vec![named_panel("A", "A"), named_panel("B", "B")],
                active_id: "A".to_owned(),
            }),
            size: 0.5,
        }));

        assert!(dock.remove_panel("A"));
        invariants::check(&dock).unwrap();
        match dock.snapshot() {
            DockNode::Container { first, second, .. } => {
                assert!(matches!(first.as_ref(), DockNode::Panel { id, .. } if id == "X"));
                assert!(matches!(second.as_ref(), DockNode::Panel { id, .. } if id == "B"));
            }
            other => panic!("expected Container with collapsed right side, got {other:?}"),
        }
    }

    #[test]
    fn move_rejected_while_maximized_leaves_tree_unchanged() {
        let mut dock = two_panel_manager();
        dock.add_panel(None, Some("B".to_owned()));
        let before = match dock.snapshot() {
            DockNode::Container { first, second, size, .. } => (first, second, size),
            _ => panic!("expected container"),
        };

        assert!(dock.maximize("A"));
        assert!(!dock.move_panel("B", "A", DropIntent::Bottom));
        assert!(!dock.resize_container("not-a-node", 0.7));

        match dock.snapshot() {
            DockNode::Container { first, second, size, .. } => {
                assert_eq!(first, before.0);
                assert_eq!(second, before.1);
                assert_eq!(size, before.2);
            }
            other => panic!("expected Container unchanged, got {other:?}"),
        }
    }

    #[test]
    fn tab_into_a_container_target_is_rejected() {
        let mut dock = two_panel_manager();
        dock.add_panel(None, Some("B".to_owned()));
        let root_id = match dock.snapshot() {
            DockNode::Container { id, .. } => id,
            _ => panic!("expected container"),
        };
        assert!(!dock.move_panel("A", &root_id, DropIntent::TabInto));
    }

    #[test]
    fn unique_titles_are_assigned_when_none_given() {
        let mut dock = two_panel_manager();
        dock.add_panel(None, None);
        dock.add_panel(None, None);

        let mut titles = Vec::new();
        collect_titles(&dock.snapshot(), &mut titles);
        titles.sort();
        assert_eq!(titles, vec!["A", "Panel", "Panel (2)"]);
    }

    fn collect_titles(node: &DockNode, out: &mut Vec<String>) {
        match node {
            DockNode::Panel { title, .. } => out.push(title.clone().unwrap_or_default()),
            DockNode::Container { first, second, .. } => {
                collect_titles(first, out);
                collect_titles(second, out);
            }
            DockNode::TabContainer { panels, .. } => {
                for p in panels {
                    collect_titles(p, out);
                }
            }
        }
    }

    #[test]
    fn activate_panel_updates_tab_container_active() {
        let mut dock = DockTreeManager::new(Some(DockNode::TabContainer {
            id: "tabs".to_owned(),
            panels: vec![named_panel("A", "A"), named_panel("B", "B")],
            active_id: "A".to_owned(),
        }));
        assert!(dock.activate_panel("B"));
        match dock.snapshot() {
            DockNode::TabContainer { active_id, .. } => assert_eq!(active_id, "B"),
            other => panic!("expected TabContainer, got {other:?}"),
        }
        assert!(!dock.activate_panel("missing"));
    }

    #[test]
    fn event_bus_emits_granular_events_before_layout_changed() {
        let mut dock = two_panel_manager();
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log2 = log.clone();
        dock.subscribe(move |event| log2.borrow_mut().push(event.clone()));

        dock.add_panel(None, Some("B".to_owned()));
        let events = log.borrow();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DockEvent::PanelAdded { .. }));
        assert_eq!(events[1], DockEvent::LayoutChanged);
    }

    #[test]
    fn remove_last_panel_rejected() {
        let mut dock = two_panel_manager();
        assert!(!dock.remove_panel("A"));
    }
}
