//! Content-binding layer: maps a panel to the thing it renders, and
//! translates dock events into the host's named callback surface (§4.G).
//!
//! Grounded on the teacher's `PaneRegistry` (`multi_viewport/pane_registry.rs`):
//! a small key-indexed lookup table the host populates, with the core only
//! ever handling opaque keys rather than the renderable content itself.

use ahash::HashMap;

use crate::dock::DockEvent;

/// What a descriptor resolves to. `PanelComponent` carries the "panel
/// component" marker from §4.G: when a panel switches to a descriptor of
/// this kind, the host must re-key the rendered instance on the panel's
/// `contentKey` so no state leaks from the previous descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Static(String),
    PanelComponent(String),
}

/// One entry of `availableContents` (§4.G).
#[derive(Clone, Debug, PartialEq)]
pub struct ContentDescriptor {
    pub key: String,
    pub label: String,
    pub content: Content,
}

/// What a lookup resolved to, and whether the host should re-key the
/// rendered instance.
#[derive(Debug, PartialEq)]
pub enum Resolved<'a> {
    Descriptor { descriptor: &'a ContentDescriptor, instance_key: Option<&'a str> },
    Embedded(&'a str),
    None,
}

/// The host-populated table of available contents, plus the lookup rule
/// from §4.G.
#[derive(Default)]
pub struct ContentRegistry {
    descriptors: Vec<ContentDescriptor>,
    by_key: HashMap<String, usize>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the descriptor at `descriptor.key`.
    pub fn register(&mut self, descriptor: ContentDescriptor) {
        if let Some(&index) = self.by_key.get(&descriptor.key) {
            self.descriptors[index] = descriptor;
        } else {
            self.by_key.insert(descriptor.key.clone(), self.descriptors.len());
            self.descriptors.push(descriptor);
        }
    }

    pub fn unregister(&mut self, key: &str) {
        let Some(index) = self.by_key.remove(key) else { return };
        self.descriptors.remove(index);
        for value in self.by_key.values_mut() {
            if *value > index {
                *value -= 1;
            }
        }
    }

    /// The descriptor list as offered to the host, in registration order.
    pub fn available_contents(&self) -> &[ContentDescriptor] {
        &self.descriptors
    }

    /// The lookup rule: the descriptor named by `content_key`, falling
    /// back to the panel's own embedded content. `instance_key` is set
    /// only when the resolved descriptor is a `PanelComponent`, signaling
    /// the host to key the rendered instance on `content_key`.
    pub fn resolve<'a>(&'a self, content_key: Option<&'a str>, embedded_content: Option<&'a str>) -> Resolved<'a> {
        if let Some(key) = content_key {
            if let Some(&index) = self.by_key.get(key) {
                let descriptor = &self.descriptors[index];
                let instance_key = matches!(descriptor.content, Content::PanelComponent(_)).then_some(key);
                return Resolved::Descriptor { descriptor, instance_key };
            }
        }
        match embedded_content {
            Some(content) => Resolved::Embedded(content),
            None => Resolved::None,
        }
    }
}

/// The host's named callback surface (§4.G). The binding layer forwards
/// each applicable [`DockEvent`] to exactly one of these; `PanelAdded`,
/// `PanelEdited`, and `LayoutChanged` have no corresponding callback and
/// are dropped.
pub trait ContentCallbacks {
    fn on_move(&mut self, source_id: &str, target_id: &str, position: crate::drop_intent::DropIntent);
    fn on_remove(&mut self, id: &str);
    fn on_maximize(&mut self, id: &str);
    fn on_restore(&mut self, id: &str);
    fn on_activate(&mut self, id: &str);
    fn on_resize(&mut self, node_id: &str, size: f32);
}

/// Forwards `event` to the matching [`ContentCallbacks`] method, if any.
pub fn dispatch(event: &DockEvent, callbacks: &mut impl ContentCallbacks) {
    match event {
        DockEvent::PanelMoved { source, target, position } => callbacks.on_move(source, target, *position),
        DockEvent::PanelRemoved { id } => callbacks.on_remove(id),
        DockEvent::PanelMaximized { id } => callbacks.on_maximize(id),
        DockEvent::PanelRestored { id } => callbacks.on_restore(id),
        DockEvent::ActivePanelChanged { panel, .. } => callbacks.on_activate(panel),
        DockEvent::Resize { node, size } => callbacks.on_resize(node, *size),
        DockEvent::PanelAdded { .. } | DockEvent::PanelEdited { .. } | DockEvent::LayoutChanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drop_intent::DropIntent;

    fn descriptor(key: &str, content: Content) -> ContentDescriptor {
        ContentDescriptor { key: key.to_owned(), label: key.to_owned(), content }
    }

    #[test]
    fn resolve_finds_registered_descriptor_by_content_key() {
        let mut registry = ContentRegistry::new();
        registry.register(descriptor("canvas", Content::Static("canvas-view".to_owned())));

        let resolved = registry.resolve(Some("canvas"), None);
        assert_eq!(resolved, Resolved::Descriptor { descriptor: &registry.descriptors[0], instance_key: None });
    }

    #[test]
    fn resolve_falls_back_to_embedded_content_when_key_unregistered() {
        let registry = ContentRegistry::new();
        let resolved = registry.resolve(Some("missing"), Some("raw-markup"));
        assert_eq!(resolved, Resolved::Embedded("raw-markup"));
    }

    #[test]
    fn resolve_is_none_with_neither_key_nor_embedded_content() {
        let registry = ContentRegistry::new();
        assert_eq!(registry.resolve(None, None), Resolved::None);
    }

    #[test]
    fn panel_component_marker_produces_an_instance_key_for_rekeying() {
        let mut registry = ContentRegistry::new();
        registry.register(descriptor("editor", Content::PanelComponent("EditorView".to_owned())));

        match registry.resolve(Some("editor"), None) {
            Resolved::Descriptor { instance_key, .. } => assert_eq!(instance_key, Some("editor")),
            other => panic!("expected Descriptor, got {other:?}"),
        }
    }

    #[test]
    fn register_replaces_existing_entry_at_the_same_key() {
        let mut registry = ContentRegistry::new();
        registry.register(descriptor("canvas", Content::Static("v1".to_owned())));
        registry.register(descriptor("canvas", Content::Static("v2".to_owned())));
        assert_eq!(registry.available_contents().len(), 1);
        assert_eq!(registry.available_contents()[0].content, Content::Static("v2".to_owned()));
    }

    #[test]
    fn unregister_removes_entry_and_keeps_remaining_lookups_valid() {
        let mut registry = ContentRegistry::new();
        registry.register(descriptor("a", Content::Static("a".to_owned())));
        registry.register(descriptor("b", Content::Static("b".to_owned())));
        registry.unregister("a");
        assert_eq!(registry.available_contents().len(), 1);
        assert!(matches!(registry.resolve(Some("b"), None), Resolved::Descriptor { .. }));
    }

    struct RecordingCallbacks {
        calls: Vec<String>,
    }

    impl ContentCallbacks for RecordingCallbacks {
        fn on_move(&mut self, source_id: &str, target_id: &str, position: DropIntent) {
            self.calls.push(format!("move {source_id} {target_id} {position:?}"));
        }
        fn on_remove(&mut self, id: &str) {
            self.calls.push(format!("remove {id}"));
        }
        fn on_maximize(&mut self, id: &str) {
            self.calls.push(format!("maximize {id}"));
        }
        fn on_restore(&mut self, id: &str) {
            self.calls.push(format!("restore {id}"));
        }
        fn on_activate(&mut self, id: &str) {
            self.calls.push(format!("activate {id}"));
        }
        fn on_resize(&mut self, node_id: &str, size: f32) {
            self.calls.push(format!("resize {node_id} {size}"));
        }
    }

    #[test]
    fn dispatch_forwards_applicable_events_and_drops_the_rest() {
        let mut callbacks = RecordingCallbacks { calls: Vec::new() };
        dispatch(&DockEvent::PanelMoved { source: "a".to_owned(), target: "b".to_owned(), position: DropIntent::Right }, &mut callbacks);
        dispatch(&DockEvent::PanelRemoved { id: "a".to_owned() }, &mut callbacks);
        dispatch(&DockEvent::PanelAdded { id: "c".to_owned() }, &mut callbacks);
        dispatch(&DockEvent::LayoutChanged, &mut callbacks);

        assert_eq!(callbacks.calls, vec!["move a b Right".to_owned(), "remove a".to_owned()]);
    }
}
