//! Key event → command dispatch, with scoped enable/disable (§4.D).

use ahash::HashMap;

/// Which OS family the host runs on, for the `ctrl`/`meta` substitution and
/// the `⌘/⌥/⇧` display convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

/// Modifier flags of a key combination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A named command a binding triggers (e.g. `"history.undo"`,
/// `"tool.pencil"`, `"brush.size.3"`).
pub type Command = String;

/// One hotkey binding.
#[derive(Clone, Debug)]
pub struct Binding {
    pub command: Command,
    pub key: String,
    pub modifiers: Modifiers,
    pub description: String,
}

/// Which kind of element a key event targeted, for the text-entry
/// suppression rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    TextInput,
    TextArea,
    ContentEditable,
    Other,
}

impl EventTarget {
    fn is_text_entry(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea | Self::ContentEditable)
    }
}

/// A single key event as the host reports it.
#[derive(Clone, Debug)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
    pub target: EventTarget,
}

fn modifiers_match(platform: Platform, want: Modifiers, got: Modifiers) -> bool {
    if platform == Platform::MacOs {
        // ctrl and meta are interchangeable on macOS: either side alone
        // satisfies a `ctrl` requirement, so meta isn't checked separately.
        want.ctrl == (got.ctrl || got.meta) && want.shift == got.shift && want.alt == got.alt
    } else {
        want.ctrl == got.ctrl && want.shift == got.shift && want.alt == got.alt && want.meta == got.meta
    }
}

fn binding_matches(platform: Platform, binding: &Binding, event: &KeyEvent) -> bool {
    binding.key.eq_ignore_ascii_case(&event.key) && modifiers_match(platform, binding.modifiers, event.modifiers)
}

/// Dispatch outcome: a matched binding was found and the event should be
/// consumed (default prevented, propagation stopped), dispatch was
/// suppressed by the text-entry rule, or nothing matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Matched(Command),
    Suppressed,
    NoMatch,
}

/// A scope groups bindings that are enabled/disabled together (e.g.
/// "global" vs. bindings installed on one focused element).
#[derive(Default)]
struct Scope {
    bindings: Vec<Binding>,
    enabled: bool,
}

/// Key event → command dispatcher with scoped enable/disable.
pub struct HotkeyDispatcher {
    platform: Platform,
    scopes: HashMap<String, Scope>,
}

impl HotkeyDispatcher {
    pub fn new(platform: Platform) -> Self {
        Self { platform, scopes: HashMap::default() }
    }

    /// The drawing workspace's default bindings (§4.D/§6), installed and
    /// enabled in the `"global"` scope: tool selection, undo/redo, save,
    /// clear, brush sizes 1-5, color slots 1-8.
    pub fn with_defaults(platform: Platform) -> Self {
        let mut dispatcher = Self::new(platform);
        for binding in default_bindings() {
            dispatcher.install("global", binding);
        }
        dispatcher.set_enabled("global", true);
        dispatcher
    }

    /// Installs a binding into `scope`, creating the scope (disabled by
    /// default) if it doesn't exist yet.
    pub fn install(&mut self, scope: &str, binding: Binding) {
        self.scopes.entry(scope.to_owned()).or_default().bindings.push(binding);
    }

    pub fn set_enabled(&mut self, scope: &str, enabled: bool) {
        self.scopes.entry(scope.to_owned()).or_default().enabled = enabled;
    }

    pub fn is_enabled(&self, scope: &str) -> bool {
        self.scopes.get(scope).is_some_and(|s| s.enabled)
    }

    /// Dispatches `event` against every enabled scope. At most one binding
    /// matches per event (§8, "hotkey match exclusivity"): the caller is
    /// responsible for keeping bindings across scopes non-overlapping; the
    /// first match found wins.
    pub fn dispatch(&self, event: &KeyEvent) -> Dispatch {
        if event.target.is_text_entry() && !event.key.eq_ignore_ascii_case("escape") {
            return Dispatch::Suppressed;
        }

        for scope in self.scopes.values() {
            if !scope.enabled {
                continue;
            }
            for binding in &scope.bindings {
                if binding_matches(self.platform, binding, event) {
                    return Dispatch::Matched(binding.command.clone());
                }
            }
        }

        Dispatch::NoMatch
    }

    /// Platform-sensitive display string for a binding's key combination.
    pub fn format_binding(&self, binding: &Binding) -> String {
        format_combo(self.platform, binding.modifiers, &binding.key)
    }
}

fn format_combo(platform: Platform, modifiers: Modifiers, key: &str) -> String {
    let key_label = match key.to_ascii_lowercase().as_str() {
        "delete" => "Del".to_owned(),
        "backspace" => "⌫".to_owned(),
        other => other.to_ascii_uppercase(),
    };

    if platform == Platform::MacOs {
        let mut out = String::new();
        if modifiers.ctrl {
            out.push('⌘');
        }
        if modifiers.alt {
            out.push('⌥');
        }
        if modifiers.shift {
            out.push('⇧');
        }
        out.push_str(&key_label);
        out
    } else {
        let mut parts = Vec::new();
        if modifiers.ctrl {
            parts.push("Ctrl".to_owned());
        }
        if modifiers.alt {
            parts.push("Alt".to_owned());
        }
        if modifiers.shift {
            parts.push("Shift".to_owned());
        }
        parts.push(key_label);
        parts.join("+")
    }
}

fn m(ctrl: bool, shift: bool, alt: bool) -> Modifiers {
    Modifiers { ctrl, shift, alt, meta: false }
}

fn binding(command: &str, key: &str, modifiers: Modifiers, description: &str) -> Binding {
    Binding { command: command.to_owned(), key: key.to_owned(), modifiers, description: description.to_owned() }
}

/// Default bindings enumerated in §4.D / §6.
pub fn default_bindings() -> Vec<Binding> {
    let mut bindings = vec![
        binding("tool.pencil", "p", m(false, false, false), "Pencil tool"),
        binding("tool.eraser", "e", m(false, false, false), "Eraser tool"),
        binding("history.undo", "z", m(true, false, false), "Undo"),
        binding("history.redo", "z", m(true, true, false), "Redo"),
        binding("history.redo", "y", m(true, false, false), "Redo"),
        binding("file.save", "s", m(true, false, false), "Save"),
        binding("canvas.clear", "delete", m(true, false, false), "Clear"),
    ];

    for n in 1..=5 {
        bindings.push(binding(&format!("brush.size.{n}"), &n.to_string(), m(false, false, false), &format!("Brush size {n}")));
    }

    for n in 1..=8 {
        bindings.push(binding(&format!("color.slot.{n}"), &n.to_string(), m(false, true, false), &format!("Color slot {n}")));
    }

    bindings
}
