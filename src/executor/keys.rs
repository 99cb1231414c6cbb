/// Non-printing keys the effector can press by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Key {
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    CapsLock,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Shift,
    Control,
    Alt,
    Meta,
}

static SPECIAL_KEYS: &[(&str, Key)] = &[
    ("space", Key::Space),
    ("enter", Key::Enter),
    ("return", Key::Enter),
    ("esc", Key::Escape),
    ("escape", Key::Escape),
    ("tab", Key::Tab),
    ("backspace", Key::Backspace),
    ("delete", Key::Delete),
    ("insert", Key::Insert),
    ("home", Key::Home),
    ("end", Key::End),
    ("page_up", Key::PageUp),
    ("page_down", Key::PageDown),
    ("up", Key::Up),
    ("down", Key::Down),
    ("left", Key::Left),
    ("right", Key::Right),
    ("caps_lock", Key::CapsLock),
    ("f1", Key::F1),
    ("f2", Key::F2),
    ("f3", Key::F3),
    ("f4", Key::F4),
    ("f5", Key::F5),
    ("f6", Key::F6),
    ("f7", Key::F7),
    ("f8", Key::F8),
    ("f9", Key::F9),
    ("f10", Key::F10),
    ("f11", Key::F11),
    ("f12", Key::F12),
];

static MODIFIERS: &[(&str, Key)] = &[
    ("shift", Key::Shift),
    ("ctrl", Key::Control),
    ("control", Key::Control),
    ("alt", Key::Alt),
    ("option", Key::Alt),
    ("cmd", Key::Meta),
    ("command", Key::Meta),
    ("meta", Key::Meta),
    ("super", Key::Meta),
    ("win", Key::Meta),
];

fn lookup(table: &[(&str, Key)], name: &str) -> Option<Key> {
    let normalized = name.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, key)| *key)
}

/// Resolve a named special key. `None` means the name should be typed as
/// literal text.
pub fn resolve_key(name: &str) -> Option<Key> {
    lookup(SPECIAL_KEYS, name)
}

pub fn resolve_modifier(name: &str) -> Option<Key> {
    lookup(MODIFIERS, name)
}
