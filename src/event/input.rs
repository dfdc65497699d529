//! Input events routed from the host, decoupled from crossterm.
//!
//! The coordinator only cares about key presses (Escape, Tab) and pointer
//! presses for outside-click dismissal. Crossterm events convert via
//! [`from_crossterm`]; anything irrelevant converts to `None`.

use crate::geometry::{Offset, Size};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    /// Any key the layer never reacts to.
    Other,
}

/// Held modifier keys. Only Shift changes layer behaviour (reverse Tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true, ctrl: false, alt: false };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(m: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers as Ct;
        Modifiers {
            shift: m.intersects(Ct::SHIFT),
            ctrl: m.intersects(Ct::CONTROL),
            alt: m.intersects(Ct::ALT),
        }
    }
}

/// A key press with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether this press moves focus backwards (Shift+Tab or BackTab).
    pub fn is_reverse_tab(&self) -> bool {
        self.code == Key::BackTab || (self.code == Key::Tab && self.modifiers.shift)
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What the pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Down(PointerButton),
    Up(PointerButton),
    Moved,
}

/// A pointer event at a viewport position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub position: Offset,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// A primary-button press at (x, y).
    pub fn down(x: i32, y: i32) -> Self {
        Self {
            action: PointerAction::Down(PointerButton::Primary),
            position: Offset::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self.action, PointerAction::Down(_))
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// Top-level input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Pointer(PointerEvent),
    Resize(Size),
}

// ---------------------------------------------------------------------------
// crossterm conversions
// ---------------------------------------------------------------------------

impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(ct: crossterm::event::KeyEvent) -> Self {
        use crossterm::event::KeyCode;
        let code = match ct.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            _ => Key::Other,
        };
        KeyEvent::new(code, ct.modifiers.into())
    }
}

impl From<crossterm::event::MouseButton> for PointerButton {
    fn from(button: crossterm::event::MouseButton) -> Self {
        use crossterm::event::MouseButton;
        match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
        }
    }
}

/// Convert a crossterm event. Returns `None` for events the layer ignores
/// (scrolling, drags, focus changes, paste, key releases).
pub fn from_crossterm(event: crossterm::event::Event) -> Option<InputEvent> {
    use crossterm::event::{Event, KeyEventKind, MouseEventKind};
    let converted = match event {
        Event::Key(key) if key.kind == KeyEventKind::Release => return None,
        Event::Key(key) => InputEvent::Key(key.into()),
        Event::Mouse(mouse) => InputEvent::Pointer(PointerEvent {
            action: match mouse.kind {
                MouseEventKind::Down(button) => PointerAction::Down(button.into()),
                MouseEventKind::Up(button) => PointerAction::Up(button.into()),
                MouseEventKind::Moved => PointerAction::Moved,
                _ => return None,
            },
            position: Offset::new(mouse.column.into(), mouse.row.into()),
            modifiers: mouse.modifiers.into(),
        }),
        Event::Resize(cols, rows) => InputEvent::Resize(Size::new(cols.into(), rows.into())),
        _ => return None,
    };
    Some(converted)
}

// ===========================================================================
// Tests
// ===========================================================================
