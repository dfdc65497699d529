//! Outbound notifications: render-state changes the host must reflect.

use crate::focus::FocusId;
use crate::position::RecalcResult;

/// Why a popup went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// `dismiss_popup` was called for the active id.
    Requested,
    /// Another popup replaced it.
    Replaced,
    /// A second show with `dismiss_if_shown` toggled it off.
    Toggled,
    /// The auto-dismiss timer fired.
    AutoDismiss,
    /// A pointer press landed outside the popup.
    OutsidePress,
    /// The anchor could no longer be measured.
    AnchorLost,
    /// The placement options cannot be resolved at all.
    Unpositionable,
    /// Escape was pressed.
    Escape,
    /// A modal was shown on top.
    ModalShown,
}

/// A change the view layer has to pick up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A popup became active and is waiting to be measured.
    PopupShown { id: String, visible: bool },
    /// The show delay elapsed; the popup may now be drawn.
    PopupVisible { id: String },
    /// New geometry for the active popup.
    PopupPositioned { id: String, result: RecalcResult },
    PopupDismissed { id: String, reason: DismissReason },
    /// The popup's anchor was the target of the press that dismissed it.
    AnchorPressed { id: String },
    /// The modal stack changed; only `top` is rendered.
    ModalStackChanged { top: Option<String>, depth: usize },
    /// Focus should move back to this handle.
    FocusRestored { handle: FocusId },
}

impl Notice {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Notice::PopupShown { .. } => "PopupShown",
            Notice::PopupVisible { .. } => "PopupVisible",
            Notice::PopupPositioned { .. } => "PopupPositioned",
            Notice::PopupDismissed { .. } => "PopupDismissed",
            Notice::AnchorPressed { .. } => "AnchorPressed",
            Notice::ModalStackChanged { .. } => "ModalStackChanged",
            Notice::FocusRestored { .. } => "FocusRestored",
        }
    }
}
