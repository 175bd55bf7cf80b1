#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! All events derive `Clone`, `PartialEq`, and `Eq` for use in tests and
//! pattern matching.
//!
//! # Design Notes
//!
//! - Coordinates are 0-indexed, origin at top-left.
//! - An event may carry an explicit [`EventTarget`] or leave it
//!   [`EventTarget::Unresolved`], in which case the dispatcher resolves the
//!   target by hit testing the node tree at `(x, y)`.

use crate::node::NodeId;

/// A pointer (mouse, pen, touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// X coordinate (0-indexed, leftmost column is 0).
    pub x: u16,

    /// Y coordinate (0-indexed, topmost row is 0).
    pub y: u16,

    /// What the event was delivered to.
    pub target: EventTarget,
}

impl PointerEvent {
    /// Create a new pointer event with an unresolved target.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            target: EventTarget::Unresolved,
        }
    }

    /// Pointer-down with the primary button on a known node.
    #[must_use]
    pub const fn down_on(node: NodeId) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), 0, 0)
            .with_target(EventTarget::Node(node))
    }

    /// Create a pointer event with an explicit target.
    #[must_use]
    pub const fn with_target(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Whether this is a button press, regardless of which button.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self.kind, PointerEventKind::Down(_))
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved.
    Moved,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    Primary,

    /// Right mouse button.
    Secondary,

    /// Middle mouse button (scroll wheel click).
    Auxiliary,
}

/// The object an event was delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventTarget {
    /// Not resolved yet; the dispatcher hit-tests `(x, y)`.
    #[default]
    Unresolved,

    /// A structural node in the tree.
    Node(NodeId),

    /// The host window itself. Not a structural node, so it cannot be
    /// tested for containment.
    Window,
}

impl EventTarget {
    /// The node this target refers to, if any.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }
}
