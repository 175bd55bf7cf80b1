#![forbid(unsafe_code)]

//! Visibility state machine.
//!
//! | Cause                | From           | To     |
//! |----------------------|----------------|--------|
//! | `Activate`           | Closed or Open | Open   |
//! | `RequestClose`       | Open           | Closed |
//! | `OutsideInteraction` | Open           | Closed |
//!
//! Every operation is total. A call that would not change the visibility is
//! a no-op and reports no [`Transition`].

/// Whether the panel is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

impl Visibility {
    /// Map a boolean flag onto a visibility.
    #[inline]
    pub const fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Why a transition was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionCause {
    /// The trigger was activated.
    Activate,
    /// The close affordance was invoked.
    RequestClose,
    /// A pointer-down landed outside the wrapper region.
    OutsideInteraction,
}

impl TransitionCause {
    /// The visibility this cause leads to from `from`.
    pub const fn next(self, from: Visibility) -> Visibility {
        match (self, from) {
            (Self::Activate, _) => Visibility::Open,
            (Self::RequestClose | Self::OutsideInteraction, _) => Visibility::Closed,
        }
    }
}

/// An effective change of visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub cause: TransitionCause,
    pub from: Visibility,
    pub to: Visibility,
}

/// The popover's only mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopoverState {
    visibility: Visibility,
}

impl PopoverState {
    /// Initial state: open iff `initially_visible`.
    pub const fn new(initially_visible: bool) -> Self {
        Self {
            visibility: Visibility::from_open(initially_visible),
        }
    }

    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub const fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    /// Apply `cause`, returning the transition if the visibility changed.
    pub fn apply(&mut self, cause: TransitionCause) -> Option<Transition> {
        let from = self.visibility;
        let to = cause.next(from);
        if from == to {
            return None;
        }
        self.visibility = to;
        Some(Transition { cause, from, to })
    }

    /// Open the panel. Idempotent.
    pub fn activate(&mut self) -> Option<Transition> {
        self.apply(TransitionCause::Activate)
    }

    /// Close via the close affordance. No-op when closed.
    pub fn request_close(&mut self) -> Option<Transition> {
        self.apply(TransitionCause::RequestClose)
    }

    /// Close because of an outside pointer-down. No-op when closed.
    pub fn outside_interaction_detected(&mut self) -> Option<Transition> {
        self.apply(TransitionCause::OutsideInteraction)
    }
}
