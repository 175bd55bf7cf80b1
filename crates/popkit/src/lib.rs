#![forbid(unsafe_code)]

//! popkit public facade crate.
//!
//! Re-exports the types needed to mount popovers into a document and drive
//! them from a host event loop, plus a prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use popkit_core::event::{EventTarget, PointerButton, PointerEvent, PointerEventKind};
pub use popkit_core::geometry::Rect;
pub use popkit_core::node::{NodeId, NodeKind, NodeTree, Role, TreeError};

// --- Runtime re-exports ----------------------------------------------------

pub use popkit_runtime::{
    ActivationEvent, DispatchReport, Document, DocumentCapabilities, DocumentError, ListenPhase,
    Subscription,
};

// --- Widget re-exports -----------------------------------------------------

pub use popkit_widgets::popover::{
    Containment, NodeRenderer, OutsideClickDetector, Popover, PopoverConfig, PopoverError,
    PopoverProps, PopoverRenderer, PopoverState, RegionHandle, Transition, TransitionCause,
    Visibility,
};

#[cfg(feature = "tracing-json")]
pub use popkit_core::logging::init_json_logging;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for popkit hosts.
#[derive(Debug)]
pub enum Error {
    /// Mounting or rendering a popover failed.
    Popover(PopoverError),
    /// Loading a popover config failed.
    #[cfg(feature = "config")]
    Config(popkit_widgets::popover::PopoverConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Popover(err) => write!(f, "{err}"),
            #[cfg(feature = "config")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Popover(err) => Some(err),
            #[cfg(feature = "config")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<PopoverError> for Error {
    fn from(err: PopoverError) -> Self {
        Self::Popover(err)
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        Self::Popover(err.into())
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Popover(err.into())
    }
}

#[cfg(feature = "config")]
impl From<popkit_widgets::popover::PopoverConfigError> for Error {
    fn from(err: popkit_widgets::popover::PopoverConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for popkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience prelude for popkit users.
pub mod prelude {
    pub use crate::{
        Document, Error, NodeId, PointerEvent, Popover, PopoverConfig, PopoverProps, Result,
        Visibility,
    };
}

pub use popkit_core;
pub use popkit_runtime;
pub use popkit_widgets;
