#![forbid(unsafe_code)]

//! Core: geometry, pointer events, and the structural node tree.
//!
//! # Role in popkit
//! `popkit-core` is the data layer. It owns the canonical pointer event
//! types and the [`node::NodeTree`] that answers structural questions such
//! as "is this node a descendant of that one?". It performs no dispatch and
//! keeps no listeners; that is the job of `popkit-runtime`.
//!
//! # How it fits in the system
//! The runtime (`popkit-runtime`) owns a `NodeTree` inside its `Document`
//! and delivers [`event::PointerEvent`] values to subscribers. Widgets
//! (`popkit-widgets`) use the tree to classify event targets against their
//! own regions.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod node;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, trace_span, warn};
