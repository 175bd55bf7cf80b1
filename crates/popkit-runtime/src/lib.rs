#![forbid(unsafe_code)]

//! Runtime: the document event channel and subscription lifecycles.
//!
//! # Role in popkit
//! `popkit-runtime` owns the [`document::Document`], which bundles the
//! structural node tree with two listener tables:
//!
//! - a document-level pointer channel, shared by every mounted widget, and
//! - per-node activation bindings (the "click" that follows a press).
//!
//! Every registration returns a [`subscription::Subscription`] handle.
//! Dropping the handle unregisters the listener, so widget teardown never
//! depends on remembering a cleanup call.
//!
//! # Threading
//! Dispatch is single-threaded and synchronous. Listeners are `Rc`-based and
//! the document is `!Send`; hosts deliver events one at a time from their UI
//! loop.

pub mod document;
pub mod subscription;

pub use document::{
    ActivationEvent, DispatchReport, Document, DocumentCapabilities, DocumentError, ListenPhase,
};
pub use subscription::{ListenerId, Subscription};
