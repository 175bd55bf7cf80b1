#![forbid(unsafe_code)]

//! The document: node tree plus event channels.
//!
//! [`Document`] is what a host UI loop talks to. It owns the [`NodeTree`]
//! and routes two kinds of input:
//!
//! - **Pointer events** go to every document-level listener registered with
//!   [`Document::listen_pointer`], capture-phase listeners first, then
//!   bubble-phase listeners, each group in registration order.
//! - **Activations** (the click that completes a press) bubble from the
//!   target node up through its ancestors, invoking bindings registered with
//!   [`Document::on_activate`] on each node along the way.
//!
//! # Invariants
//!
//! - Listeners never run concurrently; dispatch is synchronous on the
//!   caller's thread.
//! - A listener unregistered during a dispatch is not invoked for the rest
//!   of that dispatch.
//! - Pointer events with an [`EventTarget::Unresolved`] target are resolved
//!   by hit testing before any listener runs. A point that hits nothing
//!   resolves to the document root.
//!
//! # Failure modes
//!
//! - Registering a pointer listener on a document whose capabilities lack
//!   pointer events fails with [`DocumentError::PointerEventsUnsupported`].
//! - Binding an activation handler to a removed node fails with
//!   [`DocumentError::Tree`].

use std::fmt;
use std::rc::Rc;

use popkit_core::event::{EventTarget, PointerButton, PointerEvent, PointerEventKind};
use popkit_core::node::{NodeId, NodeTree, TreeError};

use crate::subscription::{ListenerTable, SharedTable, Subscription, Unsubscribe, subscription_for};

/// Which pass a document-level pointer listener runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListenPhase {
    /// Runs before every bubble-phase listener.
    Capture,
    /// Runs after capture-phase listeners.
    #[default]
    Bubble,
}

/// Payload delivered to activation bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationEvent {
    /// The node the activation originated on.
    pub target: NodeId,
    /// The node whose binding is running.
    pub current: NodeId,
}

/// What the host environment supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentCapabilities {
    /// Whether document-level pointer listeners can be registered.
    pub pointer_events: bool,
}

impl Default for DocumentCapabilities {
    fn default() -> Self {
        Self {
            pointer_events: true,
        }
    }
}

impl DocumentCapabilities {
    /// Full capabilities.
    pub const fn new() -> Self {
        Self {
            pointer_events: true,
        }
    }

    /// Enable or disable document-level pointer listening.
    #[must_use]
    pub const fn pointer_events(mut self, enabled: bool) -> Self {
        self.pointer_events = enabled;
        self
    }
}

/// Errors from registering listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    /// The host cannot deliver document-level pointer events.
    PointerEventsUnsupported,
    /// A node-scoped registration referred to an invalid node.
    Tree(TreeError),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointerEventsUnsupported => {
                write!(f, "host does not support document-level pointer listeners")
            }
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::PointerEventsUnsupported => None,
        }
    }
}

impl From<TreeError> for DocumentError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

/// Summary of one dispatch, mostly for tests and tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// The resolved target.
    pub target: EventTarget,
    /// Pointer listeners invoked.
    pub pointer_listeners: usize,
    /// Activation bindings invoked.
    pub activations: usize,
}

impl DispatchReport {
    fn merge(self, other: DispatchReport) -> DispatchReport {
        DispatchReport {
            target: other.target,
            pointer_listeners: self.pointer_listeners + other.pointer_listeners,
            activations: self.activations + other.activations,
        }
    }
}

type PointerCallback = Rc<dyn Fn(&PointerEvent, &NodeTree)>;
type ActivationCallback = Rc<dyn Fn(&ActivationEvent)>;

#[derive(Clone)]
struct PointerEntry {
    phase: ListenPhase,
    callback: PointerCallback,
}

#[derive(Clone)]
struct ActivationEntry {
    node: NodeId,
    callback: ActivationCallback,
}

/// Node tree plus the document-level pointer channel and activation bindings.
pub struct Document {
    tree: NodeTree,
    capabilities: DocumentCapabilities,
    pointer: SharedTable<PointerEntry>,
    activation: SharedTable<ActivationEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with full capabilities.
    pub fn new() -> Self {
        Self::with_capabilities(DocumentCapabilities::default())
    }

    /// Create an empty document for a host with the given capabilities.
    pub fn with_capabilities(capabilities: DocumentCapabilities) -> Self {
        Self {
            tree: NodeTree::new(),
            capabilities,
            pointer: ListenerTable::shared(),
            activation: ListenerTable::shared(),
        }
    }

    pub fn capabilities(&self) -> DocumentCapabilities {
        self.capabilities
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Number of registered document-level pointer listeners.
    pub fn pointer_listener_count(&self) -> usize {
        self.pointer.borrow().len()
    }

    /// Number of registered activation bindings across all nodes.
    pub fn activation_binding_count(&self) -> usize {
        self.activation.borrow().len()
    }

    /// Register a document-level pointer listener.
    ///
    /// The listener sees every pointer event dispatched while the returned
    /// [`Subscription`] is alive, along with the tree to evaluate targets
    /// against.
    pub fn listen_pointer<F>(&self, phase: ListenPhase, listener: F) -> Result<Subscription, DocumentError>
    where
        F: Fn(&PointerEvent, &NodeTree) + 'static,
    {
        if !self.capabilities.pointer_events {
            tracing::warn!("Pointer listener rejected: host lacks pointer events");
            return Err(DocumentError::PointerEventsUnsupported);
        }
        let id = self.pointer.borrow_mut().insert(PointerEntry {
            phase,
            callback: Rc::new(listener),
        });
        tracing::debug!(listener_id = id, ?phase, "Registered pointer listener");
        Ok(subscription_for(&self.pointer, id, "pointer"))
    }

    /// Bind an activation handler to `node`.
    ///
    /// The handler runs when `node` or any of its descendants is activated.
    /// Binding does not touch the node's identity or position in the tree.
    pub fn on_activate<F>(&self, node: NodeId, handler: F) -> Result<Subscription, DocumentError>
    where
        F: Fn(&ActivationEvent) + 'static,
    {
        if !self.tree.is_live(node) {
            return Err(TreeError::StaleNode(node).into());
        }
        let id = self.activation.borrow_mut().insert(ActivationEntry {
            node,
            callback: Rc::new(handler),
        });
        tracing::debug!(listener_id = id, node = %node, "Bound activation handler");
        Ok(subscription_for(&self.activation, id, "activation"))
    }

    /// Resolve an event target, hit testing unresolved ones.
    pub fn resolve_target(&self, event: &PointerEvent) -> EventTarget {
        match event.target {
            EventTarget::Unresolved => {
                let hit = self.tree.hit_test(event.x, event.y).unwrap_or(self.tree.root());
                EventTarget::Node(hit)
            }
            other => other,
        }
    }

    /// Deliver a pointer event to every document-level listener.
    pub fn dispatch_pointer(&self, event: PointerEvent) -> DispatchReport {
        let target = self.resolve_target(&event);
        let event = event.with_target(target);

        let mut entries = self.pointer.borrow().snapshot();
        // Stable: keeps registration order within a phase.
        entries.sort_by_key(|(_, entry)| entry.phase != ListenPhase::Capture);

        let mut invoked = 0;
        for (id, entry) in entries {
            if !self.pointer.is_registered(id) {
                continue;
            }
            (entry.callback)(&event, &self.tree);
            invoked += 1;
        }

        tracing::trace!(kind = ?event.kind, resolved = ?target, invoked, "Dispatched pointer event");
        DispatchReport {
            target,
            pointer_listeners: invoked,
            activations: 0,
        }
    }

    /// Pointer-down with the primary button at a screen position.
    pub fn pointer_down_at(&self, x: u16, y: u16) -> DispatchReport {
        self.dispatch_pointer(PointerEvent::new(
            PointerEventKind::Down(PointerButton::Primary),
            x,
            y,
        ))
    }

    /// Bubble an activation from `target` to the root.
    ///
    /// Stale targets activate nothing.
    pub fn activate(&self, target: NodeId) -> DispatchReport {
        let path: Vec<NodeId> = self.tree.ancestors(target).collect();
        let entries = self.activation.borrow().snapshot();

        let mut invoked = 0;
        for current in path {
            for (id, entry) in entries.iter().filter(|(_, e)| e.node == current) {
                if !self.activation.is_registered(*id) {
                    continue;
                }
                (entry.callback)(&ActivationEvent { target, current });
                invoked += 1;
            }
        }

        tracing::trace!(node = %target, invoked, "Dispatched activation");
        DispatchReport {
            target: EventTarget::Node(target),
            pointer_listeners: 0,
            activations: invoked,
        }
    }

    /// Full primary-button click on `target`: press, release, activation.
    pub fn click(&self, target: NodeId) -> DispatchReport {
        let down = self.dispatch_pointer(PointerEvent::down_on(target));
        let up = self.dispatch_pointer(
            PointerEvent::new(PointerEventKind::Up(PointerButton::Primary), 0, 0)
                .with_target(EventTarget::Node(target)),
        );
        down.merge(up).merge(self.activate(target))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.len())
            .field("capabilities", &self.capabilities)
            .field("pointer_listeners", &self.pointer_listener_count())
            .field("activation_bindings", &self.activation_binding_count())
            .finish()
    }
}
