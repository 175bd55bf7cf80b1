#![forbid(unsafe_code)]

//! Popover: a trigger that toggles a floating panel, closed by pressing
//! anywhere outside it.
//!
//! A mounted [`Popover`] owns three things:
//!
//! 1. a [`PopoverState`] (`Open`/`Closed`), changed only by
//!    [`Popover::activate`], [`Popover::request_close`] and
//!    [`Popover::outside_interaction_detected`];
//! 2. an [`OutsideClickDetector`] subscribed to the document pointer
//!    channel for as long as the popover lives;
//! 3. a [`PopoverRenderer`] that turns the current visibility into markup
//!    and wires the trigger and close affordance back to the state machine.
//!
//! # Example
//!
//! ```
//! use popkit_runtime::Document;
//! use popkit_widgets::popover::{Popover, PopoverConfig, PopoverProps};
//!
//! let mut doc = Document::new();
//! let trigger = doc.tree_mut().create_element("button");
//! let body = doc.tree_mut().create_text("Hello");
//! let elsewhere = doc.tree_mut().create_element("main");
//! let root = doc.tree().root();
//! doc.tree_mut().append_child(root, elsewhere).unwrap();
//!
//! let mut popover = Popover::mount(
//!     &mut doc,
//!     PopoverProps::new(trigger).content(body).config(PopoverConfig::default()),
//! )
//! .unwrap();
//!
//! doc.click(trigger);
//! assert!(popover.is_open());
//! popover.sync(&mut doc).unwrap();
//!
//! doc.click(elsewhere);
//! assert!(!popover.is_open());
//! ```
//!
//! # Lifecycle
//!
//! Mounting registers the detector and renders once. Dropping the popover
//! releases the detector and every binding even without
//! [`Popover::unmount`]; `unmount` additionally removes the markup, which
//! needs the document.
//!
//! Transitions fired from document callbacks cannot re-render on the spot
//! because the document is borrowed for dispatch. They bump a render
//! generation instead; the host calls [`Popover::sync`] after dispatch.

pub mod config;
pub mod region;
pub mod state;
pub mod view;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use popkit_core::node::{NodeId, TreeError};
use popkit_runtime::{Document, DocumentError};

pub use config::PopoverConfig;
#[cfg(feature = "config")]
pub use config::PopoverConfigError;
pub use region::{Containment, OutsideClickDetector, RegionHandle};
pub use state::{PopoverState, Transition, TransitionCause, Visibility};
pub use view::{NodeRenderer, PopoverBindings, PopoverRenderer, PopoverView};

/// Errors from mounting or rendering a popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverError {
    /// The outside-click detector could not be registered.
    Document(DocumentError),
    /// The trigger, content, or host node is invalid.
    Tree(TreeError),
}

impl fmt::Display for PopoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(err) => write!(f, "popover detector unavailable: {err}"),
            Self::Tree(err) => write!(f, "popover markup error: {err}"),
        }
    }
}

impl std::error::Error for PopoverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Document(err) => Some(err),
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<DocumentError> for PopoverError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Tree(tree) => Self::Tree(tree),
            other => Self::Document(other),
        }
    }
}

impl From<TreeError> for PopoverError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

/// What to mount.
#[derive(Debug, Clone)]
pub struct PopoverProps {
    /// Element whose activation opens the popover.
    pub trigger: NodeId,
    /// Nodes shown in the panel body while open.
    pub content: Vec<NodeId>,
    /// Parent for the wrapper; the document root when `None`.
    pub host: Option<NodeId>,
    pub config: PopoverConfig,
}

impl PopoverProps {
    pub fn new(trigger: NodeId) -> Self {
        Self {
            trigger,
            content: Vec::new(),
            host: None,
            config: PopoverConfig::default(),
        }
    }

    /// Append one content node.
    #[must_use]
    pub fn content(mut self, node: NodeId) -> Self {
        self.content.push(node);
        self
    }

    #[must_use]
    pub fn host(mut self, host: NodeId) -> Self {
        self.host = Some(host);
        self
    }

    #[must_use]
    pub fn config(mut self, config: PopoverConfig) -> Self {
        self.config = config;
        self
    }
}

type Observer = Rc<dyn Fn(Transition)>;

/// State shared between the popover and the callbacks it hands out.
struct Shared {
    state: Cell<PopoverState>,
    generation: Cell<u64>,
    region: Rc<RegionHandle>,
    observer: RefCell<Option<Observer>>,
}

impl Shared {
    fn new(state: PopoverState) -> Self {
        Self {
            state: Cell::new(state),
            generation: Cell::new(0),
            region: Rc::new(RegionHandle::new()),
            observer: RefCell::new(None),
        }
    }

    fn apply(&self, cause: TransitionCause) -> Option<Transition> {
        let mut state = self.state.get();
        let transition = state.apply(cause)?;
        self.state.set(state);
        self.generation.set(self.generation.get().wrapping_add(1));

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "popover.transition",
            cause = ?transition.cause,
            from = ?transition.from,
            to = ?transition.to
        )
        .entered();

        // Cloned out so the observer may call back into this popover.
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer(transition);
        }
        Some(transition)
    }
}

fn apply_weak(shared: &Weak<Shared>, cause: TransitionCause) {
    if let Some(shared) = shared.upgrade() {
        shared.apply(cause);
    }
}

/// A mounted popover.
pub struct Popover<R: PopoverRenderer = NodeRenderer> {
    shared: Rc<Shared>,
    props: PopoverProps,
    renderer: R,
    detector: OutsideClickDetector,
    rendered: u64,
}

impl Popover<NodeRenderer> {
    /// Mount with the default markup.
    pub fn mount(doc: &mut Document, props: PopoverProps) -> Result<Self, PopoverError> {
        Self::mount_with(doc, props, NodeRenderer::new())
    }
}

impl<R: PopoverRenderer> Popover<R> {
    /// Mount with a custom renderer.
    ///
    /// Fails without side effects if the host lacks pointer events or if
    /// the first render cannot be built.
    pub fn mount_with(
        doc: &mut Document,
        props: PopoverProps,
        renderer: R,
    ) -> Result<Self, PopoverError> {
        if !doc.tree().is_live(props.trigger) {
            return Err(TreeError::StaleNode(props.trigger).into());
        }

        let shared = Rc::new(Shared::new(PopoverState::new(
            props.config.initially_visible,
        )));
        let weak = Rc::downgrade(&shared);
        let detector = OutsideClickDetector::register(doc, Rc::clone(&shared.region), move |_| {
            apply_weak(&weak, TransitionCause::OutsideInteraction);
        })?;

        let mut popover = Self {
            shared,
            props,
            renderer,
            detector,
            rendered: 0,
        };
        if let Err(err) = popover.render(doc) {
            popover.teardown(doc);
            return Err(err);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            trigger = %popover.props.trigger,
            open = popover.is_open(),
            "popover mounted"
        );
        Ok(popover)
    }

    pub fn state(&self) -> PopoverState {
        self.shared.state.get()
    }

    pub fn visibility(&self) -> Visibility {
        self.state().visibility()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn config(&self) -> &PopoverConfig {
        &self.props.config
    }

    pub fn props(&self) -> &PopoverProps {
        &self.props
    }

    /// The wrapper region used for outside-click detection.
    pub fn region(&self) -> &RegionHandle {
        self.detector.region()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Whether the outside-click detector is still subscribed.
    pub fn is_listening(&self) -> bool {
        self.detector.is_active()
    }

    /// Open the panel. Idempotent.
    pub fn activate(&self) -> Option<Transition> {
        self.shared.apply(TransitionCause::Activate)
    }

    /// Close via the close affordance. No-op when closed.
    pub fn request_close(&self) -> Option<Transition> {
        self.shared.apply(TransitionCause::RequestClose)
    }

    /// Close after an outside pointer-down. No-op when closed.
    pub fn outside_interaction_detected(&self) -> Option<Transition> {
        self.shared.apply(TransitionCause::OutsideInteraction)
    }

    /// Observe every effective transition. Replaces any previous observer.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(Transition) + 'static,
    {
        *self.shared.observer.borrow_mut() = Some(Rc::new(observer));
    }

    /// Whether a transition happened since the last render.
    pub fn needs_render(&self) -> bool {
        self.shared.generation.get() != self.rendered
    }

    /// Re-render if a transition happened since the last render.
    ///
    /// Returns whether a render pass ran.
    pub fn sync(&mut self, doc: &mut Document) -> Result<bool, PopoverError> {
        if !self.needs_render() {
            return Ok(false);
        }
        self.render(doc)?;
        Ok(true)
    }

    /// Tear down markup and release every subscription.
    pub fn unmount(mut self, doc: &mut Document) {
        self.teardown(doc);
        #[cfg(feature = "tracing")]
        tracing::debug!(trigger = %self.props.trigger, "popover unmounted");
    }

    fn render(&mut self, doc: &mut Document) -> Result<(), PopoverError> {
        let generation = self.shared.generation.get();
        let bindings = self.bindings();
        let view = PopoverView {
            visibility: self.visibility(),
            config: &self.props.config,
            trigger: self.props.trigger,
            content: &self.props.content,
            host: self.props.host,
        };
        let wrapper = self.renderer.render(doc, &view, &bindings)?;
        self.shared.region.attach(wrapper);
        self.rendered = generation;
        Ok(())
    }

    fn teardown(&mut self, doc: &mut Document) {
        let view = PopoverView {
            visibility: self.visibility(),
            config: &self.props.config,
            trigger: self.props.trigger,
            content: &self.props.content,
            host: self.props.host,
        };
        self.renderer.teardown(doc, &view);
        self.shared.region.detach();
    }

    fn bindings(&self) -> PopoverBindings {
        let on_activate = Rc::downgrade(&self.shared);
        let on_close = Rc::downgrade(&self.shared);
        PopoverBindings {
            activate: Rc::new(move || apply_weak(&on_activate, TransitionCause::Activate)),
            close: Rc::new(move || apply_weak(&on_close, TransitionCause::RequestClose)),
        }
    }
}

impl<R: PopoverRenderer> fmt::Debug for Popover<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popover")
            .field("visibility", &self.visibility())
            .field("trigger", &self.props.trigger)
            .field("region", &self.region().wrapper())
            .field("listening", &self.is_listening())
            .field("needs_render", &self.needs_render())
            .finish()
    }
}
