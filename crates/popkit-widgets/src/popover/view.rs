#![forbid(unsafe_code)]

//! Rendering collaborator.
//!
//! The popover decides *whether* the panel is shown; a [`PopoverRenderer`]
//! decides what that looks like in the node tree. The renderer receives a
//! [`PopoverView`] snapshot plus [`PopoverBindings`], the two callbacks it
//! must wire to the trigger and to the close affordance.
//!
//! [`NodeRenderer`] is the default markup:
//!
//! ```text
//! div.popover-wrap[role=presentation] {class_name}
//! ├── <trigger>                       (caller's node, same identity)
//! └── div.popover[role=dialog]        (only while open)
//!     ├── button.popover__close "X"   (unless suppressed)
//!     ├── h3.popover__header          (if a header is configured)
//!     └── div.popover__body
//!         └── <content>...            (caller's nodes)
//! ```
//!
//! The trigger and content nodes belong to the caller: closing the panel or
//! tearing the popover down detaches them but never frees them.

use std::rc::Rc;

use popkit_core::node::{NodeId, NodeTree, Role, TreeError};
use popkit_runtime::{Document, Subscription};

use super::PopoverError;
use super::config::PopoverConfig;
use super::state::Visibility;

/// Wrapper class.
pub const WRAPPER_CLASS: &str = "popover-wrap";
/// Panel class.
pub const PANEL_CLASS: &str = "popover";
/// Close button class.
pub const CLOSE_CLASS: &str = "popover__close";
/// Header class.
pub const HEADER_CLASS: &str = "popover__header";
/// Body class.
pub const BODY_CLASS: &str = "popover__body";
/// Close button label.
pub const CLOSE_LABEL: &str = "X";

/// Callback injected into the rendered markup.
pub type Callback = Rc<dyn Fn()>;

/// Callbacks the renderer must wire up.
#[derive(Clone)]
pub struct PopoverBindings {
    /// Bound to the trigger.
    pub activate: Callback,
    /// Bound to the close affordance.
    pub close: Callback,
}

/// Everything a renderer needs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct PopoverView<'a> {
    pub visibility: Visibility,
    pub config: &'a PopoverConfig,
    pub trigger: NodeId,
    pub content: &'a [NodeId],
    /// Parent for the wrapper; the document root when `None`.
    pub host: Option<NodeId>,
}

/// Draws a popover into a document.
pub trait PopoverRenderer {
    /// Bring the markup in line with `view`.
    ///
    /// Returns the wrapper node, which becomes the popover's region. The
    /// trigger must be bound to `bindings.activate` on its own identity,
    /// without inserting a node around it.
    fn render(
        &mut self,
        doc: &mut Document,
        view: &PopoverView<'_>,
        bindings: &PopoverBindings,
    ) -> Result<NodeId, PopoverError>;

    /// Remove everything `render` created and release its bindings.
    fn teardown(&mut self, doc: &mut Document, view: &PopoverView<'_>);
}

/// Default renderer producing the markup described in the module docs.
#[derive(Debug, Default)]
pub struct NodeRenderer {
    wrapper: Option<NodeId>,
    trigger: Option<(NodeId, Subscription)>,
    panel: Option<NodeId>,
    close: Option<Subscription>,
}

impl NodeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The panel node, while open.
    pub fn panel(&self) -> Option<NodeId> {
        self.panel
    }

    fn ensure_wrapper(
        &mut self,
        doc: &mut Document,
        view: &PopoverView<'_>,
    ) -> Result<NodeId, PopoverError> {
        let tree = doc.tree_mut();
        let wrapper = match self.wrapper.filter(|w| tree.is_live(*w)) {
            Some(wrapper) => wrapper,
            None => {
                let wrapper = tree.create_element("div");
                tree.set_role(wrapper, Role::Presentation)?;
                tree.add_class(wrapper, WRAPPER_CLASS)?;
                if let Some(extra) = &view.config.class_name {
                    for class in extra.split_whitespace() {
                        tree.add_class(wrapper, class)?;
                    }
                }
                self.wrapper = Some(wrapper);
                wrapper
            }
        };

        let host = view.host.unwrap_or(tree.root());
        if tree.parent(wrapper) != Some(host) {
            tree.append_child(host, wrapper)?;
        }
        Ok(wrapper)
    }

    /// Build the panel under `wrapper`.
    ///
    /// The panel is recorded only once fully built. On failure the partial
    /// panel is discarded, so the next render starts over.
    fn render_panel(
        &mut self,
        doc: &mut Document,
        wrapper: NodeId,
        view: &PopoverView<'_>,
        bindings: &PopoverBindings,
    ) -> Result<(), PopoverError> {
        let panel = doc.tree_mut().create_element("div");
        match build_panel(doc, panel, wrapper, view, bindings) {
            Ok(close) => {
                self.panel = Some(panel);
                self.close = close;
                Ok(())
            }
            Err(err) => {
                discard_panel(doc.tree_mut(), panel, view.content);
                Err(err)
            }
        }
    }

    fn remove_panel(&mut self, doc: &mut Document, content: &[NodeId]) {
        self.close = None;
        if let Some(panel) = self.panel.take() {
            discard_panel(doc.tree_mut(), panel, content);
        }
    }
}

/// Fill `panel` and hang it under `wrapper`. Returns the close binding.
fn build_panel(
    doc: &mut Document,
    panel: NodeId,
    wrapper: NodeId,
    view: &PopoverView<'_>,
    bindings: &PopoverBindings,
) -> Result<Option<Subscription>, PopoverError> {
    let tree = doc.tree_mut();
    tree.set_role(panel, Role::Dialog)?;
    tree.add_class(panel, PANEL_CLASS)?;
    tree.append_child(wrapper, panel)?;

    let close_button = if view.config.suppress_close_button {
        None
    } else {
        let button = tree.create_element("button");
        tree.set_role(button, Role::Button)?;
        tree.add_class(button, CLOSE_CLASS)?;
        let label = tree.create_text(CLOSE_LABEL);
        tree.append_child(button, label)?;
        tree.append_child(panel, button)?;
        Some(button)
    };

    if let Some(header) = &view.config.header {
        let h3 = tree.create_element("h3");
        tree.add_class(h3, HEADER_CLASS)?;
        let text = tree.create_text(header.as_str());
        tree.append_child(h3, text)?;
        tree.append_child(panel, h3)?;
    }

    let body = tree.create_element("div");
    tree.add_class(body, BODY_CLASS)?;
    tree.append_child(panel, body)?;
    for node in view.content {
        tree.append_child(body, *node)?;
    }

    match close_button {
        Some(button) => {
            let close = Rc::clone(&bindings.close);
            Ok(Some(doc.on_activate(button, move |_| close())?))
        }
        None => Ok(None),
    }
}

/// Free `panel` and everything under it except the caller's content,
/// which is detached first.
fn discard_panel(tree: &mut NodeTree, panel: NodeId, content: &[NodeId]) {
    for node in content {
        if tree.contains(panel, *node) == Some(true) {
            log_cleanup(tree.detach(*node), "detach content");
        }
    }
    if tree.is_live(panel) {
        log_cleanup(tree.remove(panel), "remove panel");
    }
}

/// Cleanup runs where errors cannot be returned; report them instead.
fn log_cleanup<T>(result: Result<T, TreeError>, step: &'static str) {
    if let Err(_err) = result {
        #[cfg(feature = "tracing")]
        tracing::warn!(err = %_err, step, "popover cleanup step failed");
        #[cfg(not(feature = "tracing"))]
        let _ = step;
    }
}

impl PopoverRenderer for NodeRenderer {
    fn render(
        &mut self,
        doc: &mut Document,
        view: &PopoverView<'_>,
        bindings: &PopoverBindings,
    ) -> Result<NodeId, PopoverError> {
        let wrapper = self.ensure_wrapper(doc, view)?;

        if doc.tree().parent(view.trigger) != Some(wrapper) {
            doc.tree_mut().insert_child(wrapper, 0, view.trigger)?;
        }
        if self.trigger.as_ref().map(|(node, _)| *node) != Some(view.trigger) {
            let activate = Rc::clone(&bindings.activate);
            let binding = doc.on_activate(view.trigger, move |_| activate())?;
            self.trigger = Some((view.trigger, binding));
        }

        let panel_live = self.panel.is_some_and(|p| doc.tree().is_live(p));
        match view.visibility {
            Visibility::Open if !panel_live => {
                self.remove_panel(doc, view.content);
                self.render_panel(doc, wrapper, view, bindings)?;
            }
            Visibility::Closed if self.panel.is_some() => self.remove_panel(doc, view.content),
            _ => {}
        }
        Ok(wrapper)
    }

    fn teardown(&mut self, doc: &mut Document, view: &PopoverView<'_>) {
        self.remove_panel(doc, view.content);
        self.trigger = None;

        let tree = doc.tree_mut();
        if let Some(wrapper) = self.wrapper.take() {
            if tree.contains(wrapper, view.trigger) == Some(true) {
                log_cleanup(tree.detach(view.trigger), "detach trigger");
            }
            if tree.is_live(wrapper) {
                log_cleanup(tree.remove(wrapper), "remove wrapper");
            }
        }
    }
}
