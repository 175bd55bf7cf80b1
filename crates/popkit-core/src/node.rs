#![forbid(unsafe_code)]

//! Structural node tree.
//!
//! [`NodeTree`] is a generational arena of element and text nodes rooted at
//! a single document node. It answers the structural questions event
//! routing needs: parent chains, descendant containment, and which node sits
//! under a screen position.
//!
//! # Invariants
//!
//! - The root node always exists and never has a parent.
//! - A [`NodeId`] stays valid until its node is removed; after removal the
//!   slot may be reused, but the old id is *stale* and every query on it
//!   returns `None`/empty rather than aliasing the new occupant.
//! - Parent and child links are always mutually consistent, and the graph is
//!   acyclic.

use std::fmt;

use crate::geometry::Rect;

/// Identifier for a node in a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index (stable for the lifetime of the node).
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation, bumped every time a slot is reused.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// ARIA-style role hint carried by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Purely structural, no semantics.
    Presentation,
    /// A dialog surface.
    Dialog,
    /// A pressable control.
    Button,
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub role: Option<Role>,
    pub classes: Vec<String>,
}

impl Element {
    /// Whether the element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The tree root.
    Document,
    /// A structural element.
    Element(Element),
    /// A leaf carrying text.
    Text(String),
}

/// A node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Option<Rect>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            bounds: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Element payload, if this is an element.
    pub fn element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Screen bounds assigned by layout, if any.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }
}

/// Errors from structural mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The id refers to a removed node.
    StaleNode(NodeId),
    /// The root cannot be moved, detached, or removed.
    RootNode,
    /// Inserting `child` under `parent` would create a cycle.
    Cycle { parent: NodeId, child: NodeId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node {id} has been removed"),
            Self::RootNode => write!(f, "the document root cannot be moved or removed"),
            Self::Cycle { parent, child } => {
                write!(f, "inserting {child} under {parent} would create a cycle")
            }
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Generational arena of structural nodes.
#[derive(Debug, Clone)]
pub struct NodeTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Create a tree containing only the document root.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeKind::Document)),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    /// The document root.
    #[inline]
    pub const fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Always false: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element(Element {
            tag: tag.into(),
            role: None,
            classes: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(Node::new(kind));
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(kind)),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Look up a live node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::StaleNode(id))
    }

    /// Whether `id` refers to a node that has not been removed.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children in document order; empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Set an element's role. No-op for text nodes.
    pub fn set_role(&mut self, id: NodeId, role: Role) -> Result<(), TreeError> {
        if let NodeKind::Element(el) = &mut self.get_mut(id)?.kind {
            el.role = Some(role);
        }
        Ok(())
    }

    /// Add a class to an element. Duplicates and empty names are ignored.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), TreeError> {
        if let NodeKind::Element(el) = &mut self.get_mut(id)?.kind
            && !class.is_empty()
            && !el.has_class(class)
        {
            el.classes.push(class.to_owned());
        }
        Ok(())
    }

    /// Assign (or clear) the screen bounds used for hit testing.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<Rect>) -> Result<(), TreeError> {
        self.get_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if needed.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` under `parent` at `index` (clamped), moving it if
    /// it already has a parent.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        if !self.is_live(parent) {
            return Err(TreeError::StaleNode(parent));
        }
        if !self.is_live(child) {
            return Err(TreeError::StaleNode(child));
        }
        if child == self.root() {
            return Err(TreeError::RootNode);
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::Cycle { parent, child });
        }

        self.unlink(child);
        let siblings = &mut self.get_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `id` (and its subtree) from its parent without freeing it.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.is_live(id) {
            return Err(TreeError::StaleNode(id));
        }
        if id == self.root() {
            return Err(TreeError::RootNode);
        }
        self.unlink(id);
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Ok(node) = self.get_mut(parent) {
            node.children.retain(|c| *c != id);
        }
        if let Ok(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Remove `id` and its whole subtree, freeing their slots.
    ///
    /// Returns the number of nodes freed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, TreeError> {
        self.detach(id)?;

        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            let slot = &mut self.slots[next.index as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                self.free.push(next.index);
                freed += 1;
            }
        }
        self.live -= freed;

        #[cfg(feature = "tracing")]
        tracing::trace!(node = %id, freed, "node subtree removed");

        Ok(freed)
    }

    /// Iterate `id` followed by each of its ancestors up to the topmost one.
    ///
    /// Yields nothing for a stale id.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.is_live(id).then_some(id),
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    ///
    /// Returns `None` when either id is stale, since containment cannot be
    /// evaluated.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> Option<bool> {
        if !self.is_live(ancestor) || !self.is_live(node) {
            return None;
        }
        Some(self.ancestors(node).any(|a| a == ancestor))
    }

    /// Whether `id` is connected to the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.root();
        self.ancestors(id).any(|a| a == root)
    }

    /// Deepest attached node whose bounds contain `(x, y)`.
    ///
    /// Later siblings are treated as painted on top of earlier ones. Nodes
    /// without bounds are transparent but their children are still tested.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<NodeId> {
        self.hit_test_from(self.root(), x, y)
    }

    fn hit_test_from(&self, id: NodeId, x: u16, y: u16) -> Option<NodeId> {
        let node = self.get(id)?;
        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test_from(*child, x, y) {
                return Some(hit);
            }
        }
        node.bounds
            .filter(|bounds| bounds.contains(x, y))
            .map(|_| id)
    }

    /// First attached node, in document order, matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = self.get(id)?;
            if pred(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// First attached element carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.find(|node| node.element().is_some_and(|el| el.has_class(class)))
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let NodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }
}

/// Iterator returned by [`NodeTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a NodeTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
