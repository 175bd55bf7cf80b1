#![forbid(unsafe_code)]

//! Wrapper region and outside-click detection.
//!
//! A [`RegionHandle`] names the wrapper node that bounds a popover (trigger
//! plus panel). [`OutsideClickDetector`] subscribes to the document pointer
//! channel and reports every pointer-down whose target is not inside that
//! region.
//!
//! # Invariants
//!
//! - Containment is evaluated against the live tree at dispatch time, so
//!   content inserted into the panel after mount counts as inside.
//! - Only pointer-down events are classified; moves and releases are
//!   ignored.
//! - A detector only ever consults its own region.
//!
//! # Failure modes
//!
//! Classification is [`Containment::Ambiguous`] when the region is not
//! attached yet, when the target is not a structural node (the window), or
//! when either node has been removed. Ambiguous never closes.

use std::cell::Cell;
use std::rc::Rc;

use popkit_core::event::{EventTarget, PointerEvent};
use popkit_core::node::{NodeId, NodeTree};
use popkit_runtime::{Document, DocumentError, ListenPhase, Subscription};

/// Result of testing an event target against a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Containment {
    /// The target is the wrapper or one of its descendants.
    Inside,
    /// The target is a node outside the wrapper.
    Outside,
    /// Containment could not be evaluated.
    Ambiguous,
}

impl Containment {
    /// Only a definite outside hit closes the popover.
    #[inline]
    pub const fn should_close(self) -> bool {
        matches!(self, Self::Outside)
    }
}

/// Handle to the rendered wrapper node.
#[derive(Debug, Default)]
pub struct RegionHandle {
    wrapper: Cell<Option<NodeId>>,
}

impl RegionHandle {
    /// An unattached handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the handle at a rendered wrapper.
    pub fn attach(&self, wrapper: NodeId) {
        self.wrapper.set(Some(wrapper));
    }

    /// Forget the wrapper (at unmount).
    pub fn detach(&self) {
        self.wrapper.set(None);
    }

    pub fn wrapper(&self) -> Option<NodeId> {
        self.wrapper.get()
    }

    pub fn is_attached(&self) -> bool {
        self.wrapper.get().is_some()
    }

    /// Classify `target` against this region.
    pub fn classify(&self, target: EventTarget, tree: &NodeTree) -> Containment {
        let (Some(wrapper), EventTarget::Node(node)) = (self.wrapper.get(), target) else {
            return Containment::Ambiguous;
        };
        match tree.contains(wrapper, node) {
            Some(true) => Containment::Inside,
            Some(false) => Containment::Outside,
            None => Containment::Ambiguous,
        }
    }
}

/// Document-level listener reporting pointer-downs outside one region.
///
/// The subscription lives exactly as long as the detector: dropping the
/// detector unregisters it.
#[derive(Debug)]
pub struct OutsideClickDetector {
    region: Rc<RegionHandle>,
    subscription: Subscription,
}

impl OutsideClickDetector {
    /// Start watching `doc` for pointer-downs outside `region`.
    ///
    /// Listens in the bubble phase, which already sees every target in the
    /// document.
    pub fn register<F>(
        doc: &Document,
        region: Rc<RegionHandle>,
        on_outside: F,
    ) -> Result<Self, DocumentError>
    where
        F: Fn(&PointerEvent) + 'static,
    {
        let watched = Rc::clone(&region);
        let subscription = doc.listen_pointer(ListenPhase::Bubble, move |event, tree| {
            if !event.is_down() {
                return;
            }
            let containment = watched.classify(event.target, tree);
            #[cfg(feature = "tracing")]
            tracing::trace!(event_target = ?event.target, ?containment, "popover.outside_check");
            if containment.should_close() {
                on_outside(event);
            }
        })?;
        Ok(Self {
            region,
            subscription,
        })
    }

    pub fn region(&self) -> &RegionHandle {
        &self.region
    }

    /// Whether the document still delivers events to this detector.
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop watching now. Equivalent to dropping the detector.
    pub fn release(self) -> bool {
        self.subscription.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popkit_core::event::{PointerButton, PointerEventKind};
    use popkit_core::geometry::Rect;

    struct Fixture {
        doc: Document,
        wrapper: NodeId,
        inner: NodeId,
        outside: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let tree = doc.tree_mut();
        let root = tree.root();
        let wrapper = tree.create_element("div");
        let inner = tree.create_element("span");
        let outside = tree.create_element("p");
        tree.append_child(root, wrapper).unwrap();
        tree.append_child(wrapper, inner).unwrap();
        tree.append_child(root, outside).unwrap();
        Fixture {
            doc,
            wrapper,
            inner,
            outside,
        }
    }

    fn counting_detector(doc: &Document, region: Rc<RegionHandle>) -> (OutsideClickDetector, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let detector =
            OutsideClickDetector::register(doc, region, move |_| counter.set(counter.get() + 1))
                .unwrap();
        (detector, hits)
    }

    #[test]
    fn classify_inside_outside() {
        let f = fixture();
        let region = RegionHandle::new();
        region.attach(f.wrapper);
        let tree = f.doc.tree();
        assert_eq!(region.classify(EventTarget::Node(f.inner), tree), Containment::Inside);
        assert_eq!(region.classify(EventTarget::Node(f.wrapper), tree), Containment::Inside);
        assert_eq!(region.classify(EventTarget::Node(f.outside), tree), Containment::Outside);
        assert_eq!(region.classify(EventTarget::Node(tree.root()), tree), Containment::Outside);
    }

    #[test]
    fn ambiguous_inputs_never_close() {
        let mut f = fixture();
        let region = RegionHandle::new();
        assert_eq!(
            region.classify(EventTarget::Node(f.outside), f.doc.tree()),
            Containment::Ambiguous
        );

        region.attach(f.wrapper);
        assert_eq!(region.classify(EventTarget::Window, f.doc.tree()), Containment::Ambiguous);
        assert_eq!(region.classify(EventTarget::Unresolved, f.doc.tree()), Containment::Ambiguous);

        f.doc.tree_mut().remove(f.outside).unwrap();
        assert_eq!(
            region.classify(EventTarget::Node(f.outside), f.doc.tree()),
            Containment::Ambiguous
        );
        assert!(!Containment::Ambiguous.should_close());
        assert!(!Containment::Inside.should_close());
        assert!(Containment::Outside.should_close());
    }

    #[test]
    fn detector_reports_only_outside_presses() {
        let f = fixture();
        let region = Rc::new(RegionHandle::new());
        region.attach(f.wrapper);
        let (_detector, hits) = counting_detector(&f.doc, region);

        f.doc.dispatch_pointer(PointerEvent::down_on(f.inner));
        assert_eq!(hits.get(), 0);

        f.doc.dispatch_pointer(PointerEvent::down_on(f.outside));
        assert_eq!(hits.get(), 1);

        let release = PointerEvent::new(PointerEventKind::Up(PointerButton::Primary), 0, 0)
            .with_target(EventTarget::Node(f.outside));
        f.doc.dispatch_pointer(release);
        assert_eq!(hits.get(), 1);

        let right = PointerEvent::new(PointerEventKind::Down(PointerButton::Secondary), 0, 0)
            .with_target(EventTarget::Node(f.outside));
        f.doc.dispatch_pointer(right);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn unattached_region_fails_safe() {
        let f = fixture();
        let (_detector, hits) = counting_detector(&f.doc, Rc::new(RegionHandle::new()));
        f.doc.dispatch_pointer(PointerEvent::down_on(f.outside));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn late_content_counts_as_inside() {
        let mut f = fixture();
        let region = Rc::new(RegionHandle::new());
        region.attach(f.wrapper);
        let (_detector, hits) = counting_detector(&f.doc, region);

        let tree = f.doc.tree_mut();
        let late = tree.create_element("li");
        tree.append_child(f.inner, late).unwrap();

        f.doc.dispatch_pointer(PointerEvent::down_on(late));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn coordinates_resolve_through_hit_test() {
        let mut f = fixture();
        let tree = f.doc.tree_mut();
        tree.set_bounds(f.inner, Some(Rect::new(0, 0, 10, 2))).unwrap();
        tree.set_bounds(f.outside, Some(Rect::new(0, 5, 10, 2))).unwrap();

        let region = Rc::new(RegionHandle::new());
        region.attach(f.wrapper);
        let (_detector, hits) = counting_detector(&f.doc, region);

        f.doc.pointer_down_at(3, 1);
        assert_eq!(hits.get(), 0);
        f.doc.pointer_down_at(3, 6);
        assert_eq!(hits.get(), 1);
        // Empty space resolves to the root, which is outside.
        f.doc.pointer_down_at(50, 50);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn release_unsubscribes() {
        let f = fixture();
        let region = Rc::new(RegionHandle::new());
        region.attach(f.wrapper);
        let (detector, hits) = counting_detector(&f.doc, region);
        assert!(detector.is_active());
        assert_eq!(f.doc.pointer_listener_count(), 1);

        assert!(detector.release());
        assert_eq!(f.doc.pointer_listener_count(), 0);
        f.doc.dispatch_pointer(PointerEvent::down_on(f.outside));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn detectors_are_independent() {
        let mut f = fixture();
        let tree = f.doc.tree_mut();
        let other_wrapper = tree.create_element("div");
        let root = tree.root();
        tree.append_child(root, other_wrapper).unwrap();

        let first = Rc::new(RegionHandle::new());
        first.attach(f.wrapper);
        let second = Rc::new(RegionHandle::new());
        second.attach(other_wrapper);
        let (_a, hits_a) = counting_detector(&f.doc, first);
        let (_b, hits_b) = counting_detector(&f.doc, second);

        f.doc.dispatch_pointer(PointerEvent::down_on(f.inner));
        assert_eq!((hits_a.get(), hits_b.get()), (0, 1));
        f.doc.dispatch_pointer(PointerEvent::down_on(other_wrapper));
        assert_eq!((hits_a.get(), hits_b.get()), (1, 1));
    }
}
