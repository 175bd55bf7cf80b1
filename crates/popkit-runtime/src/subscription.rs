#![forbid(unsafe_code)]

//! Listener tables and scoped subscription handles.
//!
//! A [`Subscription`] is the only way to keep a listener registered. The
//! handle holds a weak reference to the table it came from; dropping it
//! removes the listener synchronously. If the table is gone first (the
//! document was dropped), releasing is a no-op.
//!
//! # How it works
//!
//! 1. A registration inserts `(id, listener)` into a [`ListenerTable`] and
//!    returns a `Subscription` carrying the id.
//! 2. Dispatch takes a snapshot of the table and, before invoking each
//!    entry, re-checks that its id is still registered. A listener released
//!    mid-dispatch is therefore never called afterwards.
//! 3. `Drop` (or [`Subscription::cancel`]) removes the entry.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A unique identifier for a registered listener.
///
/// Ids are never reused within one table.
pub type ListenerId = u64;

/// Type-erased removal, so one handle type serves every table.
pub(crate) trait Unsubscribe {
    fn unsubscribe(&self, id: ListenerId) -> bool;
    fn is_registered(&self, id: ListenerId) -> bool;
}

/// Ordered table of listeners.
pub(crate) struct ListenerTable<L> {
    entries: Vec<(ListenerId, L)>,
    next_id: ListenerId,
}

pub(crate) type SharedTable<L> = Rc<RefCell<ListenerTable<L>>>;

impl<L: Clone> ListenerTable<L> {
    pub(crate) fn shared() -> SharedTable<L> {
        Rc::new(RefCell::new(Self {
            entries: Vec::new(),
            next_id: 1,
        }))
    }

    pub(crate) fn insert(&mut self, listener: L) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the current entries in registration order.
    pub(crate) fn snapshot(&self) -> Vec<(ListenerId, L)> {
        self.entries.clone()
    }
}

impl<L> Unsubscribe for RefCell<ListenerTable<L>> {
    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut table = self.borrow_mut();
        let before = table.entries.len();
        table.entries.retain(|(entry, _)| *entry != id);
        table.entries.len() != before
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.borrow().entries.iter().any(|(entry, _)| *entry == id)
    }
}

/// Build a handle for an entry already inserted into `table`.
pub(crate) fn subscription_for<L: 'static>(
    table: &SharedTable<L>,
    id: ListenerId,
    kind: &'static str,
) -> Subscription {
    let weak: Weak<dyn Unsubscribe> = Rc::downgrade(table) as Weak<dyn Unsubscribe>;
    Subscription {
        id,
        kind,
        table: Some(weak),
    }
}

/// A registered listener. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener immediately"]
pub struct Subscription {
    id: ListenerId,
    kind: &'static str,
    table: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    /// The listener id within its table.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Which table this subscription belongs to (`"pointer"`, `"activation"`).
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.table
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|table| table.is_registered(self.id))
    }

    /// Unregister now.
    ///
    /// Returns `true` if the listener was still registered.
    pub fn cancel(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(table) = self.table.take().and_then(|weak| weak.upgrade()) else {
            return false;
        };
        let removed = table.unsubscribe(self.id);
        tracing::debug!(listener_id = self.id, kind = self.kind, removed, "Releasing listener");
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("active", &self.is_active())
            .finish()
    }
}
