//! Arena-backed collision chain: a doubly linked list of slotmap handles.
//!
//! The table stores every entry in a single `SlotMap` arena; a `Chain` is
//! the per-bucket list threaded through those entries via embedded
//! prev/next handles. This replaces intrusive node pointers with stable
//! generational handles, so no address arithmetic is needed to get from a
//! link back to its record.
//!
//! Invariants maintained by this module:
//! - A record is in at most one chain at a time; its links are cleared on
//!   removal so it can be relinked.
//! - `push_front` and `remove` are O(1) given a handle.
//! - `Cursor` traversal snapshots the successor before yielding, so the
//!   record just yielded may be unlinked (or even freed from the arena)
//!   before the next step.

use slotmap::{DefaultKey, SlotMap};

/// Embedded linkage for records that participate in a `Chain`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Links {
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

/// Implemented by arena records that carry chain linkage.
pub(crate) trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// One collision chain. Holds only the head handle; the records live in
/// the caller's arena.
#[derive(Debug, Default)]
pub(crate) struct Chain {
    head: Option<DefaultKey>,
}

impl Chain {
    pub(crate) fn new() -> Self {
        Chain { head: None }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Splice `handle` in at the head. Most-recently-inserted records come
    /// first in traversal order. `handle` must be live in `arena` and not
    /// already linked into a chain.
    pub(crate) fn push_front<T: Linked>(
        &mut self,
        arena: &mut SlotMap<DefaultKey, T>,
        handle: DefaultKey,
    ) {
        let old_head = self.head;
        {
            let links = arena[handle].links_mut();
            debug_assert!(
                links.prev.is_none() && links.next.is_none(),
                "record already linked into a chain"
            );
            links.next = old_head;
            links.prev = None;
        }
        if let Some(h) = old_head {
            arena[h].links_mut().prev = Some(handle);
        }
        self.head = Some(handle);
    }

    /// Unlink `handle` from this chain and clear its links. `handle` must
    /// be live in `arena` and linked into this chain.
    pub(crate) fn remove<T: Linked>(
        &mut self,
        arena: &mut SlotMap<DefaultKey, T>,
        handle: DefaultKey,
    ) {
        let Links { prev, next } = *arena[handle].links();
        match prev {
            Some(p) => arena[p].links_mut().next = next,
            None => {
                debug_assert_eq!(self.head, Some(handle), "record not in this chain");
                self.head = next;
            }
        }
        if let Some(n) = next {
            arena[n].links_mut().prev = prev;
        }
        *arena[handle].links_mut() = Links::default();
    }

    /// Forward traversal, head first. Restartable: each call starts fresh.
    pub(crate) fn iter<'a, T: Linked>(&self, arena: &'a SlotMap<DefaultKey, T>) -> Iter<'a, T> {
        Iter {
            arena,
            next: self.head,
        }
    }

    /// Removal-safe traversal. The cursor does not borrow the arena
    /// between steps, so the caller may unlink or free the handle it was
    /// just given.
    pub(crate) fn cursor(&self) -> Cursor {
        Cursor { next: self.head }
    }
}

pub(crate) struct Iter<'a, T> {
    arena: &'a SlotMap<DefaultKey, T>,
    next: Option<DefaultKey>,
}

impl<'a, T: Linked> Iterator for Iter<'a, T> {
    type Item = (DefaultKey, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.next?;
        let record = &self.arena[h];
        self.next = record.links().next;
        Some((h, record))
    }
}

/// Detached traversal state for a single chain. The successor is read
/// before a handle is yielded, never after.
pub(crate) struct Cursor {
    next: Option<DefaultKey>,
}

impl Cursor {
    pub(crate) fn next<T: Linked>(&mut self, arena: &SlotMap<DefaultKey, T>) -> Option<DefaultKey> {
        let h = self.next?;
        self.next = arena[h].links().next;
        Some(h)
    }
}
