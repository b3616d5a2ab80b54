//! Growable LIFO store for idle resources

use std::mem;
use std::time::Instant;

/// An idle resource together with the moment it went idle.
#[derive(Debug)]
pub(crate) struct IdleEntry<R> {
    pub resource: R,
    pub released_at: Instant,
}

/// Stack of idle entries, most recently released at the tail.
///
/// The store is the single owner of the backing storage. Capacity is
/// reserved in fixed chunks and never shrinks; only eviction and teardown
/// remove entries. Every method is index work only and runs while the
/// caller holds the pool lock.
#[derive(Debug)]
pub(crate) struct IdleStore<R> {
    entries: Vec<IdleEntry<R>>,
    chunk: usize,
}

impl<R> IdleStore<R> {
    /// `chunk` is both the capacity reserved up front and the growth step.
    /// A chunk of 0 is treated as 1.
    pub fn new(chunk: usize) -> Self {
        let chunk = chunk.max(1);
        Self {
            entries: Vec::with_capacity(chunk),
            chunk,
        }
    }

    /// Remove and return the most recently released entry. An empty store
    /// is a miss, not an error.
    pub fn pop(&mut self) -> Option<IdleEntry<R>> {
        self.entries.pop()
    }

    /// Append at the tail, growing the backing storage by one chunk first
    /// when it is full. Existing entries and their order are untouched.
    pub fn push(&mut self, entry: IdleEntry<R>) {
        if self.entries.len() == self.entries.capacity() {
            self.entries.reserve_exact(self.chunk);
        }
        self.entries.push(entry);
    }

    /// Remove and return every entry released strictly before `cutoff`,
    /// oldest first. Kept entries stay in their original order.
    pub fn drain_older_than(&mut self, cutoff: Instant) -> Vec<IdleEntry<R>> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let mut kept = Vec::with_capacity(self.entries.capacity());
        let mut timed_out = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.released_at < cutoff {
                timed_out.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;
        timed_out
    }

    /// Take every entry, oldest first, leaving the store empty with its
    /// current capacity intact.
    pub fn take_all(&mut self) -> Vec<IdleEntry<R>> {
        let capacity = self.entries.capacity();
        mem::replace(&mut self.entries, Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}
