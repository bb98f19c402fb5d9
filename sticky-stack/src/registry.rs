use alloc::vec::Vec;

use crate::{Generation, HeaderEntry, HeaderId, StackError, Trigger};

/// The ordered set of participating headers.
///
/// Order is mount order: entries are only ever appended or removed, never moved, so a header's
/// position relative to the headers that are still mounted never changes. Every mutation bumps
/// the shared [`Trigger`] so consumers re-evaluate.
///
/// The registry is owned by one [`crate::StickyStack`] and reached through it; it is not a global.
///
/// Cloning forks the trigger: the clone starts at the same generation but bumps independently.
#[derive(Debug)]
pub struct StackRegistry<H> {
    entries: Vec<HeaderEntry<H>>,
    next_id: u64,
    trigger: Trigger,
}

impl<H: Clone> Clone for StackRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            next_id: self.next_id,
            trigger: self.trigger.fork(),
        }
    }
}

impl<H> Default for StackRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> StackRegistry<H> {
    pub fn new() -> Self {
        Self::with_trigger(Trigger::new())
    }

    /// Creates a registry that publishes into an existing trigger.
    pub fn with_trigger(trigger: Trigger) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            trigger,
        }
    }

    /// Hands out a fresh id. Ids are never reused, even after the header unregisters.
    pub fn allocate_id(&mut self) -> HeaderId {
        let id = HeaderId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Appends `entry` at the end of the stack.
    ///
    /// Registering an id that is already present leaves the stack untouched and returns
    /// [`StackError::DuplicateRegistration`].
    pub fn register(&mut self, entry: HeaderEntry<H>) -> Result<(), StackError> {
        if self.contains(entry.id) {
            swarn!(id = entry.id.0, "StackRegistry::register: duplicate registration ignored");
            return Err(StackError::DuplicateRegistration(entry.id));
        }
        sdebug!(id = entry.id.0, position = self.entries.len(), "StackRegistry::register");
        if entry.id.0 >= self.next_id {
            self.next_id = entry.id.0.saturating_add(1);
        }
        self.entries.push(entry);
        self.trigger.bump();
        Ok(())
    }

    /// Removes the entry with `id`. Returns `None` (and changes nothing) if it was not present.
    pub fn unregister(&mut self, id: HeaderId) -> Option<HeaderEntry<H>> {
        let index = self.position(id)?;
        sdebug!(id = id.0, position = index, "StackRegistry::unregister");
        // `remove`, not `swap_remove`: the survivors must keep their relative order.
        let entry = self.entries.remove(index);
        self.trigger.bump();
        Some(entry)
    }

    /// The current order, for read-only use within one evaluation tick.
    pub fn snapshot(&self) -> &[HeaderEntry<H>] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry<H>> {
        self.entries.iter()
    }

    pub fn position(&self, id: HeaderId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: HeaderId) -> Option<&HeaderEntry<H>> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: HeaderId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forces every consumer of the snapshot to re-evaluate without changing the order.
    pub fn notify_external_change(&self) -> Generation {
        self.trigger.bump()
    }

    pub fn generation(&self) -> Generation {
        self.trigger.generation()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }
}
