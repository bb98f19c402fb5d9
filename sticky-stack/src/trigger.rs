use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::{Generation, HeaderId, ViewportEvent};

#[derive(Debug, Default)]
struct TriggerState {
    generation: Cell<Generation>,
    resizes: Cell<u64>,
    scrolls: Cell<u64>,
    pending_detach: RefCell<Vec<HeaderId>>,
}

/// The publish half of re-evaluation.
///
/// A `Trigger` is a shared counter: every clone observes the same generation. Viewport listeners
/// call [`Trigger::publish`] (which is cheap: no borrow of the stack is needed) and consumers
/// compare the generation they last evaluated against [`Trigger::generation`] to decide whether a
/// new pass is due.
///
/// This is single-threaded by construction (`Rc` + `Cell`). Hosts that drive the stack from
/// several threads must wrap the whole [`crate::StickyStack`] in a lock instead of sharing a
/// trigger.
#[derive(Clone, Debug, Default)]
pub struct Trigger {
    state: Rc<TriggerState>,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every consumer dirty without touching the registry.
    pub fn bump(&self) -> Generation {
        let next = self.state.generation.get().next();
        self.state.generation.set(next);
        next
    }

    /// Records a viewport event and bumps the generation.
    pub fn publish(&self, event: ViewportEvent) -> Generation {
        let counter = match event {
            ViewportEvent::Resize => &self.state.resizes,
            ViewportEvent::Scroll => &self.state.scrolls,
        };
        counter.set(counter.get().saturating_add(1));
        strace!(?event, "Trigger::publish");
        self.bump()
    }

    pub fn generation(&self) -> Generation {
        self.state.generation.get()
    }

    pub fn resize_count(&self) -> u64 {
        self.state.resizes.get()
    }

    pub fn scroll_count(&self) -> u64 {
        self.state.scrolls.get()
    }

    /// Queues `id` for removal by the next pass and bumps the generation.
    ///
    /// Used when a header goes away while the stack itself is borrowed and cannot be mutated.
    pub fn schedule_detach(&self, id: HeaderId) -> Generation {
        self.state.pending_detach.borrow_mut().push(id);
        strace!(id = id.0, "Trigger::schedule_detach");
        self.bump()
    }

    /// Drains the ids queued by [`Self::schedule_detach`].
    pub fn take_pending_detaches(&self) -> Vec<HeaderId> {
        core::mem::take(&mut *self.state.pending_detach.borrow_mut())
    }

    pub fn has_pending_detaches(&self) -> bool {
        !self.state.pending_detach.borrow().is_empty()
    }

    /// An independent trigger starting from this one's counters and pending detaches.
    pub fn fork(&self) -> Self {
        Self {
            state: Rc::new(TriggerState {
                generation: Cell::new(self.state.generation.get()),
                resizes: Cell::new(self.state.resizes.get()),
                scrolls: Cell::new(self.state.scrolls.get()),
                pending_detach: RefCell::new(self.state.pending_detach.borrow().clone()),
            }),
        }
    }

    /// Returns `true` if both handles publish into the same counter.
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
