use alloc::rc::Weak;
use core::cell::{Cell, RefCell};

use sticky_stack::{HeaderId, Placement, Stacking, StickyStack, Trigger};

use crate::{HeaderStyle, ProviderError};

/// A mounted header's link to its provider.
///
/// The header owns its registry entry: dropping the handle unregisters it. The link to the stack
/// is weak, so a header that outlives its provider reads as unfixed at offset 0 instead of
/// keeping the stack alive. If the stack is borrowed when the handle drops, removal is queued on
/// the stack's trigger and applied by the next pass.
#[derive(Debug)]
pub struct StickyHeader<H> {
    id: HeaderId,
    stack: Weak<RefCell<StickyStack<H>>>,
    trigger: Trigger,
    seen_pass: Cell<Option<u64>>,
}

impl<H> StickyHeader<H> {
    pub(crate) fn new(
        id: HeaderId,
        stack: Weak<RefCell<StickyStack<H>>>,
        trigger: Trigger,
    ) -> Self {
        Self {
            id,
            stack,
            trigger,
            seen_pass: Cell::new(None),
        }
    }

    pub fn id(&self) -> HeaderId {
        self.id
    }

    /// The header's current stacked offset and fixed state.
    ///
    /// Never fails; anything that prevents an answer degrades to `Stacking::default()`.
    pub fn use_stacking(&self) -> Stacking {
        self.with_stack(|s| s.stacking(self.id)).unwrap_or_default()
    }

    pub fn try_stacking(&self) -> Result<Stacking, ProviderError> {
        self.with_stack(|s| s.try_stacking(self.id))
            .ok_or(ProviderError::ProviderGone)?
            .map_err(ProviderError::from)
    }

    /// Header mode and placeholder height to render.
    pub fn placement(&self) -> Placement {
        self.with_stack(|s| s.placement(self.id)).unwrap_or_default()
    }

    pub fn style(&self) -> HeaderStyle {
        HeaderStyle::from_placement(self.placement())
    }

    /// Returns the stacking if a pass ran since the last call, `None` otherwise.
    ///
    /// Lets a renderer skip work on frames where the stack did not re-evaluate.
    pub fn poll(&self) -> Option<Stacking> {
        let (passes, stacking) = self.with_stack(|s| (s.passes(), s.stacking(self.id)))?;
        if passes == 0 || self.seen_pass.get() == Some(passes) {
            return None;
        }
        self.seen_pass.set(Some(passes));
        Some(stacking)
    }

    fn with_stack<R>(&self, f: impl FnOnce(&StickyStack<H>) -> R) -> Option<R> {
        let stack = self.stack.upgrade()?;
        let stack = stack.try_borrow().ok()?;
        Some(f(&stack))
    }
}

impl<H> Drop for StickyHeader<H> {
    fn drop(&mut self) {
        let Some(stack) = self.stack.upgrade() else {
            return;
        };
        match stack.try_borrow_mut() {
            Ok(mut stack) => {
                stack.detach(self.id);
                atrace!(id = self.id.0, "StickyHeader::drop");
            }
            Err(_) => {
                self.trigger.schedule_detach(self.id);
                adebug!(id = self.id.0, "StickyHeader::drop: stack busy, detach queued");
            }
        }
    }
}
