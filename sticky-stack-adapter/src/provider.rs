use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};

use sticky_stack::{
    EvaluationReport, HeaderEntry, HeaderState, Placement, StackOptions, StickyStack,
    ViewportEvent,
};

use crate::host::HostView;
use crate::{Host, ProviderError, StickyHeader, SubscriptionId};

/// Owns one [`StickyStack`] and ties it to a host's viewport events.
///
/// The provider is the single owner of the registry; headers reach it through the handle returned
/// by [`Self::attach`]. A global resize/scroll listener pair (installed by [`Self::mount`]) bumps
/// the stack's generation, and [`Self::on_animation_frame`] turns however many events arrived
/// since the last frame into at most one evaluation pass.
///
/// Re-evaluation is blanket: every registered header is recomputed on every pass, `O(n)` per
/// frame with two listeners in total, rather than `n` per-header listeners.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `mount` / `unmount` with the host when the page is set up and torn down
/// - `attach` when a header component mounts (dropping the returned handle unregisters it)
/// - `on_animation_frame` once per frame, then apply each header's `placement`
#[derive(Debug)]
pub struct Provider<H> {
    stack: Rc<RefCell<StickyStack<H>>>,
    subscriptions: Vec<SubscriptionId>,
}

impl<H> Provider<H> {
    pub fn new(options: StackOptions<H>) -> Self {
        Self::from_stack(StickyStack::new(options))
    }

    pub fn from_stack(stack: StickyStack<H>) -> Self {
        Self {
            stack: Rc::new(RefCell::new(stack)),
            subscriptions: Vec::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Installs the resize and scroll listeners on `host`.
    ///
    /// A provider listens at most once; mounting it again returns
    /// [`ProviderError::AlreadyMounted`] and leaves the existing listeners in place.
    pub fn mount(&mut self, host: &mut impl Host<H>) -> Result<(), ProviderError> {
        if self.is_mounted() {
            awarn!("Provider::mount: already mounted");
            return Err(ProviderError::AlreadyMounted);
        }
        let trigger = self.stack.borrow().trigger().clone();
        for kind in ViewportEvent::ALL {
            let trigger = trigger.clone();
            let id = host.subscribe(
                kind,
                Box::new(move |event: ViewportEvent| {
                    trigger.publish(event);
                }),
            );
            self.subscriptions.push(id);
        }
        adebug!(listeners = self.subscriptions.len(), "Provider::mount");
        // Headers attached before mounting still need a first pass.
        self.stack.borrow().notify_external_change();
        Ok(())
    }

    /// Removes the listeners installed by `mount`. Returns `false` if the provider was not
    /// mounted.
    pub fn unmount(&mut self, host: &mut impl Host<H>) -> bool {
        if !self.is_mounted() {
            return false;
        }
        for id in self.subscriptions.drain(..) {
            host.unsubscribe(id);
        }
        adebug!("Provider::unmount");
        true
    }

    /// Registers a header and returns the handle its component keeps for its mounted lifetime.
    pub fn attach(&self, handle: H, padding: H) -> StickyHeader<H> {
        let mut stack = self.stack.borrow_mut();
        let id = stack.attach(handle, padding);
        atrace!(id = id.0, "Provider::attach");
        StickyHeader::new(id, Rc::downgrade(&self.stack), stack.trigger().clone())
    }

    /// Runs one batched evaluation pass if any event, registration or removal happened since the
    /// previous one. The scroll offset comes from [`Host::current_scroll_offset`].
    pub fn on_animation_frame(&self, host: &impl Host<H>) -> Option<EvaluationReport> {
        self.stack.borrow_mut().refresh(&HostView(host))
    }

    /// Forces a pass on the next frame (e.g. after the host changed a header's content).
    pub fn invalidate(&self) {
        self.stack.borrow().notify_external_change();
    }

    /// Visits every header in stack order with the placement to render.
    pub fn for_each_placement(&self, mut f: impl FnMut(&HeaderEntry<H>, Placement)) {
        self.stack
            .borrow()
            .for_each_header(|entry, state: &HeaderState| f(entry, state.placement));
    }

    pub fn stack(&self) -> Ref<'_, StickyStack<H>> {
        self.stack.borrow()
    }

    pub fn stack_mut(&self) -> RefMut<'_, StickyStack<H>> {
        self.stack.borrow_mut()
    }
}

impl<H> Default for Provider<H> {
    fn default() -> Self {
        Self::new(StackOptions::new())
    }
}

impl<H> Drop for Provider<H> {
    fn drop(&mut self) {
        if self.is_mounted() {
            awarn!(
                listeners = self.subscriptions.len(),
                "Provider dropped while mounted; call unmount to remove its listeners"
            );
        }
    }
}
