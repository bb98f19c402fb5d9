use alloc::boxed::Box;

use sticky_stack::{Geometry, GeometrySource, ViewportEvent};

/// A viewport listener installed by a provider.
pub type ViewportCallback = Box<dyn FnMut(ViewportEvent)>;

/// Identifies an installed viewport listener so it can be removed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(pub u64);

/// The host environment: layout measurement plus viewport event subscription.
///
/// Implement this once per UI toolkit (DOM bindings, a TUI scroll view, a test double...).
pub trait Host<H>: GeometrySource<H> {
    /// Installs `callback` for events of `kind`.
    fn subscribe(&mut self, kind: ViewportEvent, callback: ViewportCallback) -> SubscriptionId;

    /// Removes a listener. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Scroll offset of the scroll container driving the stack.
    ///
    /// This is the offset a provider's frame evaluates against. Hosts whose measurement layer
    /// reports a different `scroll_top` (e.g. a nested scroll view) override it here.
    fn current_scroll_offset(&self) -> u64 {
        self.scroll_top()
    }

    /// Scroll offset of the document element. Identical to `current_scroll_offset` for hosts
    /// with a single global viewport.
    ///
    /// Not read by the stack; renderers use it to position content relative to the page.
    fn document_scroll_top(&self) -> u64 {
        self.current_scroll_offset()
    }
}

/// Measures through a host while taking the scroll offset from
/// [`Host::current_scroll_offset`].
pub(crate) struct HostView<'a, T>(pub(crate) &'a T);

impl<H, T: Host<H>> GeometrySource<H> for HostView<'_, T> {
    fn measure(&self, handle: &H) -> Option<Geometry> {
        self.0.measure(handle)
    }

    fn scroll_top(&self) -> u64 {
        self.0.current_scroll_offset()
    }
}
