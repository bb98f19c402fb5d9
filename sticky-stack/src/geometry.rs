use crate::Geometry;

/// Layout measurements supplied by the host.
///
/// Implementations must be synchronous and side-effect free: the stack calls them several times
/// per tick and assumes the layout does not change between calls within one tick.
pub trait GeometrySource<H> {
    /// Measures a mounted element. Returns `None` when the handle is not attached to a
    /// renderable surface yet (or any more); the stack defers that header to the next tick.
    fn measure(&self, handle: &H) -> Option<Geometry>;

    /// Current vertical scroll offset of the document.
    fn scroll_top(&self) -> u64;
}

impl<H, G: GeometrySource<H> + ?Sized> GeometrySource<H> for &G {
    fn measure(&self, handle: &H) -> Option<Geometry> {
        (**self).measure(handle)
    }

    fn scroll_top(&self) -> u64 {
        (**self).scroll_top()
    }
}
