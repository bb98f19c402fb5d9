use core::fmt;

/// Stable identity of a registered header.
///
/// Ids are handed out by [`crate::StackRegistry::allocate_id`] from a monotonically increasing
/// counter and are never reused by the same registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderId(pub u64);

impl fmt::Display for HeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "header#{}", self.0)
    }
}

/// One participating header: its identity plus the host handles of the header element and its
/// padding placeholder.
///
/// `H` is whatever the host uses to refer to a rendered element (a node id, a widget key...). The
/// registry keeps copies of the handles for lookup only; the element lifecycle stays with the
/// component that registered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderEntry<H> {
    pub id: HeaderId,
    pub handle: H,
    pub padding: H,
}

impl<H> HeaderEntry<H> {
    pub fn new(id: HeaderId, handle: H, padding: H) -> Self {
        Self {
            id,
            handle,
            padding,
        }
    }
}

/// A single layout measurement of a mounted element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// Current rendered height.
    pub height: u32,
    /// Position in the document (un-fixed flow for in-flow elements).
    pub offset_top: u64,
    /// Distance from the top of the viewport; negative once scrolled past.
    pub bounding_top: i64,
}

/// The per-header value renderers read each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stacking {
    /// Viewport offset at which the header is pinned once fixed.
    pub stacked_top: u64,
    pub is_fixed: bool,
}

/// Events that force every registered header to re-evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewportEvent {
    Resize,
    Scroll,
}

impl ViewportEvent {
    pub const ALL: [Self; 2] = [Self::Resize, Self::Scroll];
}

/// A value of the re-evaluation counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(pub u64);

impl Generation {
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Summary of one evaluation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationReport {
    /// Generation the pass brought the engine up to.
    pub generation: Generation,
    /// Number of headers visited.
    pub evaluated: usize,
    /// Number of headers whose [`Stacking`] differs from the previous pass.
    pub changed: usize,
    /// Number of headers whose geometry could not be measured and kept their previous state.
    pub deferred: usize,
}
