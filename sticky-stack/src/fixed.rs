/// Which reference frame decides whether a header is stuck.
///
/// Both agree on a static page. They differ in what they have to remember: the padding-relative
/// form reads the placeholder's live position each tick, the viewport-relative form keeps a
/// per-header "original offset" that must be refreshed whenever the header's stacked offset
/// changes. A stack uses exactly one policy for every header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixedPolicy {
    /// Fixed when `padding_bounding_top - stacked_top < 0`.
    #[default]
    PaddingRelative,
    /// Fixed when `scroll_top + stacked_top > original_offset_top`.
    ViewportRelative,
}

/// Padding-relative test. Equality belongs to the non-fixed state.
pub fn is_fixed_padding_relative(stacked_top: u64, padding_bounding_top: i64) -> bool {
    (padding_bounding_top as i128) - (stacked_top as i128) < 0
}

/// Viewport-relative test against a remembered in-flow offset. Equality is not fixed.
pub fn is_fixed_viewport_relative(scroll_top: u64, stacked_top: u64, original_offset_top: u64) -> bool {
    scroll_top.saturating_add(stacked_top) > original_offset_top
}

impl FixedPolicy {
    /// Applies the policy. `original_offset_top` is only read by [`Self::ViewportRelative`].
    pub fn decide(
        self,
        stacked_top: u64,
        padding_bounding_top: i64,
        scroll_top: u64,
        original_offset_top: u64,
    ) -> bool {
        match self {
            Self::PaddingRelative => is_fixed_padding_relative(stacked_top, padding_bounding_top),
            Self::ViewportRelative => {
                is_fixed_viewport_relative(scroll_top, stacked_top, original_offset_top)
            }
        }
    }
}
