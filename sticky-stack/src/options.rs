use alloc::sync::Arc;

use crate::{EvaluationReport, FixedPolicy, StickyStack};

/// A callback fired after an evaluation pass in which at least one header changed.
pub type OnChangeCallback<H> = Arc<dyn Fn(&StickyStack<H>, &EvaluationReport) + Send + Sync>;

/// Configuration for [`crate::StickyStack`].
///
/// Cheap to clone: the callback lives in an `Arc`, so adapters can tweak a field and hand the
/// options back through `StickyStack::set_options`.
pub struct StackOptions<H> {
    /// How the fixed state is decided. Defaults to [`FixedPolicy::PaddingRelative`].
    pub policy: FixedPolicy,

    /// When disabled, every header reports `Stacking::default()` and renders in flow.
    pub enabled: bool,

    /// Viewport offset where the stack begins (e.g. below an app bar that is not part of the
    /// stack). Added to every `stacked_top`.
    pub top_inset: u32,

    pub on_change: Option<OnChangeCallback<H>>,
}

impl<H> Clone for StackOptions<H> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            enabled: self.enabled,
            top_inset: self.top_inset,
            on_change: self.on_change.clone(),
        }
    }
}

impl<H> Default for StackOptions<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> StackOptions<H> {
    pub fn new() -> Self {
        Self {
            policy: FixedPolicy::default(),
            enabled: true,
            top_inset: 0,
            on_change: None,
        }
    }

    pub fn with_policy(mut self, policy: FixedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_top_inset(mut self, top_inset: u32) -> Self {
        self.top_inset = top_inset;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&StickyStack<H>, &EvaluationReport) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    /// Returns `true` if switching from `self` to `other` can change any header's state.
    pub(crate) fn affects_layout(&self, other: &Self) -> bool {
        self.policy != other.policy
            || self.enabled != other.enabled
            || self.top_inset != other.top_inset
    }
}

impl<H> core::fmt::Debug for StackOptions<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StackOptions")
            .field("policy", &self.policy)
            .field("enabled", &self.enabled)
            .field("top_inset", &self.top_inset)
            .finish_non_exhaustive()
    }
}
