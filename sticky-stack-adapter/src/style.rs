use core::fmt;

use sticky_stack::{HeaderPosition, Placement};

/// Inline style for a header, as data.
///
/// `Display` renders the CSS declarations a DOM host would set inline (`position: fixed;
/// top: 40px;`). In-flow headers render as an empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderStyle {
    /// Pinned offset; `None` while the header is in flow.
    pub top: Option<u64>,
    /// Height the placeholder must take on.
    pub padding_height: u32,
}

impl HeaderStyle {
    /// Class toggled on both the header and its placeholder while fixed.
    pub const FIXED_CLASS: &'static str = "fixed";

    pub fn from_placement(placement: Placement) -> Self {
        let top = match placement.header {
            HeaderPosition::Fixed { top } => Some(top),
            HeaderPosition::InFlow => None,
        };
        Self {
            top,
            padding_height: placement.padding_height,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.top.is_some()
    }

    pub fn class_name(&self) -> Option<&'static str> {
        self.is_fixed().then_some(Self::FIXED_CLASS)
    }
}

impl fmt::Display for HeaderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.top {
            Some(top) => write!(f, "position: fixed; top: {top}px;"),
            None => Ok(()),
        }
    }
}
