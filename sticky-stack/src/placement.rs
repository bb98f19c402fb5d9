use crate::Stacking;

/// Where the header renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderPosition {
    /// In normal document flow.
    #[default]
    InFlow,
    /// Out of flow, pinned `top` pixels below the top of the viewport.
    Fixed { top: u64 },
}

/// The header's mode together with the height of its padding placeholder.
///
/// Both halves come from one value so a renderer can never apply one without the other: a fixed
/// header always travels with a placeholder of its own height, an in-flow header with an empty
/// one. Total document height is therefore the same on either side of the transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub header: HeaderPosition,
    pub padding_height: u32,
}

impl Placement {
    pub fn unfixed() -> Self {
        Self::default()
    }

    pub fn compensate(is_fixed: bool, header_height: u32, stacked_top: u64) -> Self {
        if is_fixed {
            Self {
                header: HeaderPosition::Fixed { top: stacked_top },
                padding_height: header_height,
            }
        } else {
            Self::unfixed()
        }
    }

    pub fn from_stacking(stacking: Stacking, header_height: u32) -> Self {
        Self::compensate(stacking.is_fixed, header_height, stacking.stacked_top)
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.header, HeaderPosition::Fixed { .. })
    }

    /// The pinned offset, if fixed.
    pub fn fixed_top(&self) -> Option<u64> {
        match self.header {
            HeaderPosition::Fixed { top } => Some(top),
            HeaderPosition::InFlow => None,
        }
    }
}
