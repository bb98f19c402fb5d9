//! A headless engine for stacked sticky section headers.
//!
//! As the document scrolls, each participating header sticks to the top of the viewport just
//! below the headers that stuck before it, so the stuck headers pile up in their original order.
//!
//! This crate holds the state and the math:
//! - an ordered registry of headers (mount order, append/remove only)
//! - the stacked offset of each header: the running sum of the rendered heights above it
//! - the fixed/in-flow decision for each header
//! - the padding placeholder height that keeps the document from reflowing when a header leaves
//!   the flow
//! - a generation counter that viewport events bump to force re-evaluation
//!
//! It is UI-agnostic. A host is expected to provide element measurements and the scroll offset
//! through [`GeometrySource`], and to apply the resulting [`Placement`]s. For a provider/header
//! lifecycle on top of a host event loop, see the `sticky-stack-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod fixed;
mod geometry;
mod key;
mod offset;
mod options;
mod placement;
mod registry;
mod stack;
mod trigger;
mod types;

#[cfg(test)]
mod tests;

pub use error::StackError;
pub use fixed::{FixedPolicy, is_fixed_padding_relative, is_fixed_viewport_relative};
pub use geometry::GeometrySource;
pub use offset::{compute_stacked_top, for_each_stacked_top};
pub use options::{OnChangeCallback, StackOptions};
pub use placement::{HeaderPosition, Placement};
pub use registry::StackRegistry;
pub use stack::{HeaderState, StickyStack};
pub use trigger::Trigger;
pub use types::{
    EvaluationReport, Generation, Geometry, HeaderEntry, HeaderId, Stacking, ViewportEvent,
};
