//! Adapter utilities for the `sticky-stack` crate.
//!
//! The `sticky-stack` crate is UI-agnostic and holds the registry and the math. This crate
//! provides the pieces a UI integration wires around it:
//!
//! - [`Host`]: measurement plus viewport event subscription, implemented once per toolkit
//! - [`Provider`]: owns the stack, installs the resize/scroll listeners, batches passes per frame
//! - [`StickyHeader`]: a mounted header's handle; read its stacking, unregister on drop
//! - [`MemoryHost`]: an in-memory document of cards for headless use and tests
//!
//! This crate is intentionally framework-agnostic (no DOM or widget bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod header;
mod host;
mod memory;
mod provider;
mod style;


pub use error::ProviderError;
pub use header::StickyHeader;
pub use host::{Host, SubscriptionId, ViewportCallback};
pub use memory::{CardNodes, MemoryHost, NodeId};
pub use provider::Provider;
pub use style::HeaderStyle;
