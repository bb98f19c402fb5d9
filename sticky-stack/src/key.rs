#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::{HeaderId, HeaderState};

#[cfg(feature = "std")]
pub(crate) type StateMap = HashMap<HeaderId, HeaderState>;
#[cfg(not(feature = "std"))]
pub(crate) type StateMap = BTreeMap<HeaderId, HeaderState>;
