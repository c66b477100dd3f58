//! Identity types for the pipeline system.
//!
//! Every element and stream receives a process-unique `ElementId` when it is
//! constructed. Ids are never reused, so they can serve as stable keys when a
//! collaborator joins several topology snapshots together.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ELEMENT_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a pipeline element or stream.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    pub const INVALID: ElementId = ElementId(u32::MAX);

    /// Allocate a fresh id.
    pub fn next() -> Self {
        ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "ElementId(INVALID)")
        } else {
            write!(f, "ElementId({})", self.0)
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "#invalid")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}
