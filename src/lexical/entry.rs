//! Entry references into a dictionary's content blob.

use serde::{Deserialize, Serialize};

/// Size of one entry reference in the persisted index (`u64` offset + `u32` length).
pub const ENTRY_REF_ENCODED_LEN: usize = 12;

/// A byte range inside an externally owned, read-only content blob.
///
/// The index never copies definition text; it only remembers where to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryRef {
    pub offset: u64,
    pub length: u32,
}

impl EntryRef {
    pub fn new(offset: u64, length: u32) -> Self {
        Self { offset, length }
    }

    /// Exclusive end of the range, or `None` if it overflows `u64`.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.length as u64)
    }
}

impl From<(u64, u32)> for EntryRef {
    fn from((offset, length): (u64, u32)) -> Self {
        Self::new(offset, length)
    }
}
