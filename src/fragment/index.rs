//! Zero-based fragment positioning within a scan transmission.
//!
//! Provides [`FragmentIndex`], a type-safe wrapper around the `u32` sequence
//! number carried by Continue and End packets.

use std::num::TryFromIntError;

use derive_more::{Display, From};

/// Zero-based ordinal describing a fragment's position within its scan.
///
/// # Examples
///
/// ```
/// use scanframe::fragment::FragmentIndex;
/// let index = FragmentIndex::new(3);
/// assert_eq!(index.get(), 3);
/// assert!(index.is_within(4));
/// assert!(!index.is_within(3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct FragmentIndex(u32);

impl FragmentIndex {
    /// Construct an index from a `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the first valid fragment index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Report whether the index addresses one of `total_fragments` chunks.
    #[must_use]
    pub const fn is_within(self, total_fragments: u32) -> bool { self.0 < total_fragments }
}

impl TryFrom<usize> for FragmentIndex {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u32::try_from(value).map(Self) }
}

impl From<FragmentIndex> for u32 {
    fn from(value: FragmentIndex) -> Self { value.0 }
}
