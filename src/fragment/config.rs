//! Configuration used by outbound fragmentation.

use std::num::NonZeroUsize;

use crate::wire::PACKET_HEADER_LEN;

/// Default cap on the `data` carried by one Continue or End packet.
pub const DEFAULT_MAX_FRAGMENT_SIZE: NonZeroUsize = match NonZeroUsize::new(240) {
    Some(size) => size,
    None => panic!("default fragment size must be non-zero"),
};

/// Settings that bound fragment sizes.
///
/// # Examples
///
/// ```
/// use scanframe::fragment::FragmentationConfig;
/// let config = FragmentationConfig::for_frame_budget(257).expect("budget fits a header");
/// assert_eq!(config.max_fragment_size.get(), 240);
/// assert_eq!(config.encoded_fragment_ceiling(), 257);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentationConfig {
    /// Maximum number of scan body bytes carried by a single fragment. The
    /// encoded packet additionally includes the wire header.
    pub max_fragment_size: NonZeroUsize,
}

impl FragmentationConfig {
    /// Create a configuration with an explicit fragment payload cap.
    #[must_use]
    pub const fn new(max_fragment_size: NonZeroUsize) -> Self { Self { max_fragment_size } }

    /// Derive a configuration from the largest message the transport accepts.
    ///
    /// `frame_budget` should reflect the transport's message size limit. The
    /// returned configuration leaves room for the packet wire header.
    ///
    /// Returns `None` when the budget cannot hold a header plus one data byte.
    #[must_use]
    pub fn for_frame_budget(frame_budget: usize) -> Option<Self> {
        let available = frame_budget.checked_sub(PACKET_HEADER_LEN)?;
        NonZeroUsize::new(available).map(Self::new)
    }

    /// Largest encoded packet produced under this configuration.
    #[must_use]
    pub const fn encoded_fragment_ceiling(&self) -> usize {
        self.max_fragment_size.get() + PACKET_HEADER_LEN
    }
}

impl Default for FragmentationConfig {
    fn default() -> Self { Self::new(DEFAULT_MAX_FRAGMENT_SIZE) }
}
