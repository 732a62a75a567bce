//! Scan value types shared by the codec, fragmenter and reassembler.
//!
//! A [`Scan`] is one LIDAR sweep: a timestamp plus parallel range and
//! intensity channels. The timestamp doubles as the scan's protocol identity
//! ([`ScanId`]), which tags every packet produced for the scan and keys the
//! receiver's reassembly buffers.

use derive_more::Display;
use thiserror::Error;

/// Timestamp pair identifying one scan transmission.
///
/// # Examples
///
/// ```
/// use scanframe::ScanId;
/// let id = ScanId::new(1000, 500);
/// assert_eq!(id.seconds(), 1000);
/// assert_eq!(id.nanos(), 500);
/// assert_eq!(id.to_string(), "1000.000000500");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{seconds}.{nanos:09}")]
pub struct ScanId {
    seconds: i64,
    nanos: i32,
}

impl ScanId {
    /// Create an identity from its seconds and nanoseconds components.
    #[must_use]
    pub const fn new(seconds: i64, nanos: i32) -> Self { Self { seconds, nanos } }

    /// Whole seconds component of the timestamp.
    #[must_use]
    pub const fn seconds(self) -> i64 { self.seconds }

    /// Nanoseconds component of the timestamp.
    #[must_use]
    pub const fn nanos(self) -> i32 { self.nanos }
}

impl From<(i64, i32)> for ScanId {
    fn from((seconds, nanos): (i64, i32)) -> Self { Self::new(seconds, nanos) }
}

/// Errors raised while constructing a [`Scan`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The range and intensity channels disagree on the point count.
    #[error("channel length mismatch: {ranges} ranges, {intensities} intensities")]
    ChannelLengthMismatch { ranges: usize, intensities: usize },
}

/// One timestamped sweep with equal-length range and intensity channels.
///
/// Equality compares floats numerically, so scans carrying `NaN` samples are
/// never equal to themselves. Use [`Scan::bitwise_eq`] when bit-exact
/// comparison is required.
#[derive(Clone, Debug, PartialEq)]
pub struct Scan {
    id: ScanId,
    ranges: Vec<f32>,
    intensities: Vec<f32>,
}

impl Scan {
    /// Build a scan from its identity and sample channels.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ChannelLengthMismatch`] when `ranges` and
    /// `intensities` differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanframe::{Scan, ScanId};
    /// let scan = Scan::new(ScanId::new(1, 0), vec![1.0, 2.0], vec![0.5, 0.25])
    ///     .expect("channels match");
    /// assert_eq!(scan.point_count(), 2);
    /// ```
    pub fn new(id: ScanId, ranges: Vec<f32>, intensities: Vec<f32>) -> Result<Self, ScanError> {
        if ranges.len() != intensities.len() {
            return Err(ScanError::ChannelLengthMismatch {
                ranges: ranges.len(),
                intensities: intensities.len(),
            });
        }
        Ok(Self {
            id,
            ranges,
            intensities,
        })
    }

    /// Return the scan identity.
    #[must_use]
    pub const fn id(&self) -> ScanId { self.id }

    /// Number of samples in each channel.
    #[must_use]
    pub fn point_count(&self) -> usize { self.ranges.len() }

    /// Borrow the range channel.
    #[must_use]
    pub fn ranges(&self) -> &[f32] { &self.ranges }

    /// Borrow the intensity channel.
    #[must_use]
    pub fn intensities(&self) -> &[f32] { &self.intensities }

    /// Consume the scan, returning its identity and channels.
    #[must_use]
    pub fn into_parts(self) -> (ScanId, Vec<f32>, Vec<f32>) {
        (self.id, self.ranges, self.intensities)
    }

    /// Compare two scans sample by sample on their IEEE-754 bit patterns.
    #[must_use]
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        fn same_bits(a: &[f32], b: &[f32]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        }

        self.id == other.id
            && same_bits(&self.ranges, &other.ranges)
            && same_bits(&self.intensities, &other.intensities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_rejects_mismatched_channels() {
        let err = Scan::new(ScanId::new(1, 2), vec![1.0, 2.0], vec![3.0])
            .expect_err("mismatched channels must be rejected");
        assert_eq!(
            err,
            ScanError::ChannelLengthMismatch {
                ranges: 2,
                intensities: 1,
            }
        );
    }

    #[test]
    fn bitwise_eq_treats_identical_nan_as_equal() {
        let scan = Scan::new(ScanId::new(0, 0), vec![f32::NAN], vec![1.0]).expect("valid scan");
        assert_ne!(scan, scan.clone());
        assert!(scan.bitwise_eq(&scan.clone()));
    }

    #[test]
    fn scan_id_orders_by_seconds_then_nanos() {
        assert!(ScanId::new(1, 999) < ScanId::new(2, 0));
        assert!(ScanId::new(2, 1) > ScanId::new(2, 0));
        assert_eq!(ScanId::from((7, 8)), ScanId::new(7, 8));
    }
}
