//! Outbound helper that splits scans into transport-sized packets.
//!
//! [`Fragmenter`] serialises a [`Scan`] with the codec and chunks the body
//! into fixed-size pieces. The output always opens with a `Start` packet
//! announcing the chunk count, followed by the chunks in index order with the
//! last one tagged `End`. Chunks are zero-copy slices of the encoded body.

use std::num::NonZeroUsize;

use bytes::Bytes;
use log::debug;

use super::{FragmentIndex, FragmentationConfig, FragmentationError, Packet};
use crate::{
    codec::encode_scan,
    scan::{Scan, ScanId},
};

/// Splits scans into fragment-sized packets.
#[derive(Clone, Copy, Debug)]
pub struct Fragmenter {
    max_fragment_size: NonZeroUsize,
}

impl Fragmenter {
    /// Create a fragmenter that caps packet payloads at `max_fragment_size` bytes.
    #[must_use]
    pub const fn new(max_fragment_size: NonZeroUsize) -> Self { Self { max_fragment_size } }

    /// Return the maximum fragment payload size in bytes.
    #[must_use]
    pub const fn max_fragment_size(&self) -> NonZeroUsize { self.max_fragment_size }

    /// Serialise `scan` and split it into packets.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::Encode`] if the scan cannot be encoded,
    /// for example when it holds more than 65535 points.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use scanframe::{Scan, ScanId, fragment::Fragmenter};
    /// let scan = Scan::new(ScanId::new(1000, 500), vec![1.0, 2.0, 3.0], vec![9.0, 8.0, 7.0])
    ///     .expect("valid scan");
    /// let fragmenter = Fragmenter::new(NonZeroUsize::new(10).expect("non-zero"));
    /// let batch = fragmenter.fragment(&scan).expect("fragment scan");
    /// assert_eq!(batch.total_fragments(), 4);
    /// assert_eq!(batch.len(), 5);
    /// ```
    pub fn fragment(&self, scan: &Scan) -> Result<FragmentBatch, FragmentationError> {
        let body = encode_scan(scan)?;
        self.fragment_payload(scan.id(), body)
    }

    /// Split an already encoded scan body into packets tagged with `scan_id`.
    ///
    /// An empty payload yields a lone `Start` announcing zero fragments.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::IndexOverflow`] if more than `u32::MAX`
    /// chunks are required.
    pub fn fragment_payload(
        &self,
        scan_id: ScanId,
        payload: impl Into<Bytes>,
    ) -> Result<FragmentBatch, FragmentationError> {
        let payload = payload.into();
        let max = self.max_fragment_size.get();
        let len = payload.len();
        let chunks = len.div_ceil(max);
        let total_fragments =
            u32::try_from(chunks).map_err(|_| FragmentationError::IndexOverflow { chunks })?;

        let mut packets = Vec::with_capacity(chunks + 1);
        packets.push(Packet::start(scan_id, total_fragments));
        for (sequence, offset) in (0..total_fragments).zip((0..len).step_by(max)) {
            let end = offset.saturating_add(max).min(len);
            let index = FragmentIndex::new(sequence);
            let data = payload.slice(offset..end);
            packets.push(if end == len {
                Packet::end(scan_id, index, data)
            } else {
                Packet::continuation(scan_id, index, data)
            });
        }

        debug!("fragmented scan {scan_id}: {len} bytes into {total_fragments} fragments");
        Ok(FragmentBatch {
            scan_id,
            total_fragments,
            packets,
        })
    }
}

impl Default for Fragmenter {
    fn default() -> Self { Self::from(FragmentationConfig::default()) }
}

impl From<FragmentationConfig> for Fragmenter {
    fn from(config: FragmentationConfig) -> Self { Self::new(config.max_fragment_size) }
}

/// Packets produced for a single scan, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    scan_id: ScanId,
    total_fragments: u32,
    packets: Vec<Packet>,
}

impl FragmentBatch {
    /// Return the [`ScanId`] shared by all packets.
    #[must_use]
    pub const fn scan_id(&self) -> ScanId { self.scan_id }

    /// Number of data-bearing packets announced by the `Start` packet.
    #[must_use]
    pub const fn total_fragments(&self) -> u32 { self.total_fragments }

    /// Return the packets as a slice, `Start` first.
    #[must_use]
    pub fn packets(&self) -> &[Packet] { self.packets.as_slice() }

    /// Number of packets in the batch, including the `Start` packet.
    #[expect(
        clippy::len_without_is_empty,
        reason = "batches always hold a Start packet"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.packets.len() }

    /// Consume the batch, returning all packets.
    #[must_use]
    pub fn into_packets(self) -> Vec<Packet> { self.packets }
}

impl IntoIterator for FragmentBatch {
    type Item = Packet;
    type IntoIter = std::vec::IntoIter<Packet>;

    fn into_iter(self) -> Self::IntoIter { self.packets.into_iter() }
}
