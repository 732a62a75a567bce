//! Error types emitted by the fragmentation layer.
//!
//! Outbound and inbound failures are kept in separate enums so callers can
//! tell an unsendable scan from a transmission that went wrong in transit.

use thiserror::Error;

use super::FragmentIndex;
use crate::{codec::CodecError, scan::ScanId};

/// Errors produced while fragmenting outbound scans.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentationError {
    /// Serialisation failed before chunking.
    #[error("failed to encode scan: {0}")]
    Encode(#[from] CodecError),
    /// The payload needs more chunks than a `u32` sequence number can index.
    #[error("payload needs {chunks} fragments, more than a u32 sequence can index")]
    IndexOverflow { chunks: usize },
}

/// Errors produced while reassembling inbound packets.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// A `Start` packet announced zero fragments, which can never complete.
    #[error("scan {scan_id} announced an empty transmission")]
    EmptyTransmission { scan_id: ScanId },
    /// A `Continue` or `End` packet carried no bytes.
    #[error("fragment {sequence} of scan {scan_id} carries no data")]
    EmptyFragment {
        scan_id: ScanId,
        sequence: FragmentIndex,
    },
    /// A fragment addressed a chunk beyond the announced total.
    #[error(
        "fragment {sequence} of scan {scan_id} is outside the announced {total_fragments} \
         fragments"
    )]
    SequenceOutOfRange {
        scan_id: ScanId,
        sequence: FragmentIndex,
        total_fragments: u32,
    },
    /// Buffered fragments exceeded the per-scan byte cap; the buffer was dropped.
    #[error("scan {scan_id} grew to {attempted} bytes, above the {limit} byte limit")]
    MessageTooLarge {
        scan_id: ScanId,
        attempted: usize,
        limit: usize,
    },
    /// All fragments arrived but the concatenated body failed to decode.
    #[error("scan {scan_id} reassembled into a malformed payload: {source}")]
    Malformed {
        scan_id: ScanId,
        #[source]
        source: CodecError,
    },
}

impl ReassemblyError {
    /// Identity of the scan the failure relates to.
    #[must_use]
    pub const fn scan_id(&self) -> ScanId {
        match self {
            Self::EmptyTransmission { scan_id }
            | Self::EmptyFragment { scan_id, .. }
            | Self::SequenceOutOfRange { scan_id, .. }
            | Self::MessageTooLarge { scan_id, .. }
            | Self::Malformed { scan_id, .. } => *scan_id,
        }
    }
}
