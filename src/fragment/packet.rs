//! Packets exchanged between the fragmenter and the reassembler.
//!
//! Every packet carries the [`ScanId`] of the scan it belongs to. A
//! transmission is one `Start` announcing the chunk count, followed by the
//! chunks themselves as `Continue` packets and a final `End` packet.

use bytes::Bytes;
use derive_more::Display;

use super::FragmentIndex;
use crate::scan::ScanId;

/// Discriminates the three packet shapes without borrowing their payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum PacketKind {
    /// Announces a transmission.
    #[display("start")]
    Start,
    /// Carries an interior chunk.
    #[display("continue")]
    Continue,
    /// Carries the final chunk.
    #[display("end")]
    End,
}

impl PacketKind {
    /// Stable lowercase label, used for log fields and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Continue => "continue",
            Self::End => "end",
        }
    }
}

/// One unit of a fragmented scan transmission.
///
/// # Examples
///
/// ```
/// use scanframe::{
///     ScanId,
///     fragment::{FragmentIndex, Packet, PacketKind},
/// };
/// let id = ScanId::new(1000, 500);
/// let start = Packet::start(id, 2);
/// let end = Packet::end(id, FragmentIndex::new(1), vec![1_u8, 2]);
/// assert_eq!(start.kind(), PacketKind::Start);
/// assert_eq!(end.scan_id(), id);
/// assert_eq!(end.data().map(|data| data.len()), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    /// Announces that `total_fragments` data-bearing packets will follow.
    Start {
        scan_id: ScanId,
        total_fragments: u32,
    },
    /// An interior chunk at position `sequence`.
    Continue {
        scan_id: ScanId,
        sequence: FragmentIndex,
        data: Bytes,
    },
    /// The final chunk; `sequence` is `total_fragments - 1`.
    End {
        scan_id: ScanId,
        sequence: FragmentIndex,
        data: Bytes,
    },
}

impl Packet {
    /// Build a `Start` packet.
    #[must_use]
    pub const fn start(scan_id: ScanId, total_fragments: u32) -> Self {
        Self::Start {
            scan_id,
            total_fragments,
        }
    }

    /// Build a `Continue` packet.
    #[must_use]
    pub fn continuation(scan_id: ScanId, sequence: FragmentIndex, data: impl Into<Bytes>) -> Self {
        Self::Continue {
            scan_id,
            sequence,
            data: data.into(),
        }
    }

    /// Build an `End` packet.
    #[must_use]
    pub fn end(scan_id: ScanId, sequence: FragmentIndex, data: impl Into<Bytes>) -> Self {
        Self::End {
            scan_id,
            sequence,
            data: data.into(),
        }
    }

    /// Identity of the scan this packet belongs to.
    #[must_use]
    pub const fn scan_id(&self) -> ScanId {
        match self {
            Self::Start { scan_id, .. }
            | Self::Continue { scan_id, .. }
            | Self::End { scan_id, .. } => *scan_id,
        }
    }

    /// Shape of this packet.
    #[must_use]
    pub const fn kind(&self) -> PacketKind {
        match self {
            Self::Start { .. } => PacketKind::Start,
            Self::Continue { .. } => PacketKind::Continue,
            Self::End { .. } => PacketKind::End,
        }
    }

    /// Chunk position for data-bearing packets.
    #[must_use]
    pub const fn sequence(&self) -> Option<FragmentIndex> {
        match self {
            Self::Start { .. } => None,
            Self::Continue { sequence, .. } | Self::End { sequence, .. } => Some(*sequence),
        }
    }

    /// Chunk bytes for data-bearing packets.
    #[must_use]
    pub const fn data(&self) -> Option<&Bytes> {
        match self {
            Self::Start { .. } => None,
            Self::Continue { data, .. } | Self::End { data, .. } => Some(data),
        }
    }
}
