//! On-wire envelope for [`Packet`] values.
//!
//! Each packet travels as one transport message laid out in network byte
//! order:
//!
//! ```text
//! [u8 kind][i64 seconds][i32 nanos][u32 field][data...]
//! ```
//!
//! `kind` is `0x01` for Start, `0x02` for Continue and `0x03` for End. The
//! `u32` field holds the fragment total for Start and the fragment sequence
//! otherwise. Start packets carry no data; Continue and End packets carry the
//! rest of the message as their chunk. The transport is trusted to preserve
//! message boundaries, so no length prefix is written.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::{
    byte_order::{
        read_network_i32,
        read_network_i64,
        read_network_u32,
        split_array,
        write_network_i32,
        write_network_i64,
        write_network_u32,
    },
    fragment::{FragmentIndex, Packet, PacketKind},
    scan::ScanId,
};

/// Bytes preceding the chunk data in every encoded packet.
pub const PACKET_HEADER_LEN: usize = 1 + 8 + 4 + 4;

const KIND_START: u8 = 0x01;
const KIND_CONTINUE: u8 = 0x02;
const KIND_END: u8 = 0x03;

/// Failures raised while decoding a transport message into a [`Packet`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The message is shorter than the fixed header.
    #[error("packet truncated: need {needed} header bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    /// The kind byte names no known packet shape.
    #[error("unknown packet kind {0:#04x}")]
    UnknownKind(u8),
    /// A Start packet carried chunk data.
    #[error("start packet carries {len} unexpected data bytes")]
    UnexpectedData { len: usize },
}

const fn kind_byte(kind: PacketKind) -> u8 {
    match kind {
        PacketKind::Start => KIND_START,
        PacketKind::Continue => KIND_CONTINUE,
        PacketKind::End => KIND_END,
    }
}

/// Encode `packet` into a single transport message.
///
/// # Examples
///
/// ```
/// use scanframe::{
///     ScanId,
///     fragment::Packet,
///     wire::{PACKET_HEADER_LEN, decode_packet, encode_packet},
/// };
/// let packet = Packet::start(ScanId::new(1000, 500), 4);
/// let frame = encode_packet(&packet);
/// assert_eq!(frame.len(), PACKET_HEADER_LEN);
/// assert_eq!(decode_packet(frame), Ok(packet));
/// ```
#[must_use]
pub fn encode_packet(packet: &Packet) -> Bytes {
    let data = packet.data().map_or(&[][..], |data| data.as_ref());
    let field = match packet {
        Packet::Start {
            total_fragments, ..
        } => *total_fragments,
        Packet::Continue { sequence, .. } | Packet::End { sequence, .. } => sequence.get(),
    };
    let scan_id = packet.scan_id();

    let mut buf = BytesMut::with_capacity(PACKET_HEADER_LEN + data.len());
    buf.put_u8(kind_byte(packet.kind()));
    buf.put_slice(&write_network_i64(scan_id.seconds()));
    buf.put_slice(&write_network_i32(scan_id.nanos()));
    buf.put_slice(&write_network_u32(field));
    buf.put_slice(data);
    buf.freeze()
}

/// Decode a transport message produced by [`encode_packet`].
///
/// The returned chunk shares `frame`'s allocation.
///
/// # Errors
///
/// Returns [`WireError`] when the header is truncated, the kind byte is
/// unknown, or a Start packet carries data.
pub fn decode_packet(frame: Bytes) -> Result<Packet, WireError> {
    let truncated = WireError::Truncated {
        needed: PACKET_HEADER_LEN,
        available: frame.len(),
    };
    let mut header = frame.get(..PACKET_HEADER_LEN).ok_or(truncated)?;

    let [kind] = split_array::<1>(&mut header).ok_or(truncated)?;
    let seconds = read_network_i64(split_array(&mut header).ok_or(truncated)?);
    let nanos = read_network_i32(split_array(&mut header).ok_or(truncated)?);
    let field = read_network_u32(split_array(&mut header).ok_or(truncated)?);
    let scan_id = ScanId::new(seconds, nanos);
    let data = frame.slice(PACKET_HEADER_LEN..);

    match kind {
        KIND_START if data.is_empty() => Ok(Packet::start(scan_id, field)),
        KIND_START => Err(WireError::UnexpectedData { len: data.len() }),
        KIND_CONTINUE => Ok(Packet::continuation(scan_id, FragmentIndex::new(field), data)),
        KIND_END => Ok(Packet::end(scan_id, FragmentIndex::new(field), data)),
        other => Err(WireError::UnknownKind(other)),
    }
}
