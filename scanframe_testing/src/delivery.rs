//! Delivery patterns and drivers for packet batches.

use std::num::NonZeroUsize;

use scanframe::{Packet, Reassembler, Scan, decode_packet, encode_packet};

/// Fragment `scan` into chunks of at most `max_fragment_size` bytes.
///
/// # Panics
///
/// Panics if `max_fragment_size` is zero or the scan cannot be encoded.
pub fn fragment_with(scan: &Scan, max_fragment_size: usize) -> Vec<Packet> {
    let max = NonZeroUsize::new(max_fragment_size).expect("fragment size must be non-zero");
    scanframe::Fragmenter::new(max)
        .fragment(scan)
        .expect("scan should fragment")
        .into_packets()
}

/// The batch backwards, so `Start` arrives last.
pub fn reversed(mut packets: Vec<Packet>) -> Vec<Packet> {
    packets.reverse();
    packets
}

/// Every fragment in order, then `Start`.
pub fn start_last(mut packets: Vec<Packet>) -> Vec<Packet> {
    packets.rotate_left(1);
    packets
}

/// Every packet delivered twice in a row.
pub fn duplicated(packets: Vec<Packet>) -> Vec<Packet> {
    packets
        .into_iter()
        .flat_map(|packet| [packet.clone(), packet])
        .collect()
}

/// Alternate packets from each batch until all are exhausted.
pub fn interleave(batches: Vec<Vec<Packet>>) -> Vec<Packet> {
    let mut iters: Vec<_> = batches.into_iter().map(Vec::into_iter).collect();
    let mut out = Vec::new();
    loop {
        let before = out.len();
        out.extend(iters.iter_mut().filter_map(Iterator::next));
        if out.len() == before {
            return out;
        }
    }
}

/// Feed `packets` to `reassembler`, collecting every rebuilt scan.
///
/// # Panics
///
/// Panics if the reassembler rejects a packet.
pub fn deliver(reassembler: &Reassembler, packets: impl IntoIterator<Item = Packet>) -> Vec<Scan> {
    packets
        .into_iter()
        .filter_map(|packet| reassembler.ingest(packet).expect("packet should be accepted"))
        .collect()
}

/// Like [`deliver`], but every packet is encoded and decoded through the
/// wire format first.
///
/// # Panics
///
/// Panics if a packet fails to decode or the reassembler rejects it.
pub fn deliver_over_wire(
    reassembler: &Reassembler,
    packets: impl IntoIterator<Item = Packet>,
) -> Vec<Scan> {
    deliver(
        reassembler,
        packets.into_iter().map(|packet| {
            decode_packet(encode_packet(&packet)).expect("encoded packet should decode")
        }),
    )
}
