//! Metric helpers for `scanframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::fragment::PacketKind;

/// Name of the counter tracking packets handed to a reassembler.
pub const PACKETS_INGESTED: &str = "scanframe_packets_ingested_total";
/// Name of the counter tracking scans rebuilt from their fragments.
pub const SCANS_REASSEMBLED: &str = "scanframe_scans_reassembled_total";
/// Name of the counter tracking fragments that arrived before their `Start`.
pub const ORPHAN_FRAGMENTS: &str = "scanframe_orphan_fragments_total";
/// Name of the counter tracking rejected packets and failed reconstructions.
pub const REASSEMBLY_ERRORS: &str = "scanframe_reassembly_errors_total";
/// Name of the counter tracking buffers removed by eviction.
pub const BUFFERS_EVICTED: &str = "scanframe_buffers_evicted_total";

/// Record an ingested packet of the given kind.
#[cfg(feature = "metrics")]
pub fn inc_packets(kind: PacketKind) {
    counter!(PACKETS_INGESTED, "kind" => kind.as_str()).increment(1);
}

/// Record an ingested packet of the given kind.
#[cfg(not(feature = "metrics"))]
pub fn inc_packets(_kind: PacketKind) {}

/// Record a successfully reassembled scan.
pub fn inc_reassembled() {
    #[cfg(feature = "metrics")]
    counter!(SCANS_REASSEMBLED).increment(1);
}

/// Record a fragment buffered before its scan's `Start`.
pub fn inc_orphan_fragments() {
    #[cfg(feature = "metrics")]
    counter!(ORPHAN_FRAGMENTS).increment(1);
}

/// Record a reassembly error.
pub fn inc_errors() {
    #[cfg(feature = "metrics")]
    counter!(REASSEMBLY_ERRORS).increment(1);
}

/// Record `count` evicted buffers.
#[cfg(feature = "metrics")]
pub fn inc_evicted(count: usize) {
    counter!(BUFFERS_EVICTED).increment(u64::try_from(count).unwrap_or(u64::MAX));
}

/// Record `count` evicted buffers.
#[cfg(not(feature = "metrics"))]
pub fn inc_evicted(_count: usize) {}
