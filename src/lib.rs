#![doc(html_root_url = "https://docs.rs/scanframe/latest")]
//! Public API for the `scanframe` library.
//!
//! This crate serialises LIDAR scans into a compact big-endian body, splits
//! the body into packets small enough for constrained transports, and
//! rebuilds scans from packets that may arrive out of order, duplicated, or
//! interleaved with other scans.

pub mod byte_order;
pub mod codec;
pub mod fragment;
pub mod metrics;
pub mod scan;
pub mod supervisor;
pub mod wire;

pub use codec::{CodecError, MAX_POINTS, decode_scan, encode_scan};
pub use fragment::{
    FragmentBatch,
    FragmentIndex,
    FragmentationConfig,
    FragmentationError,
    Fragmenter,
    Packet,
    PacketKind,
    ReassemblyError,
    ReassemblyProgress,
    Reassembler,
};
pub use scan::{Scan, ScanError, ScanId};
pub use supervisor::{SweepConfig, spawn_sweeper};
pub use wire::{PACKET_HEADER_LEN, WireError, decode_packet, encode_packet};
