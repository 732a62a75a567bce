//! Fragmentation and re-assembly of scans for size-bounded transports.
//!
//! This module collects the domain types used to split a serialised scan into
//! packets and to rebuild it on the receiving side. Each sub-module focuses on
//! a single concept to keep the code small and easy to audit while still
//! providing a cohesive API at the crate root.

pub mod config;
pub mod error;
pub mod fragmenter;
pub mod index;
pub mod packet;
pub mod reassembler;

pub use config::{DEFAULT_MAX_FRAGMENT_SIZE, FragmentationConfig};
pub use error::{FragmentationError, ReassemblyError};
pub use fragmenter::{FragmentBatch, Fragmenter};
pub use index::FragmentIndex;
pub use packet::{Packet, PacketKind};
pub use reassembler::{DEFAULT_MAX_SCAN_SIZE, ReassemblyProgress, Reassembler};
