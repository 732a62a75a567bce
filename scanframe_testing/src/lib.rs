//! Test utilities for `scanframe`.
//!
//! The helpers build deterministic sample scans, rearrange packet batches
//! into the delivery patterns a lossy transport produces, feed them to a
//! [`Reassembler`](scanframe::Reassembler), and capture the log and metric
//! output for assertions.
//!
//! ```rust
//! use scanframe::Reassembler;
//! use scanframe_testing::{deliver, fragment_with, reversed, sample_scan};
//!
//! let scan = sample_scan();
//! let packets = reversed(fragment_with(&scan, 10));
//! let rebuilt = deliver(&Reassembler::new(), packets);
//! assert_eq!(rebuilt, vec![scan]);
//! ```

pub mod delivery;
pub mod logging;
pub mod metrics;
pub mod scans;

pub use delivery::{
    deliver,
    deliver_over_wire,
    duplicated,
    fragment_with,
    interleave,
    reversed,
    start_last,
};
pub use logging::{LoggerHandle, logger};
pub use metrics::{MetricsCapture, capture_metrics};
pub use scans::{SAMPLE_ID, sample_scan, scan_strategy, synthetic_scan};
