//! Error types for the scan codec.

use thiserror::Error;

/// Failures raised while encoding or decoding a scan body.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The scan holds more points than the `u16` count field can describe.
    #[error("scan has {points} points but the encoding holds at most {max}")]
    RepresentationOverflow {
        /// Point count of the rejected scan.
        points: usize,
        /// Largest representable point count.
        max: usize,
    },

    /// The payload is shorter than its header-implied length.
    #[error("malformed scan payload: expected at least {expected} bytes, found {actual}")]
    MalformedPayload {
        /// Bytes required by the header (or by the header itself).
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },
}
