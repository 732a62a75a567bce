//! Fixed binary layout for [`Scan`] values.
//!
//! A scan body is laid out in network byte order as:
//!
//! ```text
//! [i64 seconds][i32 nanos][u16 point count][f32 ranges...][f32 intensities...]
//! ```
//!
//! The layout carries no framing of its own; fragmentation and reassembly
//! treat it as an opaque byte string and preserve it byte-for-byte.
//!
//! # Error Handling
//!
//! Encoding fails fast with [`CodecError::RepresentationOverflow`] when the
//! point count does not fit the `u16` count field. Decoding fails with
//! [`CodecError::MalformedPayload`] when the input is shorter than the length
//! implied by its header. Trailing bytes are ignored and float samples are
//! never validated.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    byte_order::{
        read_network_f32,
        read_network_i32,
        read_network_i64,
        read_network_u16,
        split_array,
        write_network_f32,
        write_network_i32,
        write_network_i64,
        write_network_u16,
    },
    scan::{Scan, ScanId},
};

pub mod error;

pub use error::CodecError;

/// Bytes taken by the seconds, nanoseconds and point count fields.
pub const HEADER_LEN: usize = 8 + 4 + 2;

/// Bytes taken by one `f32` sample.
pub const SAMPLE_LEN: usize = 4;

/// Largest point count representable by the `u16` count field.
pub const MAX_POINTS: usize = u16::MAX as usize;

/// Encoded size of the largest representable scan.
pub const MAX_ENCODED_LEN: usize = encoded_len(MAX_POINTS);

/// Encoded size of a scan holding `points` samples per channel.
///
/// # Examples
///
/// ```
/// use scanframe::codec::encoded_len;
/// assert_eq!(encoded_len(3), 38);
/// ```
#[must_use]
pub const fn encoded_len(points: usize) -> usize { HEADER_LEN + points * 2 * SAMPLE_LEN }

/// Serialise `scan` into its fixed binary layout.
///
/// # Errors
///
/// Returns [`CodecError::RepresentationOverflow`] when the scan holds more
/// than [`MAX_POINTS`] points.
///
/// # Examples
///
/// ```
/// use scanframe::{Scan, ScanId, codec::encode_scan};
/// let scan = Scan::new(ScanId::new(1000, 500), vec![1.0], vec![9.0]).expect("valid scan");
/// let body = encode_scan(&scan).expect("encode scan");
/// assert_eq!(body.len(), 22);
/// ```
pub fn encode_scan(scan: &Scan) -> Result<Bytes, CodecError> {
    let points = scan.point_count();
    let count = u16::try_from(points).map_err(|_| CodecError::RepresentationOverflow {
        points,
        max: MAX_POINTS,
    })?;

    let mut buf = BytesMut::with_capacity(encoded_len(points));
    buf.put_slice(&write_network_i64(scan.id().seconds()));
    buf.put_slice(&write_network_i32(scan.id().nanos()));
    buf.put_slice(&write_network_u16(count));
    for &range in scan.ranges() {
        buf.put_slice(&write_network_f32(range));
    }
    for &intensity in scan.intensities() {
        buf.put_slice(&write_network_f32(intensity));
    }
    Ok(buf.freeze())
}

/// Deserialise a scan previously produced by [`encode_scan`].
///
/// # Errors
///
/// Returns [`CodecError::MalformedPayload`] when `bytes` is shorter than the
/// header or than the length implied by the header's point count.
pub fn decode_scan(bytes: &[u8]) -> Result<Scan, CodecError> {
    let actual = bytes.len();
    let truncated = |expected| CodecError::MalformedPayload { expected, actual };

    let mut input = bytes;
    let header_err = truncated(HEADER_LEN);
    let seconds = read_network_i64(split_array(&mut input).ok_or(header_err)?);
    let nanos = read_network_i32(split_array(&mut input).ok_or(header_err)?);
    let points = usize::from(read_network_u16(split_array(&mut input).ok_or(header_err)?));

    let expected = encoded_len(points);
    if actual < expected {
        return Err(truncated(expected));
    }

    let body_err = truncated(expected);
    let ranges = read_samples(&mut input, points).ok_or(body_err)?;
    let intensities = read_samples(&mut input, points).ok_or(body_err)?;

    // Both channels were read with the same count.
    Scan::new(ScanId::new(seconds, nanos), ranges, intensities).map_err(|_| body_err)
}

fn read_samples(input: &mut &[u8], points: usize) -> Option<Vec<f32>> {
    let mut samples = Vec::with_capacity(points);
    for _ in 0..points {
        samples.push(read_network_f32(split_array(input)?));
    }
    Some(samples)
}
