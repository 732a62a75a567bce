//! Helpers for explicit network byte-order conversions.
//!
//! The scan body and the packet envelope are both big-endian. These helpers
//! keep Clippy expectations scoped to the conversion points so the codec and
//! wire modules can stay explicit about endianness without repeating lint
//! annotations.

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use scanframe::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u16::from_be_bytes(bytes)
}

/// Serialise a `u32` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use scanframe::byte_order::write_network_u32;
///
/// assert_eq!(write_network_u32(0x1234_5678), [0x12, 0x34, 0x56, 0x78]);
/// ```
#[must_use]
pub fn write_network_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u32` from its on-wire representation.
#[must_use]
pub fn read_network_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u32::from_be_bytes(bytes)
}

/// Serialise an `i32` in network byte order (big-endian).
#[must_use]
pub fn write_network_i32(value: i32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `i32` from its on-wire representation.
#[must_use]
pub fn read_network_i32(bytes: [u8; 4]) -> i32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    i32::from_be_bytes(bytes)
}

/// Serialise an `i64` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use scanframe::byte_order::write_network_i64;
///
/// assert_eq!(write_network_i64(1000), [0, 0, 0, 0, 0, 0, 0x03, 0xE8]);
/// ```
#[must_use]
pub fn write_network_i64(value: i64) -> [u8; 8] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `i64` from its on-wire representation.
#[must_use]
pub fn read_network_i64(bytes: [u8; 8]) -> i64 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    i64::from_be_bytes(bytes)
}

/// Serialise an IEEE-754 `f32` in network byte order.
///
/// The bit pattern is preserved exactly, including NaN payloads.
///
/// # Examples
///
/// ```
/// use scanframe::byte_order::write_network_f32;
///
/// assert_eq!(write_network_f32(1.0), [0x3F, 0x80, 0x00, 0x00]);
/// ```
#[must_use]
pub fn write_network_f32(value: f32) -> [u8; 4] { write_network_u32(value.to_bits()) }

/// Parse a network-order IEEE-754 `f32` from its on-wire representation.
#[must_use]
pub fn read_network_f32(bytes: [u8; 4]) -> f32 { f32::from_bits(read_network_u32(bytes)) }

/// Split a fixed-size array off the front of `input`, advancing it.
///
/// Returns `None`, leaving `input` untouched, when fewer than `N` bytes remain.
pub(crate) fn split_array<const N: usize>(input: &mut &[u8]) -> Option<[u8; N]> {
    let (head, rest) = input.split_first_chunk::<N>()?;
    *input = rest;
    Some(*head)
}
