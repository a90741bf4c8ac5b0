//! Wire format for fragmented matrix frames.
//!
//! Every UDP datagram carries one fragment:
//! - byte 0: marker, 0xAA for a continuation fragment, 0xE5 for the terminal one
//! - byte 1: fragment index, payload lands at `index * FRAGMENT_CAPACITY`
//! - bytes 2..: packed 16-bit big-endian pixels, at most `FRAGMENT_CAPACITY` bytes

mod fragment;

pub use fragment::{fragment_count, Fragment, Marker};

/// Maximum payload bytes per fragment.
pub const FRAGMENT_CAPACITY: usize = 1400;

/// Marker byte plus index byte.
pub const HEADER_SIZE: usize = 2;

/// Largest datagram a sender produces.
pub const MAX_DATAGRAM_SIZE: usize = HEADER_SIZE + FRAGMENT_CAPACITY;

/// Source (RGB888) bytes consumed by one full fragment.
pub const SOURCE_BYTES_PER_FRAGMENT: usize = FRAGMENT_CAPACITY / 2 * 3;

/// Number of distinct fragment indices.
pub const MAX_FRAGMENTS: usize = u8::MAX as usize + 1;

/// Highest payload extent a receiver can be asked to write.
pub const MAX_FRAME_LENGTH: usize = MAX_FRAGMENTS * FRAGMENT_CAPACITY;
