use crate::error::PacketError;
use crate::pixel_format::pack_into;

use super::{FRAGMENT_CAPACITY, HEADER_SIZE, SOURCE_BYTES_PER_FRAGMENT};

/// First byte of every fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Marker {
    /// More fragments of this frame follow.
    Continuation = 0xAA,
    /// Last fragment, the receiver flushes its buffer.
    Terminal = 0xE5,
}

impl TryFrom<u8> for Marker {
    type Error = PacketError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0xAA => Ok(Marker::Continuation),
            0xE5 => Ok(Marker::Terminal),
            other => Err(PacketError::BadMarker(other)),
        }
    }
}

/// A borrowed view of one received fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub marker: Marker,
    pub index: u8,
    pub payload: &'a [u8],
}

impl<'a> Fragment<'a> {
    /// Parse a datagram.
    ///
    /// A bare two-byte datagram is accepted only as a terminal fragment with an
    /// empty payload; a continuation must carry at least one payload byte.
    pub fn parse(datagram: &'a [u8]) -> Result<Self, PacketError> {
        if datagram.len() < HEADER_SIZE {
            return Err(PacketError::TooShort(datagram.len()));
        }

        let marker = Marker::try_from(datagram[0])?;
        if marker == Marker::Continuation && datagram.len() == HEADER_SIZE {
            return Err(PacketError::TooShort(datagram.len()));
        }

        Ok(Fragment {
            marker,
            index: datagram[1],
            payload: &datagram[HEADER_SIZE..],
        })
    }

    /// Byte offset of this payload in the reassembly buffer.
    pub fn offset(&self) -> usize {
        self.index as usize * FRAGMENT_CAPACITY
    }

    pub fn is_terminal(&self) -> bool {
        self.marker == Marker::Terminal
    }

    /// Build a datagram into `out` from RGB888 `source` bytes.
    ///
    /// `out` must hold `HEADER_SIZE + source.len() / 3 * 2` bytes. Returns the
    /// datagram length.
    pub fn encode(marker: Marker, index: u8, source: &[u8], out: &mut [u8]) -> usize {
        out[0] = marker as u8;
        out[1] = index;
        HEADER_SIZE + pack_into(source, &mut out[HEADER_SIZE..])
    }
}

/// Number of fragments needed for `source_len` bytes of RGB888 data.
///
/// Always at least one: an empty frame still needs its terminal fragment.
pub fn fragment_count(source_len: usize) -> usize {
    source_len.div_ceil(SOURCE_BYTES_PER_FRAGMENT).max(1)
}
