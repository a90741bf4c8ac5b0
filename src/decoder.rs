//! Device side reassembly of fragmented frames.
//!
//! There is no notion of a frame in progress. Each fragment is written where
//! its index says, and every terminal fragment flushes the whole buffer, so
//! regions a lost fragment should have covered keep their previous contents
//! until a later frame overwrites them.

use tracing::debug;

use crate::error::PacketError;
use crate::protocol::Fragment;

/// What happened to an accepted fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingest {
    pub index: u8,
    /// Payload was copied into the buffer
    pub stored: bool,
    /// Fragment ends a frame, the buffer should be flushed
    pub terminal: bool,
}

/// Fixed-size buffer the fragments are written into
pub struct Reassembler {
    buffer: Vec<u8>,
}

impl Reassembler {
    /// Allocate a zeroed buffer of `frame_length` bytes
    pub fn new(frame_length: usize) -> Self {
        Reassembler {
            buffer: vec![0; frame_length],
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Apply one datagram.
    ///
    /// Malformed datagrams are rejected without touching the buffer. A payload
    /// that would run past the end of the buffer is skipped, but its marker
    /// still counts.
    pub fn ingest(&mut self, datagram: &[u8]) -> Result<Ingest, PacketError> {
        let fragment = Fragment::parse(datagram)?;

        let offset = fragment.offset();
        let end = offset + fragment.payload.len();
        let stored = end <= self.buffer.len();

        if stored {
            self.buffer[offset..end].copy_from_slice(fragment.payload);
        } else {
            debug!(
                "Dropping fragment {} write: {}..{} exceeds {} byte buffer",
                fragment.index,
                offset,
                end,
                self.buffer.len()
            );
        }

        Ok(Ingest {
            index: fragment.index,
            stored,
            terminal: fragment.is_terminal(),
        })
    }
}
