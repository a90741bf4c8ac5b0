//! Relay RGB frames from a rendering host to a UDP-attached LED matrix.
//!
//! The host side ([`Matrix`]) keeps an RGB888 buffer in LED wiring order,
//! packs it to 15-bit color and sends it as a run of fragments. The device
//! side ([`FrameReceiver`]) writes fragments into a fixed reassembly buffer
//! and pushes the buffer to a [`PixelSink`] whenever a terminal fragment
//! arrives.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod matrix;
pub mod output;
pub mod pattern;
pub mod pixel_format;
pub mod protocol;
pub mod receiver;
pub mod tiling;

pub use config::{MatrixSpec, ReceiverConfig};
pub use decoder::{Ingest, Reassembler};
pub use encoder::{FrameEncoder, Transport, UdpTransport};
pub use error::{Error, PacketError, Result};
pub use matrix::Matrix;
pub use output::PixelSink;
pub use pixel_format::Rgb;
pub use receiver::FrameReceiver;
pub use tiling::{Layout, Tiling};

/// Space separated hex of the first `limit` bytes, for trace output
pub(crate) fn hex_prefix(bytes: &[u8], limit: usize) -> String {
    bytes
        .iter()
        .take(limit)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
