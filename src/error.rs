//! Error types for the matrix relay.

use std::io;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring a matrix, rendering frames or driving an output.
#[derive(Error, Debug)]
pub enum Error {
    /// A field of the init string is absent.
    #[error("init string is missing the {0} (example: 192.168.69.42:1234,16x8,snake)")]
    MissingField(&'static str),

    /// A numeric or address field could not be parsed or is zero.
    #[error("invalid {field} {value:?} (example: 192.168.69.42:1234,16x8,snake)")]
    InvalidField { field: &'static str, value: String },

    /// Tiling name is not one of plain, snake or dual.
    #[error("invalid tiling type {0:?} (expected plain, snake or dual)")]
    InvalidTiling(String),

    /// Socket could not be created or bound.
    #[error("socket error: {0}")]
    Socket(#[source] io::Error),

    /// A fragment could not be transmitted; the rest of the frame was skipped.
    #[error("failed to send fragment {index}: {source}")]
    Send {
        index: u8,
        #[source]
        source: io::Error,
    },

    /// Pixel coordinates outside the matrix.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} matrix")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Frame needs more fragments than a one-byte index can address.
    #[error("frame of {bytes} bytes needs {fragments} fragments (at most 256 allowed)")]
    FrameTooLarge { bytes: usize, fragments: usize },

    /// File or output sink I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Receiver configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Receiver configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Socket(_) => 2,
            Error::MissingField(_) => 3,
            Error::InvalidField { .. } | Error::FrameTooLarge { .. } => 4,
            Error::Send { .. } => 5,
            Error::InvalidTiling(_) => 6,
            _ => 1,
        }
    }
}

/// Reasons a received datagram is discarded without touching the reassembly buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Datagram too short to carry a header, index and payload.
    #[error("datagram of {0} bytes is too short")]
    TooShort(usize),

    /// First byte is neither the continuation nor the terminal marker.
    #[error("bad packet marker {0:#04x}")]
    BadMarker(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_category() {
        let codes = [
            Error::Socket(io::Error::new(io::ErrorKind::AddrInUse, "busy")).exit_code(),
            Error::MissingField("port").exit_code(),
            Error::InvalidField { field: "port", value: "x".into() }.exit_code(),
            Error::Send {
                index: 0,
                source: io::Error::new(io::ErrorKind::Other, "down"),
            }
            .exit_code(),
            Error::InvalidTiling("zigzag".into()).exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_oversized_frame_is_an_invalid_field() {
        let err = Error::FrameTooLarge { bytes: 786432, fragments: 375 };
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_packet_error_display() {
        assert_eq!(PacketError::BadMarker(0).to_string(), "bad packet marker 0x00");
        assert_eq!(PacketError::TooShort(1).to_string(), "datagram of 1 bytes is too short");
    }
}
