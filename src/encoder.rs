use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use tracing::{debug, trace, warn};

use crate::protocol::{
    fragment_count, Fragment, Marker, MAX_DATAGRAM_SIZE, MAX_FRAGMENTS, SOURCE_BYTES_PER_FRAGMENT,
};
use crate::{hex_prefix, Error, Result};

/// Something that can carry one datagram at a time
pub trait Transport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()>;
}

/// UDP socket bound to an ephemeral local port, sending to one target
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    /// Bind a local socket of the same address family as `target`
    pub fn connect(target: SocketAddr) -> Result<Self> {
        let local = match target.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local).map_err(Error::Socket)?;

        debug!("Bound {} for frames to {}", socket.local_addr().map_err(Error::Socket)?, target);

        Ok(UdpTransport { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        self.socket.send_to(datagram, self.target).map(|_| ())
    }
}

/// Splits RGB888 frames into fragments and pushes them through a transport
pub struct FrameEncoder<T> {
    transport: T,
    // Rebuilt for every fragment; `&mut self` keeps renders from overlapping
    scratch: [u8; MAX_DATAGRAM_SIZE],
}

impl<T: Transport> FrameEncoder<T> {
    pub fn new(transport: T) -> Self {
        FrameEncoder {
            transport,
            scratch: [0; MAX_DATAGRAM_SIZE],
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send one frame. Returns the number of datagrams sent.
    ///
    /// Stops at the first failed send; fragments already sent stay sent.
    pub fn render(&mut self, pixels: &[u8]) -> Result<usize> {
        let fragments = fragment_count(pixels.len());
        if fragments > MAX_FRAGMENTS {
            return Err(Error::FrameTooLarge {
                bytes: pixels.len(),
                fragments,
            });
        }

        for (i, chunk) in frame_chunks(pixels).enumerate() {
            let index = i as u8;
            let marker = if i + 1 == fragments {
                Marker::Terminal
            } else {
                Marker::Continuation
            };

            let len = Fragment::encode(marker, index, chunk, &mut self.scratch);
            let datagram = &self.scratch[..len];

            trace!(
                "Fragment {} ({:?}, {} bytes): {}",
                index,
                marker,
                len,
                hex_prefix(datagram, 16)
            );

            if let Err(source) = self.transport.send(datagram) {
                warn!("Aborting frame at fragment {}/{}: {}", index, fragments, source);
                return Err(Error::Send { index, source });
            }
        }

        Ok(fragments)
    }
}

/// Source slices for each fragment, the last one possibly short or empty
fn frame_chunks(pixels: &[u8]) -> impl Iterator<Item = &[u8]> {
    let full = pixels.len().saturating_sub(1) / SOURCE_BYTES_PER_FRAGMENT;
    let (head, tail) = pixels.split_at(full * SOURCE_BYTES_PER_FRAGMENT);
    head.chunks(SOURCE_BYTES_PER_FRAGMENT)
        .chain(std::iter::once(tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FRAGMENT_CAPACITY, HEADER_SIZE};

    /// Records datagrams, failing the send with the given 0-based position
    #[derive(Default)]
    struct Recorder {
        sent: Vec<Vec<u8>>,
        attempts: usize,
        fail_at: Option<usize>,
    }

    impl Transport for Recorder {
        fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
            let attempt = self.attempts;
            self.attempts += 1;
            if self.fail_at == Some(attempt) {
                return Err(io::Error::new(io::ErrorKind::Other, "network unreachable"));
            }
            self.sent.push(datagram.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_small_frame_is_one_terminal_fragment() {
        let mut encoder = FrameEncoder::new(Recorder::default());
        let pixels = vec![0xffu8; 10 * 10 * 3];

        assert_eq!(encoder.render(&pixels).unwrap(), 1);

        let sent = &encoder.transport().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0], Marker::Terminal as u8);
        assert_eq!(sent[0][1], 0);
        assert_eq!(sent[0].len(), HEADER_SIZE + 200);
        assert!(sent[0][2..].chunks(2).all(|p| p == [0x7f, 0xff]));
    }

    #[test]
    fn test_multi_fragment_frame() {
        let mut encoder = FrameEncoder::new(Recorder::default());
        let pixels = vec![0u8; 64 * 64 * 3];

        assert_eq!(encoder.render(&pixels).unwrap(), 6);

        let sent = &encoder.transport().sent;
        for (i, datagram) in sent.iter().enumerate() {
            assert_eq!(datagram[1] as usize, i);
        }
        for datagram in &sent[..5] {
            assert_eq!(datagram[0], Marker::Continuation as u8);
            assert_eq!(datagram.len(), MAX_DATAGRAM_SIZE);
        }
        // 12288 - 5 * 2100 = 1788 source bytes = 596 pixels
        assert_eq!(sent[5][0], Marker::Terminal as u8);
        assert_eq!(sent[5].len(), HEADER_SIZE + 596 * 2);
    }

    #[test]
    fn test_evenly_divided_frame_ends_with_full_terminal() {
        let mut encoder = FrameEncoder::new(Recorder::default());
        let pixels = vec![0u8; SOURCE_BYTES_PER_FRAGMENT * 2];

        assert_eq!(encoder.render(&pixels).unwrap(), 2);

        let sent = &encoder.transport().sent;
        assert_eq!(sent[0][0], Marker::Continuation as u8);
        assert_eq!(sent[1][0], Marker::Terminal as u8);
        assert_eq!(sent[1].len(), HEADER_SIZE + FRAGMENT_CAPACITY);
    }

    #[test]
    fn test_empty_frame_sends_empty_terminal() {
        let mut encoder = FrameEncoder::new(Recorder::default());

        assert_eq!(encoder.render(&[]).unwrap(), 1);
        assert_eq!(encoder.transport().sent, vec![vec![0xE5, 0]]);
    }

    #[test]
    fn test_send_failure_aborts_rest_of_frame() {
        let mut encoder = FrameEncoder::new(Recorder {
            fail_at: Some(2),
            ..Default::default()
        });
        let pixels = vec![0u8; 64 * 64 * 3];

        let err = encoder.render(&pixels).unwrap_err();
        assert!(matches!(err, Error::Send { index: 2, .. }));
        assert_eq!(err.exit_code(), 5);
        assert_eq!(encoder.transport().attempts, 3);
        assert_eq!(encoder.transport().sent.len(), 2);

        // Next frame starts over from index 0
        encoder.transport_mut().fail_at = None;
        assert_eq!(encoder.render(&pixels).unwrap(), 6);
        assert_eq!(encoder.transport().sent[2][1], 0);
    }

    #[test]
    fn test_oversized_frame_sends_nothing() {
        let mut encoder = FrameEncoder::new(Recorder::default());
        let pixels = vec![0u8; SOURCE_BYTES_PER_FRAGMENT * MAX_FRAGMENTS + 3];

        assert!(matches!(
            encoder.render(&pixels),
            Err(Error::FrameTooLarge { fragments: 257, .. })
        ));
        assert_eq!(encoder.transport().attempts, 0);
    }

    #[test]
    fn test_largest_frame_uses_index_255() {
        let mut encoder = FrameEncoder::new(Recorder::default());
        let pixels = vec![0u8; SOURCE_BYTES_PER_FRAGMENT * MAX_FRAGMENTS];

        assert_eq!(encoder.render(&pixels).unwrap(), MAX_FRAGMENTS);
        let last = encoder.transport().sent.last().unwrap();
        assert_eq!(&last[..2], &[0xE5, 255]);
    }
}
