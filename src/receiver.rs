use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::config::ReceiverConfig;
use crate::decoder::{Ingest, Reassembler};
use crate::output::{flush_frame, PixelSink};
use crate::protocol::MAX_DATAGRAM_SIZE;
use crate::{hex_prefix, Error, Result};

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Counters shared with the statistics thread
#[derive(Debug, Default)]
pub struct Stats {
    pub datagrams: AtomicU64,
    pub frames: AtomicU64,
    pub malformed: AtomicU64,
    pub out_of_range: AtomicU64,
}

/// Device side receive loop: UDP in, reassembly buffer, output sink out
pub struct FrameReceiver<S> {
    socket: UdpSocket,
    reassembler: Reassembler,
    sink: S,
    chunk_size: usize,
    stats: Arc<Stats>,
    running: Arc<AtomicBool>,
    report_stats: bool,
}

impl<S: PixelSink> FrameReceiver<S> {
    /// Bind the listen socket described by `config`
    pub fn bind(config: &ReceiverConfig, sink: S) -> Result<Self> {
        config.validate()?;

        let addr = config.listen_addr();
        let socket = UdpSocket::bind(&addr).map_err(Error::Socket)?;
        // Bounded receive so the loop can notice shutdown
        socket
            .set_read_timeout(Some(Duration::from_millis(config.recv_timeout_ms)))
            .map_err(Error::Socket)?;

        info!(
            "Listening on {} ({} byte frames, {} byte output chunks)",
            addr, config.frame_length, config.chunk_size
        );

        Ok(FrameReceiver {
            socket,
            reassembler: Reassembler::new(config.frame_length),
            sink,
            chunk_size: config.chunk_size,
            stats: Arc::new(Stats::default()),
            running: Arc::new(AtomicBool::new(true)),
            report_stats: false,
        })
    }

    /// Log throughput every few seconds while running
    pub fn report_stats(mut self, enabled: bool) -> Self {
        self.report_stats = enabled;
        self
    }

    /// Get a clone of the running flag for signal handlers
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Error::Socket)
    }

    pub fn buffer(&self) -> &[u8] {
        self.reassembler.buffer()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Zero the reassembly buffer and push it out, turning the panel off
    pub fn blank(&mut self) -> Result<()> {
        self.reassembler.clear();
        flush_frame(&mut self.sink, self.reassembler.buffer(), self.chunk_size)?;
        Ok(())
    }

    /// Process one datagram. Never fails: bad input is logged and dropped.
    pub fn handle_datagram(&mut self, datagram: &[u8]) -> Option<Ingest> {
        self.stats.datagrams.fetch_add(1, Ordering::Relaxed);
        trace!("Datagram ({} bytes): {}", datagram.len(), hex_prefix(datagram, 16));

        let ingest = match self.reassembler.ingest(datagram) {
            Ok(ingest) => ingest,
            Err(e) => {
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
                warn!("Ignoring datagram: {}", e);
                return None;
            }
        };

        if !ingest.stored {
            self.stats.out_of_range.fetch_add(1, Ordering::Relaxed);
        }

        if ingest.terminal {
            debug!("End of frame at fragment {}", ingest.index);
            match flush_frame(&mut self.sink, self.reassembler.buffer(), self.chunk_size) {
                Ok(()) => {
                    self.stats.frames.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => error!("Output failed, frame lost: {}", e),
            }
        }

        Some(ingest)
    }

    /// Receive until the running flag is cleared
    pub fn run(&mut self) -> Result<()> {
        if self.report_stats {
            self.spawn_stats_thread();
        }

        let mut datagram = [0u8; MAX_DATAGRAM_SIZE];

        while self.running.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut datagram) {
                Ok((n, peer)) => {
                    trace!("{} bytes from {}", n, peer);
                    self.handle_datagram(&datagram[..n]);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    // Receive timeout, check the running flag again
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Failed to receive datagram: {}", e);
                    thread::sleep(Duration::from_millis(100));
                }
            }
        }

        Ok(())
    }

    /// Gracefully shutdown - push a black frame
    pub fn shutdown(&mut self) {
        info!("Turning off LEDs...");
        if let Err(e) = self.blank() {
            warn!("Could not blank output: {}", e);
        }
    }

    fn spawn_stats_thread(&self) {
        let stats = Arc::clone(&self.stats);
        let running = Arc::clone(&self.running);

        thread::spawn(move || {
            let mut last_datagrams = 0u64;
            let mut last_frames = 0u64;
            let secs = STATS_INTERVAL.as_secs_f64();

            while running.load(Ordering::Relaxed) {
                thread::sleep(STATS_INTERVAL);

                let datagrams = stats.datagrams.load(Ordering::Relaxed);
                let frames = stats.frames.load(Ordering::Relaxed);

                info!(
                    "[Stats] {:.1} datagrams/s, {:.1} frames/s, {} malformed, {} out of range",
                    (datagrams - last_datagrams) as f64 / secs,
                    (frames - last_frames) as f64 / secs,
                    stats.malformed.load(Ordering::Relaxed),
                    stats.out_of_range.load(Ordering::Relaxed),
                );

                last_datagrams = datagrams;
                last_frames = frames;
            }
        });
    }
}
