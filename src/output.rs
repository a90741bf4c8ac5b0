use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info, warn};

use crate::config::OutputConfig;
use crate::Result;

/// Destination for flushed frames, fed in fixed-size chunks
pub trait PixelSink {
    /// Called once before the first chunk of a frame
    fn begin_frame(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Called once after the last chunk of a frame
    fn end_frame(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: PixelSink + ?Sized> PixelSink for Box<S> {
    fn begin_frame(&mut self) -> io::Result<()> {
        (**self).begin_frame()
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        (**self).write_chunk(chunk)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        (**self).end_frame()
    }
}

/// Push a whole buffer through `sink` in `chunk_size` pieces
pub fn flush_frame<S: PixelSink + ?Sized>(
    sink: &mut S,
    buffer: &[u8],
    chunk_size: usize,
) -> io::Result<()> {
    sink.begin_frame()?;
    for chunk in buffer.chunks(chunk_size) {
        sink.write_chunk(chunk)?;
    }
    sink.end_frame()
}

/// Open the sink described by the configuration
pub fn open(config: &OutputConfig) -> Result<Box<dyn PixelSink + Send>> {
    match config {
        OutputConfig::Serial { port, baud_rate } => {
            Ok(Box::new(SerialSink::open(port, *baud_rate)?))
        }
        OutputConfig::Null => {
            info!("Output disabled, flushed frames are discarded");
            Ok(Box::new(NullSink::default()))
        }
    }
}

/// Serial-attached LED driver
pub struct SerialSink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialSink {
    pub fn open(name: &str, baud_rate: u32) -> Result<Self> {
        let mut port = serialport::new(name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()?;

        // Bound each write so a stalled driver cannot wedge the receive loop
        port.set_timeout(Duration::from_millis(1000))?;

        if let Err(e) = port.write_data_terminal_ready(true) {
            warn!("Failed to set DTR on {}: {}", name, e);
        }

        // Allow device to initialize
        thread::sleep(Duration::from_millis(100));

        info!("Opened {} @ {} baud", name, baud_rate);

        Ok(SerialSink {
            name: name.to_string(),
            port,
        })
    }
}

impl PixelSink for SerialSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.port.write_all(chunk)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.port.flush().map_err(|e| {
            debug!("flush failed on {}", self.name);
            e
        })
    }
}

/// Counts what it is given and drops it
#[derive(Debug, Default)]
pub struct NullSink {
    pub frames: u64,
    pub bytes: u64,
}

impl PixelSink for NullSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.bytes += chunk.len() as u64;
        Ok(())
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
