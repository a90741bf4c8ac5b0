use tracing::info;

use crate::config::MatrixSpec;
use crate::encoder::{FrameEncoder, Transport, UdpTransport};
use crate::pixel_format::{Rgb, SOURCE_STRIDE};
use crate::tiling::Layout;
use crate::{Error, Result};

/// Host side handle: a pixel buffer in wiring order plus the encoder that ships it
pub struct Matrix<T = UdpTransport> {
    layout: Layout,
    pixels: Vec<u8>,
    encoder: FrameEncoder<T>,
}

impl Matrix<UdpTransport> {
    /// Bind a UDP socket and allocate a black frame for `spec`
    pub fn connect(spec: &MatrixSpec) -> Result<Self> {
        let transport = UdpTransport::connect(spec.target)?;

        info!(
            "Sending {}x{} {} frames to {}",
            spec.layout.width(),
            spec.layout.height(),
            spec.layout.tiling(),
            spec.target
        );

        Matrix::with_transport(spec.layout, transport)
    }
}

impl<T: Transport> Matrix<T> {
    pub fn with_transport(layout: Layout, transport: T) -> Result<Self> {
        Ok(Matrix {
            layout,
            pixels: vec![0; layout.pixel_count() * SOURCE_STRIDE],
            encoder: FrameEncoder::new(transport),
        })
    }

    pub fn width(&self) -> usize {
        self.layout.width()
    }

    pub fn height(&self) -> usize {
        self.layout.height()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Raw RGB888 bytes in wiring order
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn encoder_mut(&mut self) -> &mut FrameEncoder<T> {
        &mut self.encoder
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        self.layout
            .position(x, y)
            .map(|index| index * SOURCE_STRIDE)
            .ok_or(Error::OutOfBounds {
                x,
                y,
                width: self.layout.width(),
                height: self.layout.height(),
            })
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) -> Result<()> {
        let pos = self.offset(x, y)?;
        self.pixels[pos..pos + SOURCE_STRIDE].copy_from_slice(&[color.red, color.green, color.blue]);
        Ok(())
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Rgb> {
        let pos = self.offset(x, y)?;
        Ok(Rgb::new(
            self.pixels[pos],
            self.pixels[pos + 1],
            self.pixels[pos + 2],
        ))
    }

    /// Zero the whole buffer (nothing is sent until the next render)
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Send the current buffer as one frame. Returns the number of datagrams sent.
    pub fn render(&mut self) -> Result<usize> {
        self.encoder.render(&self.pixels)
    }
}
