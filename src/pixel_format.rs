/// Bytes per source pixel (RGB888)
pub const SOURCE_STRIDE: usize = 3;

/// Bytes per packed pixel on the wire
pub const PACKED_STRIDE: usize = 2;

/// One RGB888 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Rgb { red, green, blue }
    }
}

/// Pack one RGB888 pixel into 16 bits, keeping the top 5 bits of each channel.
///
/// Layout is `0rrrrrgg gggbbbbb`, so green loses as much precision as red and blue.
#[inline]
pub fn pack(red: u8, green: u8, blue: u8) -> u16 {
    ((red as u16 >> 3) << 10) | ((green as u16 >> 3) << 5) | (blue as u16 >> 3)
}

/// Expand a packed pixel back to RGB888 (low 3 bits of each channel are zero).
#[inline]
pub fn unpack(value: u16) -> Rgb {
    Rgb {
        red: (((value >> 10) & 0x1f) as u8) << 3,
        green: (((value >> 5) & 0x1f) as u8) << 3,
        blue: ((value & 0x1f) as u8) << 3,
    }
}

/// Pack RGB888 source bytes into big-endian 16-bit pixels.
///
/// A trailing partial pixel is ignored. Returns the number of bytes written to `out`.
pub fn pack_into(source: &[u8], out: &mut [u8]) -> usize {
    let mut written = 0;

    for (src, dst) in source
        .chunks_exact(SOURCE_STRIDE)
        .zip(out.chunks_exact_mut(PACKED_STRIDE))
    {
        dst.copy_from_slice(&pack(src[0], src[1], src[2]).to_be_bytes());
        written += PACKED_STRIDE;
    }

    written
}

/// Expand big-endian packed pixels back into RGB888 bytes.
pub fn unpack_pixels(packed: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(packed.len() / PACKED_STRIDE * SOURCE_STRIDE);

    for pair in packed.chunks_exact(PACKED_STRIDE) {
        let rgb = unpack(u16::from_be_bytes([pair[0], pair[1]]));
        result.push(rgb.red);
        result.push(rgb.green);
        result.push(rgb.blue);
    }

    result
}
