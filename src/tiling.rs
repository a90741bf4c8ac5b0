//! Mapping from logical (x, y) coordinates to the LED wiring order.

use std::fmt;
use std::str::FromStr;

use crate::pixel_format::SOURCE_STRIDE;
use crate::protocol::{fragment_count, MAX_FRAGMENTS};
use crate::{Error, Result};

/// How the LEDs of the matrix are chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tiling {
    /// Every row runs left to right.
    #[default]
    Plain,
    /// Even rows run left to right, odd rows right to left.
    Snake,
    /// Two half-height panels on one data line, pixels interleaved.
    Dual,
}

impl FromStr for Tiling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(Tiling::Plain),
            "snake" => Ok(Tiling::Snake),
            "dual" => Ok(Tiling::Dual),
            _ => Err(Error::InvalidTiling(s.to_string())),
        }
    }
}

impl fmt::Display for Tiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tiling::Plain => write!(f, "plain"),
            Tiling::Snake => write!(f, "snake"),
            Tiling::Dual => write!(f, "dual"),
        }
    }
}

/// Matrix geometry plus its tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: usize,
    height: usize,
    tiling: Tiling,
}

impl Layout {
    /// Creates a layout, rejecting empty matrices, odd-height dual panels and
    /// frames too large for one fragment run.
    pub fn new(width: usize, height: usize, tiling: Tiling) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidField {
                field: "width",
                value: width.to_string(),
            });
        }
        // Dual interleaves two equal halves
        if height == 0 || (tiling == Tiling::Dual && height % 2 != 0) {
            return Err(Error::InvalidField {
                field: "height",
                value: height.to_string(),
            });
        }

        let bytes = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(SOURCE_STRIDE))
            .ok_or_else(|| Error::InvalidField {
                field: "matrix size",
                value: format!("{}x{}", width, height),
            })?;
        let fragments = fragment_count(bytes);
        if fragments > MAX_FRAGMENTS {
            return Err(Error::FrameTooLarge { bytes, fragments });
        }

        Ok(Layout {
            width,
            height,
            tiling,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }

    /// Number of LEDs in the matrix.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Linear pixel index for `(x, y)`, or `None` outside the matrix.
    pub fn position(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let index = match self.tiling {
            Tiling::Plain => x + y * self.width,
            Tiling::Snake => {
                let column = if y % 2 == 0 { x } else { self.width - 1 - x };
                column + self.width * y
            }
            Tiling::Dual => {
                let half = self.height / 2;
                let (y, offset) = if y < half { (y, 0) } else { (y - half, 1) };
                2 * (x + y * self.width) + offset
            }
        };

        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bijection(layout: &Layout) {
        let mut seen = vec![false; layout.pixel_count()];
        for y in 0..layout.height() {
            for x in 0..layout.width() {
                let index = layout.position(x, y).unwrap();
                assert!(index < seen.len(), "{:?} ({}, {}) -> {}", layout, x, y, index);
                assert!(!seen[index], "{:?} maps twice to {}", layout, index);
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_every_tiling_is_a_bijection() {
        for tiling in [Tiling::Plain, Tiling::Snake, Tiling::Dual] {
            for (w, h) in [(1, 2), (4, 4), (16, 8), (7, 6), (64, 64)] {
                assert_bijection(&Layout::new(w, h, tiling).unwrap());
            }
        }
        assert_bijection(&Layout::new(5, 3, Tiling::Snake).unwrap());
    }

    #[test]
    fn test_plain() {
        let layout = Layout::new(16, 8, Tiling::Plain).unwrap();
        assert_eq!(layout.position(0, 0), Some(0));
        assert_eq!(layout.position(3, 2), Some(35));
        assert_eq!(layout.position(15, 7), Some(127));
    }

    #[test]
    fn test_snake_rows_alternate() {
        let layout = Layout::new(4, 2, Tiling::Snake).unwrap();
        let row0: Vec<_> = (0..4).map(|x| layout.position(x, 0).unwrap()).collect();
        let row1: Vec<_> = (0..4).map(|x| layout.position(x, 1).unwrap()).collect();
        assert_eq!(row0, vec![0, 1, 2, 3]);
        assert_eq!(row1, vec![7, 6, 5, 4]);
    }

    #[test]
    fn test_dual_interleaves_halves() {
        let layout = Layout::new(4, 4, Tiling::Dual).unwrap();
        assert_eq!(layout.position(0, 0), Some(0));
        assert_eq!(layout.position(1, 0), Some(2));
        assert_eq!(layout.position(0, 2), Some(1));
        assert_eq!(layout.position(1, 2), Some(3));
        assert_eq!(layout.position(3, 3), Some(15));
    }

    #[test]
    fn test_out_of_bounds() {
        let layout = Layout::new(4, 4, Tiling::Snake).unwrap();
        assert_eq!(layout.position(4, 0), None);
        assert_eq!(layout.position(0, 4), None);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(matches!(
            Layout::new(0, 4, Tiling::Plain),
            Err(Error::InvalidField { field: "width", .. })
        ));
        assert!(matches!(
            Layout::new(4, 3, Tiling::Dual),
            Err(Error::InvalidField { field: "height", .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_geometry() {
        assert!(matches!(
            Layout::new(usize::MAX, 2, Tiling::Plain),
            Err(Error::InvalidField { field: "matrix size", .. })
        ));
        assert!(matches!(
            Layout::new(usize::MAX / 2, 1, Tiling::Snake),
            Err(Error::InvalidField { field: "matrix size", .. })
        ));
        // 512x512 needs 375 fragments
        assert!(matches!(
            Layout::new(512, 512, Tiling::Plain),
            Err(Error::FrameTooLarge { fragments: 375, .. })
        ));
        // 256 full fragments is the largest frame the index can address
        assert!(Layout::new(700, 256, Tiling::Plain).is_ok());
        assert!(Layout::new(701, 256, Tiling::Plain).is_err());
    }

    #[test]
    fn test_tiling_names() {
        assert_eq!("snake".parse::<Tiling>().unwrap(), Tiling::Snake);
        assert_eq!(Tiling::Dual.to_string(), "dual");
        assert!(matches!(
            "Snake".parse::<Tiling>(),
            Err(Error::InvalidTiling(_))
        ));
    }
}
