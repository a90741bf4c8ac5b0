//! Test patterns for bringing up a panel.

use std::fmt;
use std::str::FromStr;

use crate::encoder::Transport;
use crate::matrix::Matrix;
use crate::pixel_format::Rgb;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pattern {
    /// White, red, green and blue quadrants; shows orientation and tiling at a glance
    #[default]
    Quadrants,
    /// Red ramps along x, green along y
    Gradient,
    /// One white pixel stepping through the matrix in row order
    Chase,
}

impl Pattern {
    /// Paint frame number `frame` into the matrix buffer
    pub fn draw<T: Transport>(&self, matrix: &mut Matrix<T>, frame: u64) -> Result<()> {
        let (width, height) = (matrix.width(), matrix.height());

        match self {
            Pattern::Quadrants => {
                for y in 0..height {
                    for x in 0..width {
                        let color = match (x < width / 2, y < height / 2) {
                            (true, true) => Rgb::WHITE,
                            (true, false) => Rgb::new(0xff, 0, 0),
                            (false, true) => Rgb::new(0, 0xff, 0),
                            (false, false) => Rgb::new(0, 0, 0xff),
                        };
                        matrix.set(x, y, color)?;
                    }
                }
            }
            Pattern::Gradient => {
                for y in 0..height {
                    for x in 0..width {
                        matrix.set(x, y, Rgb::new(ramp(x, width), ramp(y, height), 0))?;
                    }
                }
            }
            Pattern::Chase => {
                let step = (frame % (width * height) as u64) as usize;
                matrix.clear();
                matrix.set(step % width, step / width, Rgb::WHITE)?;
            }
        }

        Ok(())
    }
}

fn ramp(position: usize, extent: usize) -> u8 {
    if extent <= 1 {
        return 0;
    }
    (position * 255 / (extent - 1)) as u8
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "quadrants" => Ok(Pattern::Quadrants),
            "gradient" => Ok(Pattern::Gradient),
            "chase" => Ok(Pattern::Chase),
            _ => Err(Error::InvalidField {
                field: "pattern",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Quadrants => write!(f, "quadrants"),
            Pattern::Gradient => write!(f, "gradient"),
            Pattern::Chase => write!(f, "chase"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::{Layout, Tiling};
    use std::io;

    struct Discard;

    impl Transport for Discard {
        fn send(&mut self, _datagram: &[u8]) -> io::Result<()> {
            Ok(())
        }
    }

    fn matrix(width: usize, height: usize) -> Matrix<Discard> {
        Matrix::with_transport(Layout::new(width, height, Tiling::Snake).unwrap(), Discard).unwrap()
    }

    #[test]
    fn test_quadrants() {
        let mut m = matrix(4, 4);
        Pattern::Quadrants.draw(&mut m, 0).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), Rgb::WHITE);
        assert_eq!(m.get(1, 3).unwrap(), Rgb::new(0xff, 0, 0));
        assert_eq!(m.get(3, 0).unwrap(), Rgb::new(0, 0xff, 0));
        assert_eq!(m.get(2, 2).unwrap(), Rgb::new(0, 0, 0xff));
    }

    #[test]
    fn test_gradient_corners() {
        let mut m = matrix(8, 4);
        Pattern::Gradient.draw(&mut m, 0).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), Rgb::BLACK);
        assert_eq!(m.get(7, 3).unwrap(), Rgb::new(255, 255, 0));
    }

    #[test]
    fn test_chase_wraps() {
        let mut m = matrix(3, 2);
        Pattern::Chase.draw(&mut m, 4).unwrap();
        assert_eq!(m.get(1, 1).unwrap(), Rgb::WHITE);

        Pattern::Chase.draw(&mut m, 6).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), Rgb::WHITE);
        assert_eq!(m.get(1, 1).unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_names() {
        assert_eq!("chase".parse::<Pattern>().unwrap(), Pattern::Chase);
        assert_eq!(Pattern::Gradient.to_string(), "gradient");
        assert!("plasma".parse::<Pattern>().is_err());
    }
}
