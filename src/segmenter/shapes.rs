/*!
 * Piece shapes and the size-keyed shape catalog.
 */

use std::fmt;
use serde::Serialize;

/// Smallest piece size the catalog knows
pub const MIN_PIECE_SIZE: usize = 1;

/// Largest piece size the catalog knows
pub const MAX_PIECE_SIZE: usize = 7;

/// Falling-block shape label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Shape {
    Dot,
    I2,
    I3,
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    Plus,
    L6,
    T7,
}

impl Shape {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Dot => "DOT",
            Shape::I2 => "I2",
            Shape::I3 => "I3",
            Shape::I => "I",
            Shape::O => "O",
            Shape::T => "T",
            Shape::S => "S",
            Shape::Z => "Z",
            Shape::J => "J",
            Shape::L => "L",
            Shape::Plus => "PLUS",
            Shape::L6 => "L6",
            Shape::T7 => "T7",
        }
    }

    /// Number of cells the shape occupies
    pub fn cells(&self) -> usize {
        match self {
            Shape::Dot => 1,
            Shape::I2 => 2,
            Shape::I3 => 3,
            Shape::I | Shape::O | Shape::T | Shape::S | Shape::Z | Shape::J | Shape::L => 4,
            Shape::Plus => 5,
            Shape::L6 => 6,
            Shape::T7 => 7,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Shape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        ShapeCatalog::all()
            .find(|shape| shape.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown shape label: {}", s))
    }
}

const DOT: &[Shape] = &[Shape::Dot];
const DOMINO: &[Shape] = &[Shape::I2];
const TROMINO: &[Shape] = &[Shape::I3];
const TETROMINOES: &[Shape] = &[Shape::I, Shape::O, Shape::T, Shape::S, Shape::Z, Shape::J, Shape::L];
const PENTOMINO: &[Shape] = &[Shape::Plus];
const HEXOMINO: &[Shape] = &[Shape::L6];
const HEPTOMINO: &[Shape] = &[Shape::T7];

/// Static mapping from piece size to candidate shapes
pub struct ShapeCatalog;

impl ShapeCatalog {
    /// Clamp a size into the catalog's range
    pub fn clamp_size(size: usize) -> usize {
        size.clamp(MIN_PIECE_SIZE, MAX_PIECE_SIZE)
    }

    /// Candidate shapes for a size, after clamping
    pub fn candidates(size: usize) -> &'static [Shape] {
        match Self::clamp_size(size) {
            1 => DOT,
            2 => DOMINO,
            3 => TROMINO,
            4 => TETROMINOES,
            5 => PENTOMINO,
            6 => HEXOMINO,
            _ => HEPTOMINO,
        }
    }

    /// Every shape, ordered by size
    pub fn all() -> impl Iterator<Item = Shape> {
        (MIN_PIECE_SIZE..=MAX_PIECE_SIZE).flat_map(|size| Self::candidates(size).iter().copied())
    }
}
