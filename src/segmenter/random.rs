/*!
 * Random sources for piece size and shape draws.
 *
 * The segmenter only needs two primitives: a uniform integer draw and a
 * uniform pick among a candidate set. Tests supply their own scripted
 * implementation; production code wraps a `rand` generator.
 */

use std::ops::Range;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Randomness consumed by the segmenter
pub trait PieceRng {
    /// Uniform draw from `range`, end exclusive. An empty range yields `range.start`.
    fn draw(&mut self, range: Range<u32>) -> u32;

    /// Uniform index into a candidate set of `len` items. `len` of 0 or 1 yields 0.
    fn pick(&mut self, len: usize) -> usize;
}

impl<T: PieceRng + ?Sized> PieceRng for &mut T {
    fn draw(&mut self, range: Range<u32>) -> u32 {
        (**self).draw(range)
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// `PieceRng` backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandSource<R> {
    rng: R,
}

impl<R: Rng> RandSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandSource<ThreadRng> {
    /// Unseeded source, fresh draws per call
    pub fn thread() -> Self {
        Self::new(rand::rng())
    }
}

impl Default for RandSource<ThreadRng> {
    fn default() -> Self {
        Self::thread()
    }
}

impl RandSource<StdRng> {
    /// Reproducible source
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PieceRng for RandSource<R> {
    fn draw(&mut self, range: Range<u32>) -> u32 {
        if range.is_empty() {
            return range.start;
        }
        self.rng.random_range(range)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}
