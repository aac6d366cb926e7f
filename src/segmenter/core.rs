/*!
 * Piece generation and next-piece prediction over a character stream.
 */

use std::ops::RangeInclusive;
use rand::rngs::{StdRng, ThreadRng};
use serde::Serialize;
use log::{debug, warn};

use crate::app_config::{SegmenterConfig, SizeWeight};
use crate::transcript::CharacterStream;
use super::random::{PieceRng, RandSource};
use super::shapes::{Shape, ShapeCatalog, MAX_PIECE_SIZE, MIN_PIECE_SIZE};

/// Sentences up to this length become a single piece
pub const WHOLE_SENTENCE_MAX: usize = 6;

/// Preferred word-break offsets
pub const IDEAL_BREAK: RangeInclusive<usize> = 4..=6;

/// Word-break offsets accepted when no ideal one exists
pub const SHORT_BREAK: RangeInclusive<usize> = 2..=3;

/// Smallest word-break offset considered when approximating a target size
pub const MIN_WORD_BREAK: usize = 2;

/// One segmented unit of characters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Piece {
    /// Shape label, `None` once the stream is exhausted
    pub shape: Option<Shape>,

    /// Character count, 0 once the stream is exhausted
    pub size: usize,

    /// Characters carried by the piece
    pub characters: Vec<char>,

    /// Cursor to pass to the next call
    pub new_cursor: usize,

    /// Length of the sentence the piece was cut from
    pub sentence_length: usize,
}

impl Piece {
    fn exhausted(cursor: usize) -> Self {
        Piece {
            shape: None,
            size: 0,
            characters: Vec::new(),
            new_cursor: cursor,
            sentence_length: 0,
        }
    }

    /// True when there was nothing left to cut
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn text(&self) -> String {
        self.characters.iter().collect()
    }

    /// Shape label, empty when the stream is exhausted
    pub fn shape_label(&self) -> &'static str {
        self.shape.map_or("", |shape| shape.label())
    }
}

/// Which rule fixed the size of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// Short sentence taken whole
    WholeSentence(usize),
    /// First space at an offset in the ideal window
    IdealBreak(usize),
    /// First space at an offset in the short window
    ShortBreak(usize),
    /// Space closest to a drawn target size
    NearestBreak { target: usize, size: usize },
    /// Drawn target size, cutting through a word
    Target(usize),
}

impl SizeRule {
    pub fn size(&self) -> usize {
        match *self {
            SizeRule::WholeSentence(size)
            | SizeRule::IdealBreak(size)
            | SizeRule::ShortBreak(size)
            | SizeRule::Target(size) => size,
            SizeRule::NearestBreak { size, .. } => size,
        }
    }
}

/// Result of scanning one sentence forward from a start index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SentenceScan {
    /// Stream index the scan started at
    pub start: usize,

    /// Units up to the next boundary or the stream end
    pub length: usize,

    /// Offsets of spaces from `start`, in scan order
    pub spaces: Vec<usize>,
}

/// Advance past boundaries and spaces
pub fn skip_separators(stream: &CharacterStream, cursor: usize) -> usize {
    let units = stream.units();
    let mut index = cursor;
    while index < units.len() && units[index].is_separator() {
        index += 1;
    }
    index
}

/// Scan from `start` to the next boundary, recording space offsets
pub fn scan_sentence(stream: &CharacterStream, start: usize) -> SentenceScan {
    let units = stream.units().get(start..).unwrap_or_default();
    let mut scan = SentenceScan {
        start,
        ..SentenceScan::default()
    };

    for (offset, unit) in units.iter().enumerate() {
        if unit.is_boundary() {
            break;
        }
        if unit.is_space() {
            scan.spaces.push(offset);
        }
        scan.length = offset + 1;
    }

    scan
}

/// Length of the sentence starting at `start`, without tracking spaces
pub fn sentence_length(stream: &CharacterStream, start: usize) -> usize {
    stream
        .units()
        .get(start..)
        .unwrap_or_default()
        .iter()
        .take_while(|unit| !unit.is_boundary())
        .count()
}

/// First space offset inside the ideal window, then inside the short window
fn word_break(spaces: &[usize]) -> Option<SizeRule> {
    if let Some(&pos) = spaces.iter().find(|pos| IDEAL_BREAK.contains(pos)) {
        return Some(SizeRule::IdealBreak(pos));
    }
    spaces
        .iter()
        .find(|pos| SHORT_BREAK.contains(pos))
        .map(|&pos| SizeRule::ShortBreak(pos))
}

/// Space closest to `target`, earliest on ties
fn nearest_break(spaces: &[usize], target: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for &pos in spaces.iter().filter(|&&pos| pos >= MIN_WORD_BREAK) {
        let diff = pos.abs_diff(target);
        if best.is_none_or(|(_, best_diff)| diff < best_diff) {
            best = Some((pos, diff));
        }
    }
    best.map(|(pos, _)| pos)
}

/// Cuts a character stream into pieces.
///
/// The cursor is owned by the caller; a segmenter keeps only its random
/// source and size distribution between calls.
#[derive(Debug, Clone)]
pub struct Segmenter<R: PieceRng = RandSource<ThreadRng>> {
    rng: R,
    weights: Vec<SizeWeight>,
}

impl Segmenter<RandSource<ThreadRng>> {
    pub fn new() -> Self {
        Self::with_rng(RandSource::thread())
    }
}

impl Default for Segmenter<RandSource<ThreadRng>> {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter<RandSource<StdRng>> {
    /// Segmenter producing a reproducible piece sequence
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(RandSource::seeded(seed))
    }
}

impl<R: PieceRng> Segmenter<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            weights: SegmenterConfig::default().target_weights,
        }
    }

    pub fn from_config(config: &SegmenterConfig, rng: R) -> Self {
        Self::with_rng(rng).with_weights(config.target_weights.clone())
    }

    /// Replace the target size distribution.
    ///
    /// Entries outside the catalog's size range or with zero weight are
    /// dropped; if nothing usable remains, or the weights overflow a `u32`
    /// total, the default distribution is kept.
    pub fn with_weights(mut self, weights: Vec<SizeWeight>) -> Self {
        let usable: Vec<SizeWeight> = weights
            .into_iter()
            .filter(|w| w.weight > 0 && (MIN_PIECE_SIZE..=MAX_PIECE_SIZE).contains(&w.size))
            .collect();

        if usable.is_empty() {
            warn!("No usable target weights, keeping the default distribution");
        } else if SizeWeight::checked_total(&usable).is_none() {
            warn!("Target weights overflow their total, keeping the default distribution");
        } else {
            self.weights = usable;
        }
        self
    }

    pub fn weights(&self) -> &[SizeWeight] {
        &self.weights
    }

    /// Cut the next piece starting at `cursor`
    pub fn next_piece(&mut self, stream: &CharacterStream, cursor: usize) -> Piece {
        let start = skip_separators(stream, cursor);
        if start >= stream.len() {
            return Piece::exhausted(start);
        }

        let scan = scan_sentence(stream, start);
        let rule = self.decide_size(&scan);
        let size = rule.size().min(scan.length);
        let shape = self.select_shape(size);

        let end = (start + size).min(stream.len());
        let characters: Vec<char> = stream.units()[start..end]
            .iter()
            .filter_map(|unit| unit.as_char())
            .collect();

        debug!(
            "Piece at {}: {:?} -> {} ({} of sentence length {})",
            start, rule, shape, size, scan.length
        );

        Piece {
            shape: Some(shape),
            size,
            characters,
            new_cursor: start + size,
            sentence_length: scan.length,
        }
    }

    /// Estimate the shape of the piece at `cursor` without consuming it.
    ///
    /// Long sentences get a fresh draw from the size distribution and word
    /// boundaries are not consulted, so the estimate may disagree with the
    /// piece `next_piece` later cuts at the same cursor.
    pub fn predict_next(&mut self, stream: &CharacterStream, cursor: usize) -> Option<Shape> {
        let start = skip_separators(stream, cursor);
        if start >= stream.len() {
            return None;
        }

        let length = sentence_length(stream, start);
        let size = if length <= WHOLE_SENTENCE_MAX {
            length
        } else {
            self.draw_target_size()
        };

        Some(self.select_shape(size))
    }

    /// Decide how many units of the scanned sentence go into the next piece
    pub fn decide_size(&mut self, scan: &SentenceScan) -> SizeRule {
        if scan.length <= WHOLE_SENTENCE_MAX {
            return SizeRule::WholeSentence(scan.length);
        }

        if let Some(rule) = word_break(&scan.spaces) {
            return rule;
        }

        let target = self.draw_target_size();
        match nearest_break(&scan.spaces, target) {
            Some(size) => SizeRule::NearestBreak { target, size },
            None => SizeRule::Target(target),
        }
    }

    /// Draw a size from the weighted distribution
    pub fn draw_target_size(&mut self) -> usize {
        // with_weights never keeps a table whose total overflows
        let total = SizeWeight::checked_total(&self.weights).unwrap_or(u32::MAX);
        let mut roll = self.rng.draw(0..total);

        for weight in &self.weights {
            if roll < weight.weight {
                return weight.size;
            }
            roll -= weight.weight;
        }

        // Only reachable with a misbehaving PieceRng
        self.weights.last().map_or(MIN_PIECE_SIZE, |w| w.size)
    }

    /// Pick a shape for a piece of `size` units
    pub fn select_shape(&mut self, size: usize) -> Shape {
        let candidates = ShapeCatalog::candidates(size);
        let index = self.rng.pick(candidates.len()).min(candidates.len() - 1);
        candidates[index]
    }

    /// Iterate over every remaining piece from `cursor`
    pub fn pieces<'a>(&'a mut self, stream: &'a CharacterStream, cursor: usize) -> Pieces<'a, R> {
        Pieces {
            segmenter: self,
            stream,
            cursor,
        }
    }
}

/// Iterator over consecutive pieces of a stream
pub struct Pieces<'a, R: PieceRng> {
    segmenter: &'a mut Segmenter<R>,
    stream: &'a CharacterStream,
    cursor: usize,
}

impl<R: PieceRng> Pieces<'_, R> {
    /// Cursor the next piece will be cut from
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Preview the shape of the piece the iterator will yield next
    pub fn predict_next(&mut self) -> Option<Shape> {
        self.segmenter.predict_next(self.stream, self.cursor)
    }
}

impl<R: PieceRng> Iterator for Pieces<'_, R> {
    type Item = Piece;

    fn next(&mut self) -> Option<Piece> {
        let piece = self.segmenter.next_piece(self.stream, self.cursor);
        self.cursor = piece.new_cursor;
        if piece.is_empty() {
            return None;
        }
        Some(piece)
    }
}
