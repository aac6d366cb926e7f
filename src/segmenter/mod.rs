/*!
 * Segmentation of a lyric character stream into falling-block pieces.
 *
 * This module is organized into:
 * - `shapes`: Shape labels and the size-keyed shape catalog
 * - `random`: Injectable random source for size and shape draws
 * - `core`: Piece generation, prediction and sentence scanning
 */

pub mod core;
pub mod random;
pub mod shapes;

pub use self::core::{
    scan_sentence, sentence_length, skip_separators, Piece, Pieces, Segmenter, SentenceScan,
    SizeRule, IDEAL_BREAK, MIN_WORD_BREAK, SHORT_BREAK, WHOLE_SENTENCE_MAX,
};
pub use random::{PieceRng, RandSource};
pub use shapes::{Shape, ShapeCatalog, MAX_PIECE_SIZE, MIN_PIECE_SIZE};
