/*!
 * # lyricblocks - Lyric transcripts cut into falling-block pieces
 *
 * A Rust library that turns a timestamped lyric transcript into a stream of
 * characters and cuts that stream into puzzle pieces for a rhythm game loop.
 *
 * ## Features
 *
 * - Parse LRC-style transcripts, including translation lines
 * - Flatten primary text into a character stream with sentence boundaries
 * - Cut pieces that keep words together whenever a clean break exists
 * - Preview the shape of the upcoming piece
 * - Injectable random source for reproducible piece sequences
 * - Fetch transcripts through an external lyric search tool
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `transcript`: Transcript parsing and the character stream
 * - `segmenter`: Piece generation and prediction:
 *   - `segmenter::shapes`: Shape labels and the shape catalog
 *   - `segmenter::random`: Random sources
 *   - `segmenter::core`: The segmentation engine
 * - `lyric_fetch`: External lyric search wrapper
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]

pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod lyric_fetch;
pub mod segmenter;
pub mod transcript;

pub use app_config::Config;
pub use errors::{AppError, FetchError, TranscriptError};
pub use lyric_fetch::{FetchOutcome, LyricFetcher};
pub use segmenter::{Piece, PieceRng, RandSource, Segmenter, Shape, ShapeCatalog};
pub use transcript::{CharacterStream, LyricLine, StreamUnit, Transcript};
