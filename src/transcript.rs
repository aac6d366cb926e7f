use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Context, Result};
use serde::Serialize;
use log::{debug, error, trace};

use crate::errors::TranscriptError;

// @module: Timestamped lyric transcript parsing and flattening

// @const: LRC line regex, `[mm:ss.fff]text`, ASCII digits only
static LRC_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([0-9]+):([0-9]+\.[0-9]+)\](.+)").unwrap()
});

/// Leading character that marks a translation line
pub const TRANSLATION_MARKER: char = '/';

/// Single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricLine {
    // @field: Start time in seconds
    pub time: f64,

    // @field: Text in the lyrics' own language
    pub primary: String,

    // @field: Translation, empty until a translation line follows
    pub secondary: String,
}

impl LyricLine {
    pub fn new(time: f64, primary: impl Into<String>) -> Self {
        LyricLine {
            time,
            primary: primary.into(),
            secondary: String::new(),
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = secondary.into();
        self
    }

    /// Format seconds as an LRC timestamp (mm:ss.xx)
    pub fn format_timestamp(time: f64) -> String {
        let centis = (time.max(0.0) * 100.0).round() as u64;
        let minutes = centis / 6_000;
        let seconds = (centis % 6_000) / 100;
        let hundredths = centis % 100;

        format!("{:02}:{:02}.{:02}", minutes, seconds, hundredths)
    }
}

impl fmt::Display for LyricLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stamp = Self::format_timestamp(self.time);
        writeln!(f, "[{}]{}", stamp, self.primary)?;
        if !self.secondary.is_empty() {
            writeln!(f, "[{}]{}{}", stamp, TRANSLATION_MARKER, self.secondary)?;
        }
        Ok(())
    }
}

/// One position of the flattened character stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamUnit {
    /// A character of a line's primary text
    Char(char),
    /// End of one transcript line
    Boundary,
}

impl StreamUnit {
    pub fn is_boundary(&self) -> bool {
        matches!(self, StreamUnit::Boundary)
    }

    pub fn is_space(&self) -> bool {
        matches!(self, StreamUnit::Char(' '))
    }

    /// Units the segmenter steps over before starting a piece
    pub fn is_separator(&self) -> bool {
        self.is_boundary() || self.is_space()
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            StreamUnit::Char(c) => Some(*c),
            StreamUnit::Boundary => None,
        }
    }

    /// Block text as handed to the game, with boundaries as a newline
    pub fn as_block(&self) -> String {
        match self {
            StreamUnit::Char(c) => c.to_string(),
            StreamUnit::Boundary => "\n".to_string(),
        }
    }
}

/// Primary text of every line laid end to end, with a boundary after each
/// non-empty line. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterStream {
    units: Vec<StreamUnit>,
}

impl CharacterStream {
    pub fn from_lines(lines: &[LyricLine]) -> Self {
        let mut units = Vec::new();
        for line in lines {
            let text = line.primary.trim();
            units.extend(text.chars().map(StreamUnit::Char));
            if !text.is_empty() {
                units.push(StreamUnit::Boundary);
            }
        }
        CharacterStream { units }
    }

    /// Build a stream from raw sentences, one boundary after each non-empty one
    pub fn from_sentences<S: AsRef<str>>(sentences: &[S]) -> Self {
        let lines: Vec<LyricLine> = sentences
            .iter()
            .map(|s| LyricLine::new(0.0, s.as_ref()))
            .collect();
        Self::from_lines(&lines)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<StreamUnit> {
        self.units.get(index).copied()
    }

    pub fn units(&self) -> &[StreamUnit] {
        &self.units
    }

    /// Number of boundary markers in the stream
    pub fn boundary_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_boundary()).count()
    }

    pub fn to_blocks(&self) -> Vec<String> {
        self.units.iter().map(StreamUnit::as_block).collect()
    }
}

impl fmt::Display for CharacterStream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for unit in &self.units {
            match unit {
                StreamUnit::Char(c) => write!(f, "{}", c)?,
                StreamUnit::Boundary => writeln!(f)?,
            }
        }
        Ok(())
    }
}

/// Parsed transcript together with its flattened stream
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<LyricLine>,
    stream: CharacterStream,
}

#[derive(Serialize)]
struct TranscriptExport<'a> {
    lyrics: &'a [LyricLine],
    total_chars: usize,
    lyric_blocks: Vec<String>,
}

impl Transcript {
    /// Build a transcript from already parsed lines
    pub fn from_lines(lines: Vec<LyricLine>) -> Self {
        let stream = CharacterStream::from_lines(&lines);
        Transcript { lines, stream }
    }

    /// Parse LRC content into a transcript
    pub fn parse_lrc_string(content: &str) -> Self {
        let lines = Self::parse_lrc_lines(content);
        let transcript = Self::from_lines(lines);
        debug!(
            "Parsed {} lyric lines, {} stream units",
            transcript.lines.len(),
            transcript.total_chars()
        );
        transcript
    }

    /// Parse LRC content into ordered lyric lines, back-filling translations
    pub fn parse_lrc_lines(content: &str) -> Vec<LyricLine> {
        let mut lines: Vec<LyricLine> = Vec::new();

        for (line_no, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();
            let Some(caps) = LRC_LINE_REGEX.captures(trimmed) else {
                trace!("Ignoring line {}: {}", line_no + 1, trimmed);
                continue;
            };

            let Some(time) = Self::parse_time(&caps[1], &caps[2]) else {
                trace!("Ignoring line {} with unreadable timestamp", line_no + 1);
                continue;
            };
            let text = &caps[3];

            if let Some(translation) = text.strip_prefix(TRANSLATION_MARKER) {
                match lines.last_mut() {
                    Some(last) => last.secondary = translation.trim().to_string(),
                    None => debug!("Dropping translation with no preceding line at line {}", line_no + 1),
                }
            } else {
                lines.push(LyricLine::new(time, text.trim()));
            }
        }

        lines
    }

    fn parse_time(minutes: &str, seconds: &str) -> Option<f64> {
        let minutes: u64 = minutes.parse().ok()?;
        let seconds: f64 = seconds.parse().ok()?;
        Some(minutes as f64 * 60.0 + seconds)
    }

    /// Read and parse a transcript file, reporting read failures
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TranscriptError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::parse_lrc_string(&content))
    }

    /// Read and parse a transcript file.
    ///
    /// A file that cannot be read is logged and yields an empty transcript,
    /// so an empty result may mean either an unreadable file or one with no
    /// lyric lines. Use [`Transcript::from_file`] to tell the two apart.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(transcript) => transcript,
            Err(e) => {
                error!("{}", e);
                Self::default()
            }
        }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn stream(&self) -> &CharacterStream {
        &self.stream
    }

    /// Stream length, markers included
    pub fn total_chars(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_parts(self) -> (Vec<LyricLine>, CharacterStream) {
        (self.lines, self.stream)
    }

    /// JSON export of lines, stream length and stream blocks
    pub fn to_json(&self) -> Result<String> {
        let export = TranscriptExport {
            lyrics: &self.lines,
            total_chars: self.total_chars(),
            lyric_blocks: self.stream.to_blocks(),
        };
        serde_json::to_string_pretty(&export).context("Failed to serialize transcript")
    }

    /// Write the transcript back out as LRC
    pub fn write_to_lrc<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create lyric file: {}", path.display()))?;

        for line in &self.lines {
            write!(file, "{}", line)?;
        }

        Ok(())
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Lyric Transcript")?;
        writeln!(f, "Lines: {}", self.lines.len())?;
        writeln!(f, "Translated: {}", self.lines.iter().filter(|l| !l.secondary.is_empty()).count())?;
        writeln!(f, "Stream units: {}", self.total_chars())?;
        Ok(())
    }
}
