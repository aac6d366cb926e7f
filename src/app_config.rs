use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::segmenter::{MAX_PIECE_SIZE, MIN_PIECE_SIZE};

/// Application configuration module
/// This module handles loading, validating and saving the segmenter and
/// lyric fetcher settings.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Piece segmentation settings
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// External lyric search settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One entry of the weighted piece-size distribution
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SizeWeight {
    /// Piece size in characters
    pub size: usize,

    /// Relative weight of this size
    pub weight: u32,
}

impl SizeWeight {
    pub fn new(size: usize, weight: u32) -> Self {
        Self { size, weight }
    }

    /// Sum of the weights, `None` if it does not fit in a `u32`
    pub fn checked_total(weights: &[SizeWeight]) -> Option<u32> {
        weights.iter().try_fold(0u32, |acc, w| acc.checked_add(w.weight))
    }
}

/// Segmenter configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmenterConfig {
    /// Distribution used when no word boundary offers a clean cut,
    /// and for the next-piece preview of long sentences
    #[serde(default = "default_target_weights")]
    pub target_weights: Vec<SizeWeight>,

    /// Fixed seed for reproducible piece sequences
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            target_weights: default_target_weights(),
            seed: None,
        }
    }
}

impl SegmenterConfig {
    /// Sum of all weights in the distribution, `None` on overflow
    pub fn total_weight(&self) -> Option<u32> {
        SizeWeight::checked_total(&self.target_weights)
    }
}

/// Lyric source queried by the external search tool
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LyricProvider {
    // @provider: NetEase Cloud Music
    #[default]
    Netease,
    // @provider: QQ Music
    QQMusic,
}

impl LyricProvider {
    // @returns: Human readable provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Netease => "NetEase Cloud Music",
            Self::QQMusic => "QQ Music",
        }
    }

    // @returns: Identifier passed on the tool's command line
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Netease => "netease".to_string(),
            Self::QQMusic => "qqmusic".to_string(),
        }
    }
}

impl std::fmt::Display for LyricProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for LyricProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "netease" => Ok(Self::Netease),
            "qqmusic" | "qq" => Ok(Self::QQMusic),
            _ => Err(anyhow!("Invalid lyric provider: {}", s)),
        }
    }
}

/// External lyric search configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FetchConfig {
    // @field: Path to the lyric search executable
    #[serde(default = "default_app_path")]
    pub app_path: PathBuf,

    // @field: Lyric source
    #[serde(default)]
    pub provider: LyricProvider,

    // @field: Output format requested from the tool
    #[serde(default = "default_format")]
    pub format: String,

    // @field: Output encoding requested from the tool
    #[serde(default = "default_encoding")]
    pub encoding: String,

    // @field: Process timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: How many times to look for the output file
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    // @field: Delay between output file checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            app_path: default_app_path(),
            provider: LyricProvider::default(),
            format: default_format(),
            encoding: default_encoding(),
            timeout_secs: default_timeout_secs(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_target_weights() -> Vec<SizeWeight> {
    vec![
        SizeWeight::new(4, 60),
        SizeWeight::new(5, 25),
        SizeWeight::new(6, 15),
    ]
}

fn default_app_path() -> PathBuf {
    PathBuf::from("MusicLyricApp")
}

fn default_format() -> String {
    "lrc".to_string()
}

fn default_encoding() -> String {
    "utf8".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let weights = &self.segmenter.target_weights;
        if weights.is_empty() {
            return Err(anyhow!("Segmenter target_weights must not be empty"));
        }

        if let Some(bad) = weights
            .iter()
            .find(|w| w.size < MIN_PIECE_SIZE || w.size > MAX_PIECE_SIZE)
        {
            return Err(anyhow!(
                "Target size {} is outside {}..={}",
                bad.size, MIN_PIECE_SIZE, MAX_PIECE_SIZE
            ));
        }

        match self.segmenter.total_weight() {
            None => return Err(anyhow!("Segmenter target_weights total exceeds {}", u32::MAX)),
            Some(0) => return Err(anyhow!("Segmenter target_weights must have a positive total")),
            Some(_) => {}
        }

        if self.fetch.timeout_secs == 0 {
            return Err(anyhow!("Fetch timeout_secs must be greater than zero"));
        }

        if self.fetch.poll_attempts == 0 {
            return Err(anyhow!("Fetch poll_attempts must be greater than zero"));
        }

        Ok(())
    }
}
