#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};

use lyricblocks::app_config::{self, Config, LyricProvider};
use lyricblocks::file_utils::FileManager;
use lyricblocks::segmenter::{PieceRng, RandSource, Segmenter};
use lyricblocks::transcript::{CharacterStream, Transcript};
use lyricblocks::LyricFetcher;

/// CLI Wrapper for LyricProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLyricProvider {
    Netease,
    #[value(name = "qqmusic", alias = "qq")]
    QQMusic,
}

impl From<CliLyricProvider> for LyricProvider {
    fn from(cli_provider: CliLyricProvider) -> Self {
        match cli_provider {
            CliLyricProvider::Netease => LyricProvider::Netease,
            CliLyricProvider::QQMusic => LyricProvider::QQMusic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a transcript and print lines, stream length and stream blocks as JSON
    Parse {
        /// LRC file, or a directory to scan for LRC files
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Cut a transcript into pieces and print them in order
    Segment {
        /// LRC file to segment
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Seed for a reproducible piece sequence (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Also print the predicted shape of the following piece
        #[arg(short, long)]
        preview: bool,
    },

    /// Search and download lyrics with the external lyric search tool
    Fetch {
        /// Song title, or "artist title"
        #[arg(short, long)]
        keyword: String,

        /// Where the LRC file should be written
        #[arg(short, long)]
        output: PathBuf,

        /// Lyric search executable (overrides the config)
        #[arg(short, long)]
        app: Option<PathBuf>,

        /// Lyric source (overrides the config)
        #[arg(long, value_enum)]
        provider: Option<CliLyricProvider>,
    },

    /// Generate shell completions for lyricblocks
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// lyricblocks - Lyric transcripts cut into falling-block pieces
#[derive(Parser, Debug)]
#[command(name = "lyricblocks")]
#[command(version = "0.1.0")]
#[command(about = "Cut timestamped lyrics into falling-block pieces")]
#[command(long_about = "lyricblocks parses LRC transcripts and cuts their text into puzzle pieces.

EXAMPLES:
    lyricblocks parse song.lrc                       # Print the transcript as JSON
    lyricblocks parse lyrics/                        # Summarise every LRC file in a folder
    lyricblocks segment song.lrc                     # Print every piece
    lyricblocks segment --seed 7 --preview song.lrc  # Reproducible pieces with previews
    lyricblocks fetch -k \"artist title\" -o song.lrc  # Download lyrics with the search tool
    lyricblocks completions bash > lyricblocks.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Stderr logger with colour per level
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is applied once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "lyricblocks", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    config.validate()
        .context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Parse { input_path } => run_parse(&input_path),
        Commands::Segment { input_path, seed, preview } => run_segment(&config, &input_path, seed, preview),
        Commands::Fetch { keyword, output, app, provider } => {
            let mut fetch_config = config.fetch.clone();
            if let Some(app) = app {
                fetch_config.app_path = app;
            }
            if let Some(provider) = provider {
                fetch_config.provider = provider.into();
            }
            run_fetch(LyricFetcher::new(fetch_config), &keyword, &output).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the config file, creating a default one when missing
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Command line wins over the file
    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    Ok(config)
}

fn run_parse(input_path: &Path) -> Result<()> {
    if input_path.is_file() {
        let transcript = Transcript::from_file(input_path)?;
        println!("{}", transcript.to_json()?);
        return Ok(());
    }

    if !input_path.is_dir() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    let files = FileManager::find_lyric_files(input_path)?;
    if files.is_empty() {
        warn!("No LRC files found in {:?}", input_path);
        return Ok(());
    }

    for path in &files {
        match Transcript::from_file(path) {
            Ok(transcript) => println!(
                "{}: {} lines, {} stream units",
                path.display(),
                transcript.lines().len(),
                transcript.total_chars()
            ),
            Err(e) => warn!("Skipping {}", e),
        }
    }
    info!("Processed {} files", files.len());

    Ok(())
}

fn run_segment(config: &Config, input_path: &Path, seed: Option<u64>, preview: bool) -> Result<()> {
    if !input_path.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", input_path));
    }

    let transcript = Transcript::load(input_path);
    if transcript.total_chars() == 0 {
        warn!("Nothing to segment in {:?}", input_path);
        return Ok(());
    }

    match seed.or(config.segmenter.seed) {
        Some(seed) => {
            let mut segmenter = Segmenter::from_config(&config.segmenter, RandSource::seeded(seed));
            print_pieces(&mut segmenter, transcript.stream(), preview);
        }
        None => {
            let mut segmenter = Segmenter::from_config(&config.segmenter, RandSource::thread());
            print_pieces(&mut segmenter, transcript.stream(), preview);
        }
    }

    Ok(())
}

fn print_pieces<R: PieceRng>(segmenter: &mut Segmenter<R>, stream: &CharacterStream, preview: bool) {
    let mut pieces = segmenter.pieces(stream, 0);
    let mut count = 0;

    while let Some(piece) = pieces.next() {
        count += 1;
        let mut line = format!(
            "{:>4}  {:<4}  size={}  cursor={:<6} sentence={:<3} \"{}\"",
            count,
            piece.shape_label(),
            piece.size,
            piece.new_cursor,
            piece.sentence_length,
            piece.text()
        );
        if preview {
            let next = pieces.predict_next().map_or("", |shape| shape.label());
            line.push_str(&format!("  next={}", next));
        }
        println!("{}", line);
    }

    info!("{} pieces from {} stream units", count, stream.len());
}

async fn run_fetch(fetcher: LyricFetcher, keyword: &str, output: &Path) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| anyhow!("Invalid progress template: {}", e))?,
    );
    spinner.set_message(format!(
        "Searching {} for \"{}\"",
        fetcher.config().provider.display_name(),
        keyword
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = fetcher.search_and_download(keyword, output).await;
    spinner.finish_and_clear();

    println!("{}", outcome.message());
    if outcome.success {
        Ok(())
    } else {
        Err(anyhow!("Lyric search failed for \"{}\"", keyword))
    }
}
