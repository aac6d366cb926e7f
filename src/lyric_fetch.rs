/*!
 * External lyric acquisition.
 *
 * Runs a lyric search executable with a keyword and waits for it to leave a
 * transcript file at the requested path. Every failure is reported as an
 * unsuccessful [`FetchOutcome`] with diagnostic text, never as an error the
 * caller has to propagate.
 */

use std::path::Path;
use std::time::Duration;
use log::{debug, error, info};
use tokio::process::Command;

use crate::app_config::FetchConfig;
use crate::errors::FetchError;
use crate::file_utils::FileManager;

/// Result of one lyric search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Whether a non-empty transcript file was produced
    pub success: bool,

    /// Command line, exit status, tool output and failure reason
    pub diagnostics: Vec<String>,
}

impl FetchOutcome {
    /// All diagnostics as one block of text
    pub fn message(&self) -> String {
        self.diagnostics.join("\n")
    }
}

/// Wrapper around the external lyric search tool
#[derive(Debug, Clone)]
pub struct LyricFetcher {
    config: FetchConfig,
}

impl LyricFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Arguments passed to the search tool
    pub fn build_args(&self, keyword: &str, output_path: &Path) -> Vec<String> {
        vec![
            "--keyword".to_string(),
            keyword.to_string(),
            "--output".to_string(),
            output_path.to_string_lossy().to_string(),
            "--format".to_string(),
            self.config.format.clone(),
            "--encoding".to_string(),
            self.config.encoding.clone(),
            "--provider".to_string(),
            self.config.provider.to_lowercase_string(),
        ]
    }

    /// Search for lyrics matching `keyword` and save them to `output_path`
    pub async fn search_and_download(&self, keyword: &str, output_path: &Path) -> FetchOutcome {
        let mut diagnostics = Vec::new();

        match self.run(keyword, output_path, &mut diagnostics).await {
            Ok(()) => {
                info!("Lyrics saved to {:?}", output_path);
                diagnostics.push(format!("Lyrics saved to {}", output_path.display()));
                FetchOutcome { success: true, diagnostics }
            }
            Err(e) => {
                error!("{}", e);
                diagnostics.push(e.to_string());
                FetchOutcome { success: false, diagnostics }
            }
        }
    }

    async fn run(&self, keyword: &str, output_path: &Path, diagnostics: &mut Vec<String>) -> Result<(), FetchError> {
        let app_path = &self.config.app_path;
        if !app_path.exists() {
            return Err(FetchError::AppNotFound(app_path.clone()));
        }

        FileManager::ensure_parent_dir(output_path)
            .map_err(|e| FetchError::OutputDir(e.to_string()))?;

        let args = self.build_args(keyword, output_path);
        let command_line = format!("{} {}", app_path.display(), args.join(" "));
        debug!("Running lyric search: {}", command_line);
        diagnostics.push(format!("Command: {}", command_line));

        let search_future = Command::new(app_path)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let timeout_secs = self.config.timeout_secs;
        let output = tokio::select! {
            result = search_future => {
                result.map_err(|e| FetchError::Spawn(e.to_string()))?
            },
            _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
                return Err(FetchError::Timeout(timeout_secs));
            }
        };

        let exit = output
            .status
            .code()
            .map_or_else(|| "terminated by signal".to_string(), |code| code.to_string());
        diagnostics.push(format!("Exit code: {}", exit));

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            diagnostics.push(format!("stdout: {}", stdout.trim()));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            diagnostics.push(format!("stderr: {}", stderr.trim()));
        }

        // The tool may finish writing after it exits, so the exit code alone
        // does not decide the outcome.
        self.wait_for_output(output_path).await
    }

    async fn wait_for_output(&self, output_path: &Path) -> Result<(), FetchError> {
        let attempts = self.config.poll_attempts.max(1);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 1..=attempts {
            if FileManager::has_content(output_path) {
                return Ok(());
            }
            debug!("Lyric file not ready ({}/{})", attempt, attempts);
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(FetchError::NoOutput(output_path.to_path_buf()))
    }
}
