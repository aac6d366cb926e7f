/*!
 * Tests for the external lyric search wrapper
 */

use std::path::{Path, PathBuf};
use anyhow::Result;
use lyricblocks::app_config::{FetchConfig, LyricProvider};
use lyricblocks::lyric_fetch::LyricFetcher;
use lyricblocks::transcript::Transcript;
use crate::common;

fn quick_config(app_path: PathBuf) -> FetchConfig {
    FetchConfig {
        app_path,
        timeout_secs: 5,
        poll_attempts: 3,
        poll_interval_ms: 20,
        ..FetchConfig::default()
    }
}

#[test]
fn test_buildArgs_shouldPassKeywordOutputAndSettings() {
    let config = FetchConfig {
        provider: LyricProvider::QQMusic,
        ..FetchConfig::default()
    };
    let fetcher = LyricFetcher::new(config);

    let args = fetcher.build_args("artist title", Path::new("out/song.lrc"));

    assert_eq!(
        args,
        vec![
            "--keyword", "artist title",
            "--output", "out/song.lrc",
            "--format", "lrc",
            "--encoding", "utf8",
            "--provider", "qqmusic",
        ]
    );
}

#[test]
fn test_searchAndDownload_withMissingApp_shouldFailWithDiagnostics() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let fetcher = LyricFetcher::new(quick_config(temp_dir.path().join("NoSuchApp")));

    let outcome = tokio_test::block_on(fetcher.search_and_download("song", &temp_dir.path().join("song.lrc")));

    assert!(!outcome.success);
    assert!(outcome.message().contains("executable not found"));
    assert!(outcome.message().contains("NoSuchApp"));
    Ok(())
}

#[cfg(unix)]
mod with_scripts {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable shell script; `$4` is the output path
    fn create_script(dir: &Path, body: &str) -> Result<PathBuf> {
        let path = common::create_test_file(dir, "search.sh", &format!("#!/bin/sh\n{}\n", body))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    #[tokio::test]
    async fn test_searchAndDownload_withWorkingTool_shouldSaveLyrics() -> Result<()> {
        common::init_logging();
        let temp_dir = common::create_temp_dir()?;
        let script = create_script(
            temp_dir.path(),
            "echo \"searching $2\"\nprintf '[00:01.50]hello world\\n' > \"$4\"",
        )?;
        let output = temp_dir.path().join("lyrics").join("song.lrc");
        let fetcher = LyricFetcher::new(quick_config(script));

        let outcome = fetcher.search_and_download("hello", &output).await;

        assert!(outcome.success, "{}", outcome.message());
        assert!(outcome.diagnostics[0].starts_with("Command: "));
        assert!(outcome.message().contains("Exit code: 0"));
        assert!(outcome.message().contains("searching hello"));
        assert!(outcome.message().contains("Lyrics saved to"));

        let transcript = Transcript::from_file(&output)?;
        assert_eq!(transcript.lines().len(), 1);
        assert_eq!(transcript.lines()[0].primary, "hello world");
        Ok(())
    }

    #[tokio::test]
    async fn test_searchAndDownload_withNoResult_shouldReportMissingFile() -> Result<()> {
        let temp_dir = common::create_temp_dir()?;
        let script = create_script(temp_dir.path(), "echo 'nothing found' >&2\nexit 3")?;
        let fetcher = LyricFetcher::new(quick_config(script));

        let outcome = fetcher.search_and_download("unknown", &temp_dir.path().join("none.lrc")).await;

        assert!(!outcome.success);
        assert!(outcome.message().contains("Exit code: 3"));
        assert!(outcome.message().contains("stderr: nothing found"));
        assert!(outcome.message().contains("No lyric file produced"));
        Ok(())
    }

    #[tokio::test]
    async fn test_searchAndDownload_withEmptyFile_shouldFail() -> Result<()> {
        let temp_dir = common::create_temp_dir()?;
        let script = create_script(temp_dir.path(), ": > \"$4\"")?;
        let fetcher = LyricFetcher::new(quick_config(script));

        let outcome = fetcher.search_and_download("empty", &temp_dir.path().join("empty.lrc")).await;

        assert!(!outcome.success);
        assert!(outcome.message().contains("No lyric file produced"));
        Ok(())
    }

    #[tokio::test]
    async fn test_searchAndDownload_withNonZeroExitButFile_shouldSucceed() -> Result<()> {
        let temp_dir = common::create_temp_dir()?;
        let script = create_script(temp_dir.path(), "printf '[00:00.00]x\\n' > \"$4\"\nexit 1")?;
        let fetcher = LyricFetcher::new(quick_config(script));

        let outcome = fetcher.search_and_download("x", &temp_dir.path().join("x.lrc")).await;

        assert!(outcome.success, "{}", outcome.message());
        assert!(outcome.message().contains("Exit code: 1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_searchAndDownload_withSlowTool_shouldTimeOut() -> Result<()> {
        let temp_dir = common::create_temp_dir()?;
        let script = create_script(temp_dir.path(), "sleep 5")?;
        let config = FetchConfig {
            timeout_secs: 1,
            ..quick_config(script)
        };
        let fetcher = LyricFetcher::new(config);

        let outcome = fetcher.search_and_download("slow", &temp_dir.path().join("slow.lrc")).await;

        assert!(!outcome.success);
        assert!(outcome.message().contains("timed out after 1 seconds"));
        Ok(())
    }
}
