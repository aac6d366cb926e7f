/*!
 * Tests for transcript parsing and character stream building
 */

use anyhow::Result;
use lyricblocks::errors::TranscriptError;
use lyricblocks::transcript::{CharacterStream, LyricLine, StreamUnit, Transcript};
use crate::common;

/// A single timestamped line becomes one lyric line and a 12 unit stream
#[test]
fn test_parse_withSingleLine_shouldBuildLineAndStream() {
    let transcript = Transcript::parse_lrc_string("[00:01.50]hello world\n");

    assert_eq!(transcript.lines().len(), 1);
    let line = &transcript.lines()[0];
    assert_eq!(line.time, 1.5);
    assert_eq!(line.primary, "hello world");
    assert_eq!(line.secondary, "");

    assert_eq!(transcript.total_chars(), 12);
    assert_eq!(transcript.stream().get(5), Some(StreamUnit::Char(' ')));
    assert_eq!(transcript.stream().get(11), Some(StreamUnit::Boundary));
}

#[test]
fn test_parse_withMinutes_shouldDecodeSeconds() {
    let transcript = Transcript::parse_lrc_string("[02:03.25]x\n[10:00.125]y");

    assert_eq!(transcript.lines()[0].time, 123.25);
    assert_eq!(transcript.lines()[1].time, 600.125);
}

#[test]
fn test_parse_withTranslation_shouldBackfillPreviousLine() {
    let content = "[00:01.00]ああ\n[00:01.00]/  啊  \n[00:02.00]いい\n";
    let transcript = Transcript::parse_lrc_string(content);

    assert_eq!(transcript.lines().len(), 2);
    assert_eq!(transcript.lines()[0].secondary, "啊");
    assert_eq!(transcript.lines()[1].secondary, "");
    // translations never reach the stream
    assert_eq!(transcript.total_chars(), 6);
}

#[test]
fn test_parse_withTwoTranslations_shouldKeepLast() {
    let content = "[00:01.00]ah\n[00:01.00]/first\n[00:01.00]/second\n";
    let transcript = Transcript::parse_lrc_string(content);

    assert_eq!(transcript.lines().len(), 1);
    assert_eq!(transcript.lines()[0].secondary, "second");
}

#[test]
fn test_parse_withOrphanTranslation_shouldDropIt() {
    let content = "[00:00.50]/nobody owns me\n[00:01.00]first\n";
    let transcript = Transcript::parse_lrc_string(content);

    assert_eq!(transcript.lines().len(), 1);
    assert_eq!(transcript.lines()[0].primary, "first");
    assert_eq!(transcript.lines()[0].secondary, "");
}

#[test]
fn test_parse_withMalformedLines_shouldIgnoreThem() {
    let content = "[ti:Title]\n[ar:Artist]\nplain text\n[00:01]no fraction\n[00:02.00]\n\n   [00:03.00]  kept  \n";
    let transcript = Transcript::parse_lrc_string(content);

    assert_eq!(transcript.lines().len(), 1);
    assert_eq!(transcript.lines()[0].primary, "kept");
    assert_eq!(transcript.lines()[0].time, 3.0);
}

#[test]
fn test_parse_withSpaceBeforeMarker_shouldTreatAsPrimaryText() {
    let transcript = Transcript::parse_lrc_string("[00:01.00] /not a translation\n");

    assert_eq!(transcript.lines().len(), 1);
    assert_eq!(transcript.lines()[0].primary, "/not a translation");
}

#[test]
fn test_parse_withMultibyteText_shouldCountCharacters() {
    let transcript = Transcript::parse_lrc_string("[00:00.00]ああもう\n");

    assert_eq!(transcript.total_chars(), 5);
    assert_eq!(transcript.stream().get(0), Some(StreamUnit::Char('あ')));
}

#[test]
fn test_parse_withSampleFile_shouldMatchExpectedCounts() {
    let transcript = Transcript::parse_lrc_string(common::SAMPLE_LRC);

    assert_eq!(transcript.lines().len(), 3);
    assert_eq!(transcript.lines()[0].secondary, "你好 世界");
    assert_eq!(transcript.lines()[1].secondary, "啊 真是 烦死了");
    assert_eq!(transcript.lines()[2].time, 62.25);
    assert_eq!(transcript.total_chars(), 12 + 15 + 6);
}

/// Stream length is every primary character plus one marker per non-empty line
#[test]
fn test_stream_length_shouldCountCharactersAndMarkers() {
    let lines = vec![
        LyricLine::new(0.0, "abc"),
        LyricLine::new(1.0, ""),
        LyricLine::new(2.0, "de f"),
        LyricLine::new(3.0, "   "),
        LyricLine::new(4.0, "ghij"),
    ];
    let stream = CharacterStream::from_lines(&lines);

    let chars: usize = lines.iter().map(|l| l.primary.trim().chars().count()).sum();
    let non_empty = lines.iter().filter(|l| !l.primary.trim().is_empty()).count();
    assert_eq!(stream.len(), chars + non_empty);
    assert_eq!(stream.boundary_count(), 3);
}

#[test]
fn test_stream_markers_shouldNeverBeAdjacent() {
    let stream = CharacterStream::from_sentences(&["a", "", "", "b", "", "c"]);

    let units = stream.units();
    assert_ne!(units.first(), Some(&StreamUnit::Boundary));
    for pair in units.windows(2) {
        assert!(!(pair[0].is_boundary() && pair[1].is_boundary()));
    }
    assert_eq!(stream.to_string(), "a\nb\nc\n");
}

#[test]
fn test_emptyContent_shouldYieldEmptyTranscript() {
    let transcript = Transcript::parse_lrc_string("");

    assert!(transcript.is_empty());
    assert_eq!(transcript.total_chars(), 0);
    assert!(transcript.stream().is_empty());
}

#[test]
fn test_fromFile_withMissingFile_shouldReportUnreadable() {
    let result = Transcript::from_file("definitely_missing_lyrics_12345.lrc");

    assert!(matches!(result, Err(TranscriptError::Unreadable { .. })));
}

#[test]
fn test_load_withMissingFile_shouldReturnEmptyResult() {
    common::init_logging();
    let transcript = Transcript::load("definitely_missing_lyrics_12345.lrc");

    assert!(transcript.lines().is_empty());
    assert_eq!(transcript.total_chars(), 0);
}

#[test]
fn test_load_withExistingFile_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_lrc(temp_dir.path(), "sample.lrc")?;

    let transcript = Transcript::load(&path);

    assert_eq!(transcript.lines().len(), 3);
    assert_eq!(transcript.total_chars(), 33);
    Ok(())
}

#[test]
fn test_toJson_shouldExportLinesCountAndBlocks() -> Result<()> {
    let transcript = Transcript::parse_lrc_string("[00:01.50]hi yo\n[00:01.50]/嗨\n");
    let json: serde_json::Value = serde_json::from_str(&transcript.to_json()?)?;

    assert_eq!(json["total_chars"], 6);
    assert_eq!(json["lyrics"][0]["primary"], "hi yo");
    assert_eq!(json["lyrics"][0]["secondary"], "嗨");
    assert_eq!(json["lyrics"][0]["time"], 1.5);

    let blocks = json["lyric_blocks"].as_array().expect("blocks should be an array");
    assert_eq!(blocks.len(), 6);
    assert_eq!(blocks[2], " ");
    assert_eq!(blocks[5], "\n");
    Ok(())
}

#[test]
fn test_lyricLine_display_shouldWriteLrc() {
    let line = LyricLine::new(62.5, "abc").with_secondary("xyz");
    assert_eq!(line.to_string(), "[01:02.50]abc\n[01:02.50]/xyz\n");

    let plain = LyricLine::new(0.0, "solo");
    assert_eq!(plain.to_string(), "[00:00.00]solo\n");
}

#[test]
fn test_formatTimestamp_shouldRoundIntoNextMinute() {
    assert_eq!(LyricLine::format_timestamp(59.999), "01:00.00");
    assert_eq!(LyricLine::format_timestamp(-3.0), "00:00.00");
    assert_eq!(LyricLine::format_timestamp(600.125), "10:00.13");
}

#[test]
fn test_parse_withFullWidthTimestamp_shouldIgnoreLine() {
    let content = "[０１:０２.５０]wide digits\n[00:03.00]kept\n";
    let transcript = Transcript::parse_lrc_string(content);

    assert_eq!(transcript.lines().len(), 1);
    assert_eq!(transcript.lines()[0].primary, "kept");
}
