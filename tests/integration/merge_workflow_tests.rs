/*!
 * Integration tests for the subtitle merge workflow
 */

use std::fs;
use anyhow::Result;
use encoding_rs::WINDOWS_1256;
use srtmerge::app_config::Config;
use srtmerge::app_controller::{Controller, MergeRequest};
use srtmerge::errors::MergeError;
use srtmerge::merger::{Merger, MergerOptions, SourceOptions};
use srtmerge::subtitle_processor::{Decoration, SubtitleColor};
use crate::common;

/// Test that we can add files, merge them and read the result back
#[test]
fn test_merge_workflow_withTwoFiles_shouldWriteMergedFile() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let english = common::create_test_subtitle(temp_dir.path(), "en.srt")?;
    let spanish = common::create_test_file(temp_dir.path(), "es.srt", common::SECOND_SRT)?;

    let mut merger = Merger::new(MergerOptions {
        output_path: temp_dir.path().to_path_buf(),
        output_name: "new.srt".to_string(),
        ..MergerOptions::default()
    })?;
    merger.add(&english, SourceOptions::default())?;
    merger.add(&spanish, SourceOptions::new(None, Decoration::new(Some(SubtitleColor::Yellow), true)))?;

    let written = merger.merge()?;
    assert_eq!(written, temp_dir.path().join("new.srt"));

    let content = fs::read_to_string(&written)?;
    assert_eq!(common::merged_indices(&content), vec![1, 2, 3, 4, 5]);
    assert!(content.starts_with("\u{feff}1\n00:00:01,000 --> 00:00:04,000\nThis is a test subtitle.\n"));
    assert!(content.contains("\n3\n00:00:05,400 --> 00:00:08,000\n{\\an8}<font color=\"#FFEB00\">Segunda linea.</font>\n"));
    assert!(!content.ends_with('\n'));
    Ok(())
}

/// Test that a source file that cannot be read aborts the add
#[test]
fn test_merger_add_withMissingFile_shouldReturnIoError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut merger = Merger::new(MergerOptions::default())?;

    let result = merger.add(temp_dir.path().join("missing.srt"), SourceOptions::default());
    assert!(matches!(result, Err(MergeError::Io { .. })));
    Ok(())
}

/// Test the controller with default output placement
#[test]
fn test_controller_run_withoutOutput_shouldWriteNextToUpperSub() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let upper = common::create_test_subtitle(temp_dir.path(), "movie.en.srt")?;
    let (arabic, _, _) = WINDOWS_1256.encode("1\r\n00:00:05,000 --> 00:00:06,000\r\nمرحبا بالعالم\r\n");
    let lower = common::create_test_file(temp_dir.path(), "movie.ar.srt", &arabic)?;

    let controller = Controller::with_config(Config::default())?;
    let written = controller.run(&MergeRequest {
        upper_sub: upper,
        lower_sub: lower,
        lower_yellow: true,
        lower_encoding: Some("windows-1256".to_string()),
        ..MergeRequest::default()
    })?;

    assert_eq!(written, temp_dir.path().join("movie.en_movie.ar_merged.srt"));
    let content = fs::read_to_string(&written)?;
    assert!(content.contains("<font color=\"#FFEB00\">مرحبا بالعالم</font>"));
    assert!(!content.contains("{\\an8}"));
    Ok(())
}

/// Test the controller writing into an output directory with top placement
#[test]
fn test_controller_run_withOutputDirAndTop_shouldDecorateUpperSub() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("out");
    fs::create_dir(&out_dir)?;
    let upper = common::create_test_subtitle(temp_dir.path(), "en.srt")?;
    let lower = common::create_test_file(temp_dir.path(), "es.srt", common::SECOND_SRT)?;

    let controller = Controller::with_config(Config::default())?;
    let written = controller.run(&MergeRequest {
        upper_sub: upper,
        lower_sub: lower,
        top: true,
        output: Some(out_dir.clone()),
        ..MergeRequest::default()
    })?;

    assert_eq!(written, out_dir.join("en_es_merged.srt"));
    let content = fs::read_to_string(&written)?;
    assert!(content.contains("\n{\\an8}This is a test subtitle.\n"));
    assert!(content.contains("\nSegunda linea.\n"));
    Ok(())
}

/// Test UTF-16 output through the controller
#[test]
fn test_controller_run_withUtf16Config_shouldWriteUtf16Bom() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let upper = common::create_test_subtitle(temp_dir.path(), "en.srt")?;
    let lower = common::create_test_file(temp_dir.path(), "es.srt", common::SECOND_SRT)?;
    let output = temp_dir.path().join("merged.srt");

    let config = Config {
        output_encoding: "utf-16".to_string(),
        ..Config::default()
    };
    let written = Controller::with_config(config)?.run(&MergeRequest {
        upper_sub: upper,
        lower_sub: lower,
        output: Some(output.clone()),
        ..MergeRequest::default()
    })?;

    assert_eq!(written, output);
    let bytes = fs::read(&written)?;
    assert!(bytes.starts_with(&[0xFF, 0xFE, b'1', 0x00]));
    Ok(())
}

/// Test that non-SubRip inputs are rejected before anything is read
#[test]
fn test_controller_run_withNonSrtInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let upper = common::create_test_subtitle(temp_dir.path(), "en.srt")?;
    let lower = common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;

    let controller = Controller::with_config(Config::default())?;
    let error = controller
        .run(&MergeRequest {
            upper_sub: upper,
            lower_sub: lower,
            ..MergeRequest::default()
        })
        .unwrap_err();

    assert!(matches!(error.downcast_ref::<MergeError>(), Some(MergeError::UnsupportedExtension(_))));
    assert!(!temp_dir.path().join("en_notes_merged.srt").exists());
    Ok(())
}

/// Test that an invalid configuration is refused
#[test]
fn test_controller_with_config_withBadEncoding_shouldFail() {
    let config = Config {
        output_encoding: "bogus".to_string(),
        ..Config::default()
    };
    assert!(Controller::with_config(config).is_err());
}
