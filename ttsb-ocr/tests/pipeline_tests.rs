//! End-to-end tests: roster and clip files on disk through the pipeline

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use ttsb_common::config::TomlConfig;
use ttsb_common::{Error, Player, ScoreTuple, TransitionKind};
use ttsb_ocr::frames::raw_frames;
use ttsb_ocr::pipeline::score_batch;
use ttsb_ocr::{canonicalize, classify, load_clips, load_roster, Pipeline, TransitionPolicy};

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// One `[success, idx, result]` entry with a detection per token
fn frame(idx: u64, tokens: &[&str]) -> String {
    let detections: Vec<String> = tokens
        .iter()
        .map(|t| format!(r#"[[[0,0],[9,0],[9,9],[0,9]], ["{}", 0.95]]"#, t))
        .collect();
    format!("[true, {}, [[{}]]]", idx, detections.join(", "))
}

#[test]
fn test_load_roster_normalizes_and_dedups() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "players.csv",
        "Ma Long,CHN\nFan  Zhendong\n\nMA LONG\nLin Yun-Ju,TPE,extra\n",
    );

    let roster = load_roster(&path).unwrap();
    assert_eq!(roster.names(), ["MA LONG", "FAN ZHENDONG", "LIN YUN-JU"]);
    assert_eq!(roster.lookup("LIN YUN JU"), Some("LIN YUN-JU"));
}

#[test]
fn test_missing_roster_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_roster(&dir.path().join("absent.csv"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_empty_roster_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.csv", "\n  \n");
    assert!(matches!(load_roster(&path), Err(Error::NotFound(_))));
}

#[test]
fn test_malformed_clip_file_is_json_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "clips.json", r#"[{"clip": "x", "frames": 3}]"#);
    assert!(matches!(load_clips(&path), Err(Error::Json(_))));
}

#[test]
fn test_identify_and_score_from_files() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_file(
        &dir,
        "players.csv",
        "MA LONG\nFAN ZHENDONG\nWANG CHUQIN\nSUN YINGSHA\nTOMOKAZU HARIMOTO\nHINA HAYATA\n",
    );

    let singles = [
        frame(100, &["MA LONG", "2", "10", "FAN ZHENDNG", "1", "9"]),
        frame(101, &["MA LONG", "2", "10", "FAN ZHENDONG", "1", "9"]),
        frame(102, &["MA LONG", "3", "0", "FAN ZHENDONG", "1", "0"]),
        r#"[true, 103, "OPTIMIZED"]"#.to_string(),
        frame(104, &["MA LONG", "3", "0", "FAN ZHENDONG", "1", "0"]),
    ];
    let doubles = [
        frame(0, &["WANG CHUQIN", "SUN YINGSHA", "0", "4", "HARIMOTO", "HINA HAYATA", "1", "2"]),
        frame(8, &["WANG CHUQIN", "SUN YINGSHA", "0", "5", "HARIMOTO", "HINA HAYATA", "1", "2"]),
        frame(9, &["WANG CHUQIN", "SUN YINGSHA", "0", "5", "HARIMOTO", "HINA HAYATA", "1", "9"]),
        frame(12, &["WANG CHUQIN", "SUN YINGSHA", "0", "5", "HARIMOTO", "HINA HAYATA", "1", "3"]),
    ];
    let clips_json = format!(
        r#"[
            {{"clip": "dQw4w9WgXcQ_3000_2-1", "frames": [{}]}},
            {{"clip": "aBcDeFgHiJk_120_0-1", "frames": [{}]}},
            {{"clip": "emptyclip00_1_0-0", "frames": [[false, 0, null]]}}
        ]"#,
        singles.join(", "),
        doubles.join(", ")
    );
    let clips_path = write_file(&dir, "clips.json", &clips_json);

    let roster = load_roster(&roster_path).unwrap();
    let clips = load_clips(&clips_path).unwrap();
    let pipeline = Pipeline::new(Arc::new(roster), &TomlConfig::default());
    let reports = pipeline.process_batch(&clips);
    assert_eq!(reports.len(), 3);

    let singles = &reports[0];
    assert_eq!(singles.players.slots(), &["MA LONG", "FAN ZHENDONG", "", ""].map(String::from));
    assert_eq!(singles.frames_total, 5);
    assert_eq!(singles.frames_classified, 4);
    assert_eq!(singles.score_events.len(), 1);
    assert_eq!(singles.score_events[0].frames, (100, 102));
    assert_eq!(
        singles.score_events[0].kind,
        TransitionKind::GameWon { player: Player::One }
    );

    let doubles = &reports[1];
    assert_eq!(
        doubles.players.slots(),
        &["WANG CHUQIN", "SUN YINGSHA", "TOMOKAZU HARIMOTO", "HINA HAYATA"].map(String::from)
    );
    let steps: Vec<ScoreTuple> = doubles.score_events.iter().map(|e| e.to).collect();
    assert_eq!(steps, vec![ScoreTuple::new(0, 5, 1, 2), ScoreTuple::new(0, 5, 1, 3)]);
    assert_eq!(doubles.score_events[1].frames, (8, 12));

    let empty = &reports[2];
    assert!(empty.players.is_empty());
    assert!(empty.score_events.is_empty());
    assert_eq!(empty.frames_canonical, 0);
}

#[test]
fn test_strict_scores_ignore_mid_match_reset() {
    let dir = TempDir::new().unwrap();
    let frames = [
        frame(0, &["A", "1", "5", "B", "1", "5"]),
        frame(1, &["A", "0", "0", "B", "0", "0"]),
        frame(2, &["A", "1", "6", "B", "1", "5"]),
    ];
    let path = write_file(
        &dir,
        "clips.json",
        &format!(r#"[{{"clip": "c", "frames": [{}]}}]"#, frames.join(", ")),
    );
    let clips = load_clips(&path).unwrap();

    let lenient = score_batch(&clips, TransitionPolicy::Lenient);
    assert_eq!(lenient[0].score_events.len(), 1);
    assert_eq!(lenient[0].score_events[0].kind, TransitionKind::Reset);

    let strict = score_batch(&clips, TransitionPolicy::Strict { match_win_series: 3 });
    assert_eq!(strict[0].score_events.len(), 1);
    assert_eq!(strict[0].score_events[0].to, ScoreTuple::new(1, 6, 1, 5));
}

/// `"O"` is rewritten to `"0"` before any shape rule runs, even where it was
/// a name initial; the canonical team span keeps the digit.
#[test]
fn test_letter_o_substitution_runs_before_shape_rules() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "clips.json",
        &format!(
            r#"[{{"clip": "c", "frames": [{}]}}]"#,
            frame(7, &["O", "KOV", "1", "2", "ZHANG", "LI", "0", "1"])
        ),
    );
    let clips = load_clips(&path).unwrap();
    let frames = raw_frames(&clips[0].frames);
    assert_eq!(frames[0].tokens[0], "0");

    let record = canonicalize(&frames[0].tokens).unwrap();
    assert_eq!(record.team1, "0/KOV");
    assert_eq!(record.team2, "ZHANG/LI");
    assert_eq!(classify(&frames[0].tokens), Some(ScoreTuple::new(1, 2, 0, 1)));
}

/// With a stray `"I"` in the series slot the `"O"` is still rewritten, and the
/// frame is then neither a doubles record nor a score reading.
#[test]
fn test_letter_o_with_stray_initial_is_unusable() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "clips.json",
        &format!(
            r#"[{{"clip": "c", "frames": [{}]}}]"#,
            frame(3, &["O", "KOV", "I", "1", "2", "ZHANG", "0", "1"])
        ),
    );
    let clips = load_clips(&path).unwrap();
    let frames = raw_frames(&clips[0].frames);
    assert_eq!(frames[0].tokens, ["0", "KOV", "I", "1", "2", "ZHANG", "0", "1"]);

    assert_eq!(canonicalize(&frames[0].tokens), None);
    assert_eq!(classify(&frames[0].tokens), None);

    let reports = score_batch(&clips, TransitionPolicy::Lenient);
    assert_eq!(reports[0].frames_total, 1);
    assert_eq!(reports[0].frames_classified, 0);
}
