//! OCR frame dumps and token extraction
//!
//! A clip dump is a JSON array of `{ "clip": ..., "frames": [...] }` objects.
//! Each frame is a triple `[success, frame_index, result]` where `result` is
//! `null`, a sentinel string written by the OCR runner, or a list of
//! detection pages. Only page 0 is read, and from each detection
//! `[bounding_box, [text, confidence]]` only the text is kept.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};
use ttsb_common::models::FrameIndex;
use ttsb_common::Result;

/// Whole-token OCR misreads fixed before any shape classification
///
/// `"O"` becomes `"0"` even where it was a name initial; downstream rules see
/// the digit.
const SUBSTITUTIONS: &[(&str, &str)] = &[("O", "0")];

/// One text detection: bounding box (ignored) and `(text, confidence)`
#[derive(Debug, Clone, Deserialize)]
pub struct Detection(IgnoredAny, pub (String, f64));

impl Detection {
    pub fn text(&self) -> &str {
        &self.1 .0
    }
}

/// OCR output for one frame
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DetectionResult {
    /// Marker written by the OCR runner instead of detections
    Sentinel(String),
    /// Detection pages; page 0 holds the scoreboard text
    Pages(Vec<Option<Vec<Detection>>>),
}

/// One entry of a frame dump
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "(bool, FrameIndex, Option<DetectionResult>)")]
pub struct FrameRecord {
    pub success: bool,
    pub frame_index: FrameIndex,
    pub result: Option<DetectionResult>,
}

impl From<(bool, FrameIndex, Option<DetectionResult>)> for FrameRecord {
    fn from((success, frame_index, result): (bool, FrameIndex, Option<DetectionResult>)) -> Self {
        Self {
            success,
            frame_index,
            result,
        }
    }
}

impl FrameRecord {
    /// Detection texts of page 0, or `None` when the frame carries nothing usable
    pub fn texts(&self) -> Option<Vec<&str>> {
        if !self.success {
            return None;
        }
        match self.result.as_ref()? {
            DetectionResult::Sentinel(_) => None,
            DetectionResult::Pages(pages) => {
                let page = pages.first()?.as_ref()?;
                Some(page.iter().map(Detection::text).collect())
            }
        }
    }
}

/// Frame dump for a single clip
#[derive(Debug, Clone, Deserialize)]
pub struct ClipInput {
    pub clip: String,
    pub frames: Vec<FrameRecord>,
}

/// Token sequence of one usable frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFrame {
    pub frame_index: FrameIndex,
    pub tokens: Vec<String>,
}

/// Apply the substitution table, then drop every `.`
pub fn normalize_token(token: &str) -> String {
    let substituted = SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == token)
        .map_or(token, |(_, to)| *to);
    substituted.replace('.', "")
}

/// Flatten a frame dump into ordered token lists, skipping unusable frames
pub fn raw_frames(frames: &[FrameRecord]) -> Vec<RawFrame> {
    let raw: Vec<RawFrame> = frames
        .iter()
        .filter_map(|frame| {
            let texts = frame.texts()?;
            Some(RawFrame {
                frame_index: frame.frame_index,
                tokens: texts.into_iter().map(normalize_token).collect(),
            })
        })
        .collect();

    debug!(
        total = frames.len(),
        usable = raw.len(),
        "Extracted frame tokens"
    );
    raw
}

/// Load clip dumps from a JSON file
pub fn load_clips(path: &Path) -> Result<Vec<ClipInput>> {
    let file = File::open(path)?;
    let clips: Vec<ClipInput> = serde_json::from_reader(BufReader::new(file))?;
    info!("Loaded {} clip(s) from {}", clips.len(), path.display());
    Ok(clips)
}

/// Token-count histogram entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LengthBucket {
    pub count: usize,
    /// Up to [`EXAMPLES_PER_LENGTH`] `(clip, tokens)` samples
    pub examples: Vec<(String, Vec<String>)>,
}

pub const EXAMPLES_PER_LENGTH: usize = 3;

/// Token-length distribution across clips, for eyeballing new board layouts
pub fn inspect_lengths(clips: &[ClipInput]) -> BTreeMap<usize, LengthBucket> {
    let mut buckets: BTreeMap<usize, LengthBucket> = BTreeMap::new();
    for clip in clips {
        for frame in raw_frames(&clip.frames) {
            let bucket = buckets.entry(frame.tokens.len()).or_default();
            bucket.count += 1;
            if bucket.examples.len() < EXAMPLES_PER_LENGTH {
                bucket.examples.push((clip.clip.clone(), frame.tokens));
            }
        }
    }
    buckets
}
