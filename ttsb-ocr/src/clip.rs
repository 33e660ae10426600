//! Clip identifiers
//!
//! A clip is named `<video>_<start>_<score>`: the 11-character video hash,
//! the frame the clip starts at, and a free-form score label that may itself
//! contain underscores.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use ttsb_common::{Error, Result};

/// Length of the video hash prefix
pub const VIDEO_HASH_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClipId {
    pub video: String,
    pub start_frame: u64,
    pub score_label: String,
}

impl ClipId {
    pub fn parse(clip: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidInput(format!("Clip id {:?}: {}", clip, reason));

        let video = clip
            .get(..VIDEO_HASH_LEN)
            .ok_or_else(|| invalid("too short for a video hash"))?;
        let rest = clip
            .get(VIDEO_HASH_LEN..)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| invalid("missing '_' after video hash"))?;

        let (start, score_label) = rest.split_once('_').unwrap_or((rest, ""));
        let start_frame = start
            .parse()
            .map_err(|_| invalid("start frame is not a number"))?;

        Ok(Self {
            video: video.to_string(),
            start_frame,
            score_label: score_label.to_string(),
        })
    }
}

impl FromStr for ClipId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.video, self.start_frame)?;
        if !self.score_label.is_empty() {
            write!(f, "_{}", self.score_label)?;
        }
        Ok(())
    }
}
