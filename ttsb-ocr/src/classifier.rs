//! Score classifier
//!
//! Reads a [`ScoreTuple`] out of one frame's tokens by testing a fixed,
//! ordered table of positional masks. A mask is a digit pattern over the
//! whole token list plus the four positions holding
//! `(series1, round1, series2, round2)`. The first mask that fits wins.
//!
//! Eight-token readings are first folded to six: OCR tends to split a
//! doubles pair into two name tokens on each side.

use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;
use ttsb_common::models::FrameIndex;
use ttsb_common::ScoreTuple;

use crate::canonicalizer::is_numeric;
use crate::frames::RawFrame;

/// Positional digit mask
///
/// `pattern` has one byte per token: `D` numeric, `N` non-numeric,
/// `?` anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMask {
    pub pattern: &'static str,
    pub fields: [usize; 4],
}

/// Known scoreboard layouts, in priority order
#[rustfmt::skip]
pub const SCORE_MASKS: [ScoreMask; 10] = [
    ScoreMask { pattern: "NDDNDD", fields: [1, 2, 4, 5] },
    ScoreMask { pattern: "NDDDDN", fields: [1, 2, 3, 4] },
    ScoreMask { pattern: "DDNNDD", fields: [0, 1, 4, 5] },
    ScoreMask { pattern: "NNDDNDD", fields: [2, 3, 5, 6] },
    ScoreMask { pattern: "NDDNNDD", fields: [1, 2, 5, 6] },
    ScoreMask { pattern: "NDDNDDN", fields: [1, 2, 4, 5] },
    ScoreMask { pattern: "NNNDDNNDD", fields: [3, 4, 7, 8] },
    ScoreMask { pattern: "NNDDDDN", fields: [2, 3, 4, 5] },
    ScoreMask { pattern: "DDNDDN", fields: [0, 1, 3, 4] },
    ScoreMask { pattern: "?NDDNDD", fields: [2, 3, 5, 6] },
];

impl ScoreMask {
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    fn fits<T: AsRef<str>>(&self, tokens: &[T]) -> bool {
        tokens.len() == self.len()
            && self
                .pattern
                .bytes()
                .zip(tokens)
                .all(|(slot, token)| match slot {
                    b'D' => is_numeric(token.as_ref()),
                    b'N' => !is_numeric(token.as_ref()),
                    _ => true,
                })
    }

    /// Scores under this mask; a field too large for `u32` fails the mask
    pub fn apply<T: AsRef<str>>(&self, tokens: &[T]) -> Option<ScoreTuple> {
        if !self.fits(tokens) {
            return None;
        }
        let [s1, r1, s2, r2] = self.fields.map(|i| tokens[i].as_ref().parse::<u32>().ok());
        Some(ScoreTuple::new(s1?, r1?, s2?, r2?))
    }
}

/// Join `[a, b, s, r, c, d, s, r]` into `["a/b", s, r, "c/d", s, r]`
fn fold_doubles<S: AsRef<str>>(tokens: &[S]) -> Vec<Cow<'_, str>> {
    let t: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    match t.as_slice() {
        [a, b, s1, r1, c, d, s2, r2] => vec![
            Cow::Owned(format!("{}/{}", a, b)),
            Cow::Borrowed(*s1),
            Cow::Borrowed(*r1),
            Cow::Owned(format!("{}/{}", c, d)),
            Cow::Borrowed(*s2),
            Cow::Borrowed(*r2),
        ],
        _ => t.into_iter().map(Cow::Borrowed).collect(),
    }
}

/// Classify one frame's tokens, or `None` when no mask fits
pub fn classify<S: AsRef<str>>(tokens: &[S]) -> Option<ScoreTuple> {
    let folded = fold_doubles(tokens);
    SCORE_MASKS.iter().find_map(|mask| mask.apply(&folded))
}

/// Per-frame classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameOutcome {
    Classified,
    Unclassifiable,
}

/// Classified readings of a clip plus what happened to every frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedFrames {
    /// `(frame_index, score)` in frame order
    pub readings: Vec<(FrameIndex, ScoreTuple)>,
    pub outcomes: Vec<(FrameIndex, FrameOutcome)>,
}

impl ClassifiedFrames {
    pub fn count(&self, outcome: FrameOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Classify a clip's frames; unclassifiable frames are tallied and skipped
pub fn classify_frames(frames: &[RawFrame]) -> ClassifiedFrames {
    let mut classified = ClassifiedFrames::default();
    for frame in frames {
        match classify(&frame.tokens) {
            Some(score) => {
                classified.readings.push((frame.frame_index, score));
                classified
                    .outcomes
                    .push((frame.frame_index, FrameOutcome::Classified));
            }
            None => {
                debug!(frame = frame.frame_index, tokens = ?frame.tokens, "Unclassifiable frame");
                classified
                    .outcomes
                    .push((frame.frame_index, FrameOutcome::Unclassifiable));
            }
        }
    }
    classified
}
