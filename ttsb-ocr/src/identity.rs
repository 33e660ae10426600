//! Clip-level player identification
//!
//! Every canonical reading near the start of a clip casts a vote for the
//! players it names. A reading votes only if each of its name parts
//! resolves to the roster with at least the vote threshold; its weight is
//! the sum of the part confidences. The heaviest reading names the clip.
//!
//! A part the resolver cascade rejects still counts when its best fuzzy
//! roster candidate reaches the vote threshold, which sits below the
//! cascade's own fallback threshold.

use std::collections::HashSet;
use tracing::{debug, trace, warn};
use ttsb_common::config::TomlConfig;
use ttsb_common::{CanonicalRecord, ClipPlayers};

use crate::canonicalizer::canonicalize;
use crate::frames::RawFrame;
use crate::resolver::{NameMatch, NameResolver, ResolvedName};

/// Voting limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteSettings {
    /// Raw frames considered from the start of the clip
    pub max_frames: usize,
    /// Per-part confidence a reading needs to vote, 0-100
    pub min_confidence: f64,
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for VoteSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            max_frames: config.max_frames_per_clip,
            min_confidence: f64::from(config.matching.span_vote_threshold),
        }
    }
}

/// A reading that qualified to vote
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub record: CanonicalRecord,
    pub names: Vec<NameMatch>,
    pub weight: f64,
}

/// Outcome of voting over one clip
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub players: ClipPlayers,
    /// Distinct canonical readings seen
    pub canonical_records: usize,
    pub winner: Option<Vote>,
}

/// Team fields split into name parts: `"A/B"` gives two parts
pub fn name_parts(record: &CanonicalRecord) -> Vec<&str> {
    record
        .name_spans()
        .into_iter()
        .flat_map(|team| team.split('/').map(str::trim))
        .collect()
}

/// Distinct canonical readings among the first `max_frames` frames
pub fn canonical_records(frames: &[RawFrame], max_frames: usize) -> Vec<CanonicalRecord> {
    let mut seen = HashSet::new();
    frames
        .iter()
        .take(max_frames)
        .filter_map(|frame| canonicalize(&frame.tokens))
        .filter(|record| seen.insert(record.clone()))
        .collect()
}

/// Roster entry a single name part votes for
fn vote_for_part(part: &str, resolver: &NameResolver) -> Option<NameMatch> {
    match resolver.resolve(part) {
        Some(ResolvedName::Single(m)) => Some(m),
        Some(ResolvedName::Doubles(..)) => None,
        None => resolver.best_match(part),
    }
}

/// Resolve every name part of `record`; `None` if any part fails or is weak
pub fn score_record(
    record: &CanonicalRecord,
    resolver: &NameResolver,
    min_confidence: f64,
) -> Option<Vote> {
    let mut names = Vec::new();
    for part in name_parts(record) {
        let m = vote_for_part(part, resolver)?;
        if m.confidence < min_confidence {
            trace!(
                part = %part,
                best = %m.name,
                score = m.confidence,
                "Name part below vote threshold"
            );
            return None;
        }
        names.push(m);
    }

    let weight: f64 = names.iter().map(|m| m.confidence).sum();
    Some(Vote {
        record: record.clone(),
        names,
        weight,
    })
}

/// Name the players of a clip from its raw frames
pub fn identify_players(
    clip: &str,
    frames: &[RawFrame],
    resolver: &NameResolver,
    settings: &VoteSettings,
) -> Identification {
    let records = canonical_records(frames, settings.max_frames);

    let mut winner: Option<Vote> = None;
    for record in &records {
        if let Some(vote) = score_record(record, resolver, settings.min_confidence) {
            if winner.as_ref().map_or(true, |best| vote.weight > best.weight) {
                winner = Some(vote);
            }
        }
    }

    let players = match (&winner, records.first()) {
        (Some(vote), _) => ClipPlayers::from_names(vote.names.iter().map(|m| m.name.clone())),
        (None, Some(first)) => {
            debug!(clip = %clip, "No reading resolved above threshold, keeping raw team names");
            ClipPlayers::from_names(first.team1.split('/').map(str::trim).take(2))
        }
        (None, None) => {
            warn!(clip = %clip, "No canonical frames found");
            ClipPlayers::default()
        }
    };

    Identification {
        players,
        canonical_records: records.len(),
        winner,
    }
}
