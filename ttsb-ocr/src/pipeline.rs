//! Clip processing pipeline
//!
//! Per clip: extract frame tokens, name the players from the opening
//! frames, classify every frame's score and validate the score changes.
//! Clips are independent, so batches run on the rayon pool; the only shared
//! state is the read-only roster and the resolver's concurrent memo.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use ttsb_common::config::TomlConfig;
use ttsb_common::{ClipPlayers, ScoreChangeEvent};

use crate::classifier::{classify_frames, FrameOutcome};
use crate::clip::ClipId;
use crate::frames::{raw_frames, ClipInput, RawFrame};
use crate::identity::{identify_players, VoteSettings};
use crate::resolver::NameResolver;
use crate::roster::RosterIndex;
use crate::transitions::{score_changes, TransitionPolicy};

/// Score events of one clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub clip: String,
    pub score_events: Vec<ScoreChangeEvent>,
    /// Frame records in the dump, usable or not
    pub frames_total: usize,
    pub frames_classified: usize,
}

/// Everything extracted from one clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipReport {
    pub clip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<ClipId>,
    pub players: ClipPlayers,
    pub score_events: Vec<ScoreChangeEvent>,
    pub frames_total: usize,
    pub frames_classified: usize,
    /// Distinct canonical readings used for identification
    pub frames_canonical: usize,
}

fn score_frames(
    clip: &ClipInput,
    frames: &[RawFrame],
    policy: TransitionPolicy,
) -> ScoreReport {
    let classified = classify_frames(frames);
    let score_events = score_changes(&classified.readings, policy);
    ScoreReport {
        clip: clip.clip.clone(),
        score_events,
        frames_total: clip.frames.len(),
        frames_classified: classified.count(FrameOutcome::Classified),
    }
}

/// Classify and validate the scores of one clip; needs no roster
pub fn score_clip(clip: &ClipInput, policy: TransitionPolicy) -> ScoreReport {
    score_frames(clip, &raw_frames(&clip.frames), policy)
}

/// [`score_clip`] over a batch, in parallel; output order matches input
pub fn score_batch(clips: &[ClipInput], policy: TransitionPolicy) -> Vec<ScoreReport> {
    clips.par_iter().map(|clip| score_clip(clip, policy)).collect()
}

/// Shared resolver plus per-run settings
#[derive(Debug)]
pub struct Pipeline {
    resolver: NameResolver,
    votes: VoteSettings,
    policy: TransitionPolicy,
}

impl Pipeline {
    pub fn new(roster: Arc<RosterIndex>, config: &TomlConfig) -> Self {
        Self {
            resolver: NameResolver::new(roster, &config.matching),
            votes: VoteSettings::from(config),
            policy: TransitionPolicy::from(&config.scoring),
        }
    }

    /// Override the transition policy from config
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn process_clip(&self, clip: &ClipInput) -> ClipReport {
        let clip_id = match ClipId::parse(&clip.clip) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!("{}", e);
                None
            }
        };

        let frames = raw_frames(&clip.frames);
        let identification = identify_players(&clip.clip, &frames, &self.resolver, &self.votes);
        let scores = score_frames(clip, &frames, self.policy);

        debug!(
            clip = %clip.clip,
            players = ?identification.players.slots(),
            events = scores.score_events.len(),
            "Processed clip"
        );

        ClipReport {
            clip: scores.clip,
            clip_id,
            players: identification.players,
            score_events: scores.score_events,
            frames_total: scores.frames_total,
            frames_classified: scores.frames_classified,
            frames_canonical: identification.canonical_records,
        }
    }

    /// [`process_clip`](Self::process_clip) over a batch, in parallel;
    /// output order matches input
    pub fn process_batch(&self, clips: &[ClipInput]) -> Vec<ClipReport> {
        let reports: Vec<ClipReport> = clips
            .par_iter()
            .map(|clip| self.process_clip(clip))
            .collect();

        let stats = self.resolver.cache().stats();
        info!(
            "Processed {} clip(s): {} identified, resolver cache {} entries ({} hits, {} misses)",
            reports.len(),
            reports.iter().filter(|r| !r.players.is_empty()).count(),
            stats.entries,
            stats.hits,
            stats.misses
        );
        reports
    }
}
