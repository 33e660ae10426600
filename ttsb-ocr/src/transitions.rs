//! Score transition validation
//!
//! Turns a clip's classified readings into a stream of legal score changes.
//! The validator holds the last accepted score and the frame where it was
//! first seen. A reading that differs from it is accepted only if it is a
//! legal next step; anything else is treated as an OCR misread and dropped,
//! and the validator keeps waiting for a reading that is legal from the
//! score it still holds.
//!
//! Legal steps:
//! - one player's round score +1, everything else unchanged (point)
//! - one player's series +1 with both rounds back to 0 (game won)
//! - the board cleared to `(0, 0, 0, 0)` (reset)
//!
//! [`TransitionPolicy::Strict`] additionally requires a player to have
//! reached the match-winning series before a reset is believed.

use tracing::{debug, trace};
use ttsb_common::config::ScoringConfig;
use ttsb_common::models::FrameIndex;
use ttsb_common::{Player, ScoreChangeEvent, ScoreTuple, TransitionKind};

/// Points needed to take a game
pub const GAME_POINTS: u32 = 11;

/// Lead needed to take a game
pub const WIN_MARGIN: u32 = 2;

/// Winner of a game at these points, if it is over
pub fn round_winner(p1: u32, p2: u32) -> Option<Player> {
    if p1 >= GAME_POINTS && p1.saturating_sub(p2) >= WIN_MARGIN {
        Some(Player::One)
    } else if p2 >= GAME_POINTS && p2.saturating_sub(p1) >= WIN_MARGIN {
        Some(Player::Two)
    } else {
        None
    }
}

/// Structural meaning of `prev → next`, ignoring policy
///
/// `None` for identity and for anything that is not a single legal step.
pub fn transition_kind(prev: ScoreTuple, next: ScoreTuple) -> Option<TransitionKind> {
    if prev == next {
        return None;
    }
    if next.is_reset() {
        return Some(TransitionKind::Reset);
    }

    for (player, other) in [(Player::One, Player::Two), (Player::Two, Player::One)] {
        let series_same = next.series(player) == prev.series(player)
            && next.series(other) == prev.series(other);
        if series_same
            && prev.round(player).checked_add(1) == Some(next.round(player))
            && next.round(other) == prev.round(other)
        {
            return Some(TransitionKind::Point { player });
        }

        if prev.series(player).checked_add(1) == Some(next.series(player))
            && next.series(other) == prev.series(other)
            && next.round1 == 0
            && next.round2 == 0
        {
            return Some(TransitionKind::GameWon { player });
        }
    }
    None
}

/// Which transitions the validator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Identity, any reset, points and game wins
    #[default]
    Lenient,
    /// No identity; resets only once either series equals `match_win_series`
    Strict { match_win_series: u32 },
}

impl From<&ScoringConfig> for TransitionPolicy {
    fn from(config: &ScoringConfig) -> Self {
        if config.strict {
            Self::Strict {
                match_win_series: config.match_win_series,
            }
        } else {
            Self::Lenient
        }
    }
}

impl TransitionPolicy {
    /// Legal-transition predicate
    pub fn is_legal(&self, prev: ScoreTuple, next: ScoreTuple) -> bool {
        match *self {
            Self::Lenient => prev == next || transition_kind(prev, next).is_some(),
            Self::Strict { match_win_series } => match transition_kind(prev, next) {
                Some(TransitionKind::Reset) => {
                    prev.series1 == match_win_series || prev.series2 == match_win_series
                }
                Some(_) => true,
                None => false,
            },
        }
    }
}

/// Streaming validator over one clip's readings
#[derive(Debug)]
pub struct ScoreTransitionValidator {
    policy: TransitionPolicy,
    /// `(first frame showing it, score)`
    current: Option<(FrameIndex, ScoreTuple)>,
    discarded: usize,
}

impl ScoreTransitionValidator {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            policy,
            current: None,
            discarded: 0,
        }
    }

    pub fn current_score(&self) -> Option<ScoreTuple> {
        self.current.map(|(_, score)| score)
    }

    /// Readings dropped as illegal so far
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Feed the next reading in frame order
    ///
    /// The first reading only sets the state. Returns the event when the
    /// reading is a legal change.
    pub fn observe(
        &mut self,
        frame_index: FrameIndex,
        score: ScoreTuple,
    ) -> Option<ScoreChangeEvent> {
        let (start, current) = match self.current {
            Some(state) => state,
            None => {
                self.current = Some((frame_index, score));
                return None;
            }
        };

        if score == current {
            return None;
        }

        if !self.policy.is_legal(current, score) {
            self.discarded += 1;
            debug!(
                frame = frame_index,
                from = %current,
                to = %score,
                "Discarded illegal score transition"
            );
            return None;
        }

        // Legal and changed, so the structural kind always exists
        let kind = transition_kind(current, score)?;
        let event = ScoreChangeEvent {
            frames: (start, frame_index),
            from: current,
            to: score,
            kind,
        };
        trace!(frame = frame_index, from = %current, to = %score, "Score change");
        self.current = Some((frame_index, score));
        Some(event)
    }
}

/// Validate a clip's readings and collect the accepted changes
pub fn score_changes(
    readings: &[(FrameIndex, ScoreTuple)],
    policy: TransitionPolicy,
) -> Vec<ScoreChangeEvent> {
    let mut validator = ScoreTransitionValidator::new(policy);
    let events: Vec<ScoreChangeEvent> = readings
        .iter()
        .filter_map(|&(frame_index, score)| validator.observe(frame_index, score))
        .collect();

    debug!(
        readings = readings.len(),
        events = events.len(),
        discarded = validator.discarded(),
        "Validated score transitions"
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(a: u32, b: u32, c: u32, d: u32) -> ScoreTuple {
        ScoreTuple::new(a, b, c, d)
    }

    #[test]
    fn test_round_winner() {
        assert_eq!(round_winner(11, 9), Some(Player::One));
        assert_eq!(round_winner(11, 10), None);
        assert_eq!(round_winner(12, 10), Some(Player::One));
        assert_eq!(round_winner(9, 11), Some(Player::Two));
        assert_eq!(round_winner(10, 10), None);
        assert_eq!(round_winner(0, 0), None);
        assert_eq!(round_winner(u32::MAX, u32::MAX), None);
        assert_eq!(round_winner(u32::MAX, 0), Some(Player::One));
        assert_eq!(round_winner(3, u32::MAX), Some(Player::Two));
    }

    #[test]
    fn test_max_value_readings_do_not_overflow() {
        let huge = s(0, u32::MAX, 0, 0);
        assert_eq!(transition_kind(huge, s(0, 1, 0, 0)), None);
        assert_eq!(transition_kind(s(u32::MAX, 0, 0, 0), s(0, 0, 1, 0)), None);
        assert_eq!(
            transition_kind(s(0, u32::MAX - 1, 0, 0), huge),
            Some(TransitionKind::Point { player: Player::One })
        );

        let events = score_changes(
            &[(0, huge), (1, s(0, 1, 0, 0)), (2, s(0, 0, 0, 0))],
            TransitionPolicy::Lenient,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, TransitionKind::Reset);
        assert_eq!(events[0].frames, (0, 2));
    }

    #[test]
    fn test_transition_kinds() {
        assert_eq!(
            transition_kind(s(0, 0, 0, 0), s(0, 1, 0, 0)),
            Some(TransitionKind::Point { player: Player::One })
        );
        assert_eq!(
            transition_kind(s(1, 4, 0, 7), s(1, 4, 0, 8)),
            Some(TransitionKind::Point { player: Player::Two })
        );
        assert_eq!(
            transition_kind(s(1, 9, 0, 11), s(1, 0, 1, 0)),
            Some(TransitionKind::GameWon { player: Player::Two })
        );
        assert_eq!(transition_kind(s(2, 3, 1, 4), s(0, 0, 0, 0)), Some(TransitionKind::Reset));
        assert_eq!(transition_kind(s(0, 1, 0, 0), s(0, 1, 0, 0)), None);
        assert_eq!(transition_kind(s(0, 1, 0, 0), s(0, 3, 0, 0)), None);
        assert_eq!(transition_kind(s(0, 1, 0, 0), s(0, 2, 0, 1)), None);
        assert_eq!(transition_kind(s(1, 5, 0, 3), s(2, 0, 1, 0)), None);
        assert_eq!(transition_kind(s(1, 5, 0, 3), s(2, 1, 0, 0)), None);
    }

    #[test]
    fn test_illegal_jump_is_discarded() {
        let events = score_changes(
            &[
                (0, s(0, 0, 0, 0)),
                (5, s(0, 1, 0, 0)),
                (9, s(0, 5, 0, 0)),
                (12, s(0, 2, 0, 0)),
            ],
            TransitionPolicy::Lenient,
        );

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].frames, (0, 5));
        assert_eq!(events[0].from, s(0, 0, 0, 0));
        assert_eq!(events[0].to, s(0, 1, 0, 0));
        assert_eq!(events[1].frames, (5, 12));
        assert_eq!(events[1].from, s(0, 1, 0, 0));
        assert_eq!(events[1].to, s(0, 2, 0, 0));
    }

    #[test]
    fn test_discard_keeps_state() {
        let mut validator = ScoreTransitionValidator::new(TransitionPolicy::Lenient);
        assert_eq!(validator.observe(0, s(0, 1, 0, 0)), None);
        assert_eq!(validator.observe(1, s(0, 5, 0, 0)), None);
        assert_eq!(validator.current_score(), Some(s(0, 1, 0, 0)));
        assert_eq!(validator.discarded(), 1);
    }

    #[test]
    fn test_unchanged_readings_extend_interval() {
        let events = score_changes(
            &[(3, s(0, 0, 0, 0)), (4, s(0, 0, 0, 0)), (8, s(0, 0, 0, 0)), (9, s(0, 0, 0, 1))],
            TransitionPolicy::Lenient,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].frames, (3, 9));
        assert_eq!(events[0].kind, TransitionKind::Point { player: Player::Two });
    }

    #[test]
    fn test_game_point_both_ways() {
        let policy = TransitionPolicy::Lenient;
        assert!(policy.is_legal(s(0, 10, 0, 9), s(1, 0, 0, 0)));
        assert!(policy.is_legal(s(0, 10, 0, 9), s(0, 11, 0, 9)));
        assert!(!policy.is_legal(s(0, 10, 0, 9), s(1, 0, 1, 0)));
    }

    #[test]
    fn test_lenient_accepts_identity_and_any_reset() {
        let policy = TransitionPolicy::Lenient;
        assert!(policy.is_legal(s(1, 3, 1, 3), s(1, 3, 1, 3)));
        assert!(policy.is_legal(s(1, 3, 1, 3), s(0, 0, 0, 0)));
    }

    #[test]
    fn test_strict_resets_only_after_match_won() {
        let policy = TransitionPolicy::Strict { match_win_series: 3 };
        assert!(!policy.is_legal(s(1, 3, 1, 3), s(1, 3, 1, 3)));
        assert!(!policy.is_legal(s(1, 3, 1, 3), s(0, 0, 0, 0)));
        assert!(policy.is_legal(s(3, 0, 1, 0), s(0, 0, 0, 0)));
        assert!(policy.is_legal(s(2, 0, 3, 0), s(0, 0, 0, 0)));
        assert!(policy.is_legal(s(1, 3, 1, 3), s(1, 4, 1, 3)));

        let events = score_changes(
            &[(0, s(1, 3, 1, 3)), (1, s(0, 0, 0, 0)), (2, s(1, 4, 1, 3))],
            policy,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].frames, (0, 2));
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = ScoringConfig::default();
        assert_eq!(TransitionPolicy::from(&config), TransitionPolicy::Lenient);

        config.strict = true;
        config.match_win_series = 4;
        assert_eq!(
            TransitionPolicy::from(&config),
            TransitionPolicy::Strict { match_win_series: 4 }
        );
    }

    #[test]
    fn test_no_readings_no_events() {
        assert!(score_changes(&[], TransitionPolicy::Lenient).is_empty());
        assert!(score_changes(&[(7, s(0, 0, 0, 0))], TransitionPolicy::Lenient).is_empty());
    }
}
