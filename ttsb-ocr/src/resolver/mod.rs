//! Roster name resolution
//!
//! Maps a noisy OCR name span onto the roster. Singles go through a cascade,
//! first success wins:
//!
//! 1. Exact match
//! 2. Reversed token order ("LAST FIRST" vs "FIRST LAST")
//! 3. Single token whose surname belongs to exactly one roster entry
//! 4. Single token otherwise: fuzzy against the surname's entries (or the
//!    whole roster when the surname is unknown), accepted at the strict
//!    surname threshold
//! 5. Fuzzy against the whole roster at the fallback threshold
//!
//! A span containing `/` is a doubles pair. Both halves resolve as singles
//! and the pair fails if either half does.

pub mod cache;
pub mod fuzzy;
pub mod normalize;

pub use cache::{CacheStats, ResolutionCache};

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use ttsb_common::config::MatchingConfig;

use crate::roster::RosterIndex;

/// Which cascade stage produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Reversed,
    UniqueSurname,
    SurnameFuzzy,
    Fuzzy,
}

/// One roster entry matched for one span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameMatch {
    /// Canonical roster name
    pub name: String,
    /// 100 for exact-style matches, the fuzzy score otherwise
    pub confidence: f64,
    pub strategy: MatchStrategy,
}

/// Successful resolution of a span
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedName {
    Single(NameMatch),
    Doubles(NameMatch, NameMatch),
}

impl ResolvedName {
    /// Matched entries in span order
    pub fn matches(&self) -> Vec<&NameMatch> {
        match self {
            ResolvedName::Single(m) => vec![m],
            ResolvedName::Doubles(a, b) => vec![a, b],
        }
    }
}

impl fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedName::Single(m) => write!(f, "{}", m.name),
            ResolvedName::Doubles(a, b) => write!(f, "{} / {}", a.name, b.name),
        }
    }
}

/// Fuzzy acceptance thresholds, 0-100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub surname: f64,
    pub fallback: f64,
}

impl From<&MatchingConfig> for Thresholds {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            surname: f64::from(config.surname_threshold),
            fallback: f64::from(config.fallback_threshold),
        }
    }
}

/// Cascading matcher over a shared roster, with its own memo
#[derive(Debug)]
pub struct NameResolver {
    roster: Arc<RosterIndex>,
    thresholds: Thresholds,
    cache: ResolutionCache,
}

impl NameResolver {
    pub fn new(roster: Arc<RosterIndex>, config: &MatchingConfig) -> Self {
        Self {
            roster,
            thresholds: Thresholds::from(config),
            cache: ResolutionCache::new(config.cache_capacity),
        }
    }

    pub fn roster(&self) -> &RosterIndex {
        &self.roster
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve a single or doubles span, memoized by the exact span text
    pub fn resolve(&self, span: &str) -> Option<ResolvedName> {
        if let Some(outcome) = self.cache.get(span) {
            return outcome;
        }

        let outcome = if span.contains('/') {
            self.resolve_doubles(span)
        } else {
            self.resolve_single(span).map(ResolvedName::Single)
        };

        debug!(
            span = %span,
            resolved = ?outcome.as_ref().map(ToString::to_string),
            "Resolved name span"
        );
        self.cache.insert(span, outcome.clone());
        outcome
    }

    /// Resolve a `"A/B"` span; all-or-nothing
    ///
    /// Each half goes through [`resolve`](Self::resolve), so halves are
    /// memoized on their own and reused across pairings.
    pub fn resolve_doubles(&self, span: &str) -> Option<ResolvedName> {
        let mut halves = span.split('/').map(str::trim);
        let (first, second) = match (halves.next(), halves.next(), halves.next()) {
            (Some(first), Some(second), None) => (first, second),
            _ => {
                debug!(span = %span, "Doubles span does not have exactly two halves");
                return None;
            }
        };

        let first = self.resolve_half(first)?;
        let second = self.resolve_half(second)?;
        Some(ResolvedName::Doubles(first, second))
    }

    fn resolve_half(&self, half: &str) -> Option<NameMatch> {
        match self.resolve(half)? {
            ResolvedName::Single(m) => Some(m),
            ResolvedName::Doubles(..) => None,
        }
    }

    /// Run the singles cascade, bypassing the memo
    pub fn resolve_single(&self, span: &str) -> Option<NameMatch> {
        let query = normalize::preprocess(span);
        if query.is_empty() {
            return None;
        }
        let roster = &*self.roster;

        if let Some(name) = roster.lookup(&query) {
            return Some(exact(name, MatchStrategy::Exact));
        }

        let tokens: Vec<&str> = query.split(' ').collect();
        if tokens.len() > 1 {
            let reversed: Vec<&str> = tokens.iter().rev().copied().collect();
            if let Some(name) = roster.lookup(&reversed.join(" ")) {
                return Some(exact(name, MatchStrategy::Reversed));
            }
        }

        if let [surname] = tokens.as_slice() {
            let positions = roster.surname_positions(surname);
            if let [only] = positions {
                return Some(exact(roster.name(*only), MatchStrategy::UniqueSurname));
            }

            let best = if positions.is_empty() {
                fuzzy::extract_one(surname, roster.positions().map(|i| (i, roster.key(i))))
            } else {
                fuzzy::extract_one(surname, positions.iter().map(|&i| (i, roster.key(i))))
            };
            if let Some((position, score)) = best {
                if score >= self.thresholds.surname {
                    return Some(fuzzy_match(roster.name(position), score, MatchStrategy::SurnameFuzzy));
                }
            }
        }

        let (position, score) =
            fuzzy::extract_one(&query, roster.positions().map(|i| (i, roster.key(i))))?;
        if score >= self.thresholds.fallback {
            return Some(fuzzy_match(roster.name(position), score, MatchStrategy::Fuzzy));
        }

        debug!(
            query = %query,
            best = %roster.name(position),
            score,
            "No roster entry above fallback threshold"
        );
        None
    }
}

impl NameResolver {
    /// Best whole-roster fuzzy candidate for `span`, with no threshold
    ///
    /// Skips the cascade and the memo. Callers apply their own cutoff.
    pub fn best_match(&self, span: &str) -> Option<NameMatch> {
        let query = normalize::preprocess(span);
        if query.is_empty() {
            return None;
        }
        let roster = &*self.roster;
        let (position, score) =
            fuzzy::extract_one(&query, roster.positions().map(|i| (i, roster.key(i))))?;
        Some(fuzzy_match(roster.name(position), score, MatchStrategy::Fuzzy))
    }
}

fn exact(name: &str, strategy: MatchStrategy) -> NameMatch {
    NameMatch {
        name: name.to_string(),
        confidence: 100.0,
        strategy,
    }
}

fn fuzzy_match(name: &str, score: f64, strategy: MatchStrategy) -> NameMatch {
    NameMatch {
        name: name.to_string(),
        confidence: score,
        strategy,
    }
}
