//! Token canonicalizer
//!
//! Reshapes one frame's OCR tokens into a [`CanonicalRecord`]
//! `[team1, series1, round1, team2, series2, round2]`.
//!
//! **Algorithm:**
//! 1. Strip everything outside `[A-Za-z0-9/\- ]`, drop empty and lone `-` tokens
//! 2. Dispatch on token count (2, 3, 4, 6, 8) to a fixed shape rule
//! 3. Any other count: slide windows of 8, then 6, then 4 tokens left to right
//!    and return the first window that canonicalizes
//!
//! Numeric-vs-name is decided only by "all digits". Six-token inputs that fit
//! more than one shape resolve by fixed priority (score-first, then spaced
//! names, then generic), even where that mis-buckets a reading.

use tracing::trace;
use ttsb_common::CanonicalRecord;

/// Window sizes tried, in order, when the token count has no direct rule
const RECOVERY_WINDOWS: [usize; 3] = [8, 6, 4];

/// Default for score fields the board layout does not show
const ZERO: &str = "0";

/// True when `token` is non-empty and made only of ASCII digits
pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Strip stray characters and drop tokens that carry nothing
pub fn clean_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .map(|tok| {
            tok.as_ref()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | ' '))
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|tok| !tok.is_empty() && tok != "-")
        .collect()
}

/// Canonicalize one frame's tokens, or `None` when no rule fits
pub fn canonicalize<S: AsRef<str>>(tokens: &[S]) -> Option<CanonicalRecord> {
    let cleaned = clean_tokens(tokens);
    let record = canonicalize_clean(&cleaned);
    trace!(tokens = ?cleaned, matched = record.is_some(), "Canonicalized frame tokens");
    record
}

fn canonicalize_clean(t: &[String]) -> Option<CanonicalRecord> {
    let num = |i: usize| is_numeric(&t[i]);

    match t.len() {
        // Two singles, no scores shown
        2 if !num(0) && !num(1) => Some(record([&t[0], ZERO, ZERO, &t[1], ZERO, ZERO])),
        2 => None,

        // [name, score, name]
        3 if num(1) && !num(0) && !num(2) => {
            Some(record([&t[0], &t[1], ZERO, &t[2], ZERO, ZERO]))
        }
        3 => None,

        // [name, score, name, score]
        4 if num(1) && num(3) => Some(record([&t[0], &t[1], ZERO, &t[2], &t[3], ZERO])),
        4 => None,

        6 => canonicalize_six(t),

        // Doubles: [n0, n1, s1, r1, n2, n3, s2, r2]
        8 if num(2) && num(6) => {
            let team1 = format!("{}/{}", t[0], t[1]);
            let team2 = format!("{}/{}", t[4], t[5]);
            Some(record([&team1, &t[2], &t[3], &team2, &t[6], &t[7]]))
        }
        8 => None,

        _ => recover_window(t),
    }
}

/// Six-token sub-cases, first match wins
fn canonicalize_six(t: &[String]) -> Option<CanonicalRecord> {
    let num = |i: usize| is_numeric(&t[i]);

    // a) leading combined score: [s1, team1, r1, team2, s2, r2]
    if num(0) && num(2) && num(4) {
        return Some(record([&t[1], &t[0], &t[2], &t[3], &t[4], &t[5]]));
    }

    // b) "surname given" names ahead of their scores: [team1, _, s1, team2, _, s2]
    if num(2) && num(5) && t[0].contains(' ') && t[3].contains(' ') {
        return Some(record([&t[0], &t[2], ZERO, &t[3], &t[5], ZERO]));
    }

    // c) generic [team1, s1, r1, team2, s2, r2]
    if num(1) && num(4) {
        return Some(record([&t[0], &t[1], &t[2], &t[3], &t[4], &t[5]]));
    }

    None
}

/// Compensate for inserted or dropped tokens by trying every contiguous window
fn recover_window(t: &[String]) -> Option<CanonicalRecord> {
    for size in RECOVERY_WINDOWS {
        if size > t.len() {
            continue;
        }
        for (offset, window) in t.windows(size).enumerate() {
            if let Some(found) = canonicalize_clean(window) {
                trace!(size, offset, "Recovered record from token window");
                return Some(found);
            }
        }
    }
    None
}

fn record(fields: [&str; 6]) -> CanonicalRecord {
    CanonicalRecord::from_fields(fields.map(str::to_string))
}
