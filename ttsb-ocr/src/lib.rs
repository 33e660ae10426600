//! ttsb-ocr library interface
//!
//! Post-processing for table-tennis scoreboard OCR: frame tokens in, player
//! names and validated score changes out.
//!
//! - [`canonicalizer`]: token list → `[team1, s1, r1, team2, s2, r2]`
//! - [`roster`] / [`resolver`]: noisy name spans → roster names
//! - [`classifier`]: token list → score tuple via ordered digit masks
//! - [`transitions`]: score readings → legal score change events
//! - [`identity`] / [`pipeline`]: per-clip voting and batch processing

pub mod canonicalizer;
pub mod classifier;
pub mod clip;
pub mod frames;
pub mod identity;
pub mod pipeline;
pub mod resolver;
pub mod roster;
pub mod transitions;

pub use canonicalizer::canonicalize;
pub use classifier::{classify, classify_frames};
pub use clip::ClipId;
pub use frames::{load_clips, ClipInput, RawFrame};
pub use pipeline::{ClipReport, Pipeline, ScoreReport};
pub use resolver::{NameResolver, ResolvedName};
pub use roster::{build_roster_index, load_roster, RosterIndex};
pub use transitions::{ScoreTransitionValidator, TransitionPolicy};
