//! # TTSB Common Library
//!
//! Shared code for the table-tennis scoreboard tools:
//! - Error type and result alias
//! - TOML configuration loading and resolution
//! - Scoreboard data model (score tuples, change events, canonical records)

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{CanonicalRecord, ClipPlayers, Player, ScoreChangeEvent, ScoreTuple, TransitionKind};
