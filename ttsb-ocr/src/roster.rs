//! Player roster and surname index
//!
//! The roster is built once per run with [`build_roster_index`] and shared
//! read-only by every resolution. Duplicate names collapse to their first
//! occurrence, so the surname index always points at distinct full names.
//!
//! Each entry has two spellings: the canonical name returned to callers, and
//! a match key with hyphens turned into spaces. Queries are normalized the
//! same way, so `"LIN YUN-JU"` on the roster is an exact hit for `"Lin Yun Ju"`.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};
use ttsb_common::{Error, Result};

/// Uppercase and collapse internal whitespace
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spelling used for comparisons: normalized, hyphens as spaces
pub fn match_key(name: &str) -> String {
    normalize_name(&name.replace('-', " "))
}

/// Immutable roster plus surname → candidates index
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    names: Vec<String>,
    keys: Vec<String>,
    seen: HashSet<String>,
    by_key: HashMap<String, usize>,
    by_surname: HashMap<String, Vec<usize>>,
}

/// Build the roster index from player names
///
/// Names are normalized on the way in; blanks are skipped.
pub fn build_roster_index<I, S>(names: I) -> RosterIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index = RosterIndex::default();
    let mut duplicates = 0usize;

    for raw in names {
        let name = normalize_name(raw.as_ref());
        if name.is_empty() {
            continue;
        }
        if !index.seen.insert(name.clone()) {
            duplicates += 1;
            continue;
        }

        let position = index.names.len();
        let key = match_key(&name);
        index.by_key.entry(key.clone()).or_insert(position);
        if let Some(surname) = key.split(' ').last() {
            index
                .by_surname
                .entry(surname.to_string())
                .or_default()
                .push(position);
        }
        index.names.push(name);
        index.keys.push(key);
    }

    debug!(
        players = index.names.len(),
        surnames = index.by_surname.len(),
        duplicates,
        "Built roster index"
    );
    index
}

impl RosterIndex {
    /// All distinct names in first-seen order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Positions of every entry
    pub fn positions(&self) -> Range<usize> {
        0..self.names.len()
    }

    /// Canonical name at `position`
    pub fn name(&self, position: usize) -> &str {
        &self.names[position]
    }

    /// Match key at `position`
    pub fn key(&self, position: usize) -> &str {
        &self.keys[position]
    }

    /// Canonical name whose match key equals `key`
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(|&i| self.name(i))
    }

    /// Positions of distinct entries whose last key token is `surname`
    pub fn surname_positions(&self, surname: &str) -> &[usize] {
        self.by_surname
            .get(surname)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Canonical names sharing `surname`, in roster order
    pub fn by_surname(&self, surname: &str) -> Vec<&str> {
        self.surname_positions(surname)
            .iter()
            .map(|&i| self.name(i))
            .collect()
    }
}

/// Read a roster file: one name per record, first field only, no header
///
/// A file without a single name is [`Error::NotFound`].
pub fn load_roster(path: &Path) -> Result<RosterIndex> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(first) = record.get(0) {
            names.push(first.to_string());
        }
    }

    let index = build_roster_index(&names);
    if index.is_empty() {
        return Err(Error::NotFound(format!(
            "No player names in roster {}",
            path.display()
        )));
    }
    info!(
        "Loaded roster from {}: {} players",
        path.display(),
        index.len()
    );
    Ok(index)
}
