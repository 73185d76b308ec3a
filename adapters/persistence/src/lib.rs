#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Storage adapters for the best-score table.
//!
//! The table is stored as a single JSON record keyed by difficulty name, for
//! example `{"easy":34,"medium":0,"hard":50}`. Decoding is lenient: a record
//! that is not JSON at all is reported as
//! [`StoreError::CorruptPersistedState`], while individual entries that are
//! missing or hold anything other than a positive number are skipped and the
//! corresponding difficulty keeps a best of zero.

use std::{fs, io, path::PathBuf};

use reflex_arcade_core::{BestScores, Difficulty};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// File name used when no explicit best-score path is configured.
pub const DEFAULT_FILE_NAME: &str = "reflex-arcade-best-scores.json";

/// Errors raised while reading or writing the best-score record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("failed to access best-score record at {path}")]
    Io {
        /// Location of the backing file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stored record is not valid JSON.
    #[error("persisted best-score record is corrupt")]
    CorruptPersistedState(#[source] serde_json::Error),
    /// The table could not be serialised.
    #[error("failed to encode best-score record")]
    Encode(#[source] serde_json::Error),
}

/// Backing store for the best-score table.
pub trait BestScoreStore {
    /// Reads the stored table; a store with no record yields an empty table.
    fn load(&self) -> Result<BestScores, StoreError>;

    /// Replaces the stored table.
    fn save(&mut self, scores: &BestScores) -> Result<(), StoreError>;
}

/// Decodes a raw best-score record, skipping entries that are not usable.
pub fn decode_best_scores(raw: &str) -> Result<BestScores, StoreError> {
    let parsed: Value = serde_json::from_str(raw).map_err(StoreError::CorruptPersistedState)?;

    let mut scores = BestScores::default();
    for difficulty in Difficulty::ALL {
        let entry = parsed.get(difficulty.key());
        match entry.and_then(score_from_value) {
            Some(score) => {
                let _ = scores.reconcile(difficulty, score);
            }
            None => {
                if let Some(value) = entry {
                    debug!(%difficulty, %value, "ignoring unusable best-score entry");
                }
            }
        }
    }
    Ok(scores)
}

/// Encodes the table as a JSON record.
pub fn encode_best_scores(scores: &BestScores) -> Result<String, StoreError> {
    serde_json::to_string(scores).map_err(StoreError::Encode)
}

fn score_from_value(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() || number <= 0.0 {
        return None;
    }
    Some(number.min(f64::from(u32::MAX)) as u32)
}

/// Store that keeps the record in a JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> Result<BestScores, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BestScores::default()),
            Ok(raw) => decode_best_scores(&raw),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BestScores::default()),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn save(&mut self, scores: &BestScores) -> Result<(), StoreError> {
        let encoded = encode_best_scores(scores)?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }
        fs::write(&self.path, encoded).map_err(|error| self.io_error(error))
    }
}

/// Store that keeps the raw record in memory, like a browser storage slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose slot already holds `raw`.
    #[must_use]
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }

    /// Raw record currently held by the store.
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> Result<BestScores, StoreError> {
        match self.slot.as_deref() {
            Some(raw) if !raw.trim().is_empty() => decode_best_scores(raw),
            _ => Ok(BestScores::default()),
        }
    }

    fn save(&mut self, scores: &BestScores) -> Result<(), StoreError> {
        self.slot = Some(encode_best_scores(scores)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_record() {
        let scores = decode_best_scores(r#"{"easy":34,"medium":12,"hard":50}"#).expect("valid");
        assert_eq!(scores, BestScores::new(34, 12, 50));
    }

    #[test]
    fn invalid_entries_are_ignored() {
        let scores =
            decode_best_scores(r#"{"easy":"41","medium":-3,"hard":{"nested":true},"extra":9}"#)
                .expect("valid json");
        assert_eq!(scores, BestScores::new(41, 0, 0));
    }

    #[test]
    fn fractional_entries_are_truncated() {
        let scores = decode_best_scores(r#"{"hard":12.9}"#).expect("valid json");
        assert_eq!(scores.get(Difficulty::Hard), 12);
    }

    #[test]
    fn non_object_json_yields_empty_table() {
        assert_eq!(decode_best_scores("[1,2,3]").expect("valid json"), BestScores::default());
        assert_eq!(decode_best_scores("null").expect("valid json"), BestScores::default());
    }

    #[test]
    fn garbage_is_reported_as_corrupt() {
        let error = decode_best_scores("{not json").expect_err("corrupt");
        assert!(matches!(error, StoreError::CorruptPersistedState(_)));
    }

    #[test]
    fn memory_store_keeps_encoded_record() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().expect("empty"), BestScores::default());

        store.save(&BestScores::new(1, 2, 3)).expect("save");
        assert_eq!(store.contents(), Some(r#"{"easy":1,"medium":2,"hard":3}"#));
        assert_eq!(store.load().expect("load"), BestScores::new(1, 2, 3));
    }
}
