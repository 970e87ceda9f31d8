//! Experiment settings, loadable from JSON

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hand::KeyKind;
use crate::sim::{TrialOptions, DEFAULT_PROGRESS_INTERVAL};
use crate::{Error, Result};

/// The full set of recognized experiment settings
///
/// Every (deck size, hand size) pair in the matrix is a cell, and each cell is run for `trials` independent trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {

    /// Deck sizes to test, outer loop
    pub deck_sizes: Vec<u32>,

    /// Hand sizes to test, inner loop
    pub hand_sizes: Vec<u32>,

    /// Number of trials per cell
    pub trials: u32,

    /// Report progress every this many attempts, or never if 0
    pub progress_interval: u64,

    /// Abandon a trial after this many attempts without full coverage
    pub max_attempts: Option<u64>,

    /// How hands are keyed in the coverage set
    pub key: KeyKind,

    /// Randomness seed string for deterministic runs; if not provided, a default-initialized RNG is used
    pub seed: Option<String>,

    /// Where the result log is written
    pub output: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            deck_sizes: vec![24, 28],
            hand_sizes: vec![6, 7],
            trials: 5,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            max_attempts: None,
            key: KeyKind::default(),
            seed: None,
            output: PathBuf::from("unique_hands.csv"),
        }
    }
}

impl ExperimentConfig {

    /// Load settings from a JSON file; fields that are left out keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse { path: path.to_path_buf(), source })
    }

    /// Check the settings that apply to the whole run
    ///
    /// A hand size larger than a deck size is not an error here; that cell is refused when the run reaches it.
    pub fn validate(&self) -> Result<()> {
        if self.deck_sizes.is_empty() {
            return Err(Error::Config("at least one deck size is required".into()));
        }
        if self.hand_sizes.is_empty() {
            return Err(Error::Config("at least one hand size is required".into()));
        }
        if let Some(&zero) = self.deck_sizes.iter().chain(&self.hand_sizes).find(|&&s| s == 0) {
            return Err(Error::Config(format!("deck and hand sizes must be positive, got {}", zero)));
        }
        if self.trials == 0 {
            return Err(Error::Config("at least one trial per cell is required".into()));
        }
        if self.max_attempts == Some(0) {
            return Err(Error::Config("the attempt limit must be positive".into()));
        }
        Ok(())
    }

    /// The per-trial knobs these settings imply
    pub fn trial_options(&self) -> TrialOptions {
        TrialOptions { key: self.key, progress_interval: self.progress_interval, max_attempts: self.max_attempts }
    }

    /// Every (deck size, hand size) cell, in the order they are run
    pub fn cells(&self) -> Vec<(u32, u32)> {
        self.deck_sizes
            .iter()
            .flat_map(|&deck| self.hand_sizes.iter().map(move |&hand| (deck, hand)))
            .collect()
    }
}
