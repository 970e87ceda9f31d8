//! The coverage simulation: deal random hands until every possible hand has been seen
//!
//! A trial owns all of its state (the coverage set, the hand buffer, the key), and takes its random source as an
//! argument, so trials never share anything and can be replayed from a seeded generator.
//!

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combrs::{expected_draws, total_hands};
use crate::hand::{sample_hand_into, Fingerprint, KeyKind};
use crate::{Error, Result};

pub mod progress;

pub use progress::{group_thousands, Progress};

/// How often progress is reported by default, in attempts
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

// don't reserve more than this many keys up front, no matter how many hands there are
const MAX_RESERVE: u64 = 1 << 20;

/// Knobs for a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialOptions {

    /// How hands are keyed in the coverage set
    pub key: KeyKind,

    /// Report progress every this many attempts, or never if 0
    pub progress_interval: u64,

    /// Give up once this many attempts have been made without full coverage
    pub max_attempts: Option<u64>,
}

impl Default for TrialOptions {
    fn default() -> Self {
        Self { key: KeyKind::default(), progress_interval: DEFAULT_PROGRESS_INTERVAL, max_attempts: None }
    }
}

/// The result of a completed trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialOutcome {

    /// Number of distinct hands, C(deck, hand)
    pub target: u64,

    /// Hands dealt before every distinct hand had been seen, counting repeats
    pub attempts: u64,

    /// Distinct hands seen, which is always `target` for a completed trial
    pub unique: u64,
}

/// The set of hand keys seen so far in a trial
#[derive(Debug, Clone)]
pub struct Coverage {
    seen: HashSet<Fingerprint>,
    target: u64,
}

impl Coverage {
    pub fn new(target: u64) -> Self {
        Self { seen: HashSet::with_capacity(target.min(MAX_RESERVE) as usize), target }
    }

    /// Record a key, returning whether it was new
    #[inline]
    pub fn insert(&mut self, key: Fingerprint) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> u64 {
        self.seen.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_complete(&self) -> bool {
        self.len() >= self.target
    }
}

/// Deal random hands of `hand` cards from a deck of `deck` cards until every possible hand has appeared, returning how many deals it took
///
/// The configuration is checked before anything is dealt, so an invalid one never touches `rng`. Every deal counts as
/// an attempt, whether or not its hand was new. `progress` is called every `opts.progress_interval` attempts, and
/// only observes the trial.
pub fn run_trial<R, F>(deck: u32, hand: u32, opts: &TrialOptions, rng: &mut R, mut progress: F) -> Result<TrialOutcome>
where
    R: Rng + ?Sized,
    F: FnMut(&Progress),
{
    let target = total_hands(deck, hand)?;
    let key = opts.key.build(deck, hand)?;
    let expected = expected_draws(target);

    let mut coverage = Coverage::new(target);
    let mut cards = Vec::with_capacity(hand as usize);
    let mut attempts = 0u64;

    while !coverage.is_complete() {
        if let Some(max) = opts.max_attempts {
            if attempts >= max {
                return Err(Error::AttemptLimit { attempts, unique: coverage.len(), target });
            }
        }

        sample_hand_into(deck, hand, rng, &mut cards);
        coverage.insert(key.key(&cards));
        attempts += 1;

        if opts.progress_interval > 0 && attempts % opts.progress_interval == 0 {
            progress(&Progress { attempts, unique: coverage.len(), target, expected });
        }
    }

    Ok(TrialOutcome { target, attempts, unique: coverage.len() })
}
