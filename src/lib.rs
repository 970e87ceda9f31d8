//! Monte Carlo estimates for the generalized coupon-collector problem over card hands.
//!
//! Given a deck of `n` distinguishable cards and a hand size `k`, how many random deals does it take until every one of
//! the C(n, k) possible hands has shown up at least once? This crate answers that by simulation: it samples uniformly
//! random hands, keys them into a coverage set, and counts draws until the set is complete.
//!

pub mod error;
pub mod combrs;
pub mod hand;
pub mod sim;
pub mod runner;
pub mod cli;

pub use error::{Error, Result};

use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use rand_seeder::Seeder;

/// Construct a random number generator from a seed string, or use a default-initialized one if no seed is provided
pub fn rng_from_seed<S: AsRef<[u8]>>(seed: Option<S>) -> Box<dyn RngCore> {
    match seed {
        // with a seed, create a ChaCha20Rng from the seed
        Some(seed) => Box::new(Seeder::from(seed.as_ref()).into_rng::<ChaCha20Rng>()),
        // without a seed, use the default random number generator
        None => Box::new(rand::rng()),
    }
}

/// Construct the generator for a single trial, so that any trial of a seeded run can be replayed on its own
///
/// The seed string is extended with the cell and trial index, which keeps trials independent of each other and of the
/// order in which they were executed.
pub fn rng_for_trial(seed: Option<&str>, deck: u32, hand: u32, trial: u32) -> Box<dyn RngCore> {
    rng_from_seed(seed.map(|seed| format!("{seed}/{deck}/{hand}/{trial}")))
}
