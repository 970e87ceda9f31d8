//! Dealing random hands, and reducing them to fixed-width keys for fast coverage tracking

use rand::Rng;
use serde::{Deserialize, Serialize};

use core::fmt;

use crate::Result;

pub mod keys;

pub use keys::{collision_bound, CombinadicKey, HashKey, MaskKey};

/// A fixed-width stand-in for a sorted hand, used as the coverage set key
pub type Fingerprint = u64;

/// A trait describing strategies that reduce a sorted hand to a [Fingerprint]
///
/// Equal hands must always produce equal keys. Whether different hands always produce different keys depends on the
/// strategy, see [KeyKind].
pub trait HandKey {

    /// Short name of the strategy, as accepted on the command line
    fn name(&self) -> &'static str;

    /// Compute the key of a hand, which must be sorted ascending and hold the number of cards this key was built for
    fn key(&self, sorted: &[u32]) -> Fingerprint;
}

/// The available hand key strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {

    /// Rank of the hand in the combinatorial number system; exact for every countable configuration
    #[default]
    Combinadic,

    /// One bit per card; exact, but only for decks of up to 64 cards
    Mask,

    /// 64-bit hash of the card sequence; any deck, but with a (tiny) chance of collisions
    Hash,
}

impl KeyKind {

    /// Build the key strategy for hands of `hand` cards out of a deck of `deck` cards
    pub fn build(self, deck: u32, hand: u32) -> Result<Box<dyn HandKey>> {
        Ok(match self {
            Self::Combinadic => Box::new(CombinadicKey::new(deck, hand)?),
            Self::Mask => Box::new(MaskKey::new(deck)?),
            Self::Hash => Box::new(HashKey::new()),
        })
    }

    /// Whether two different hands are guaranteed to produce different keys
    pub fn is_exact(self) -> bool {
        !matches!(self, Self::Hash)
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combinadic => write!(f, "combinadic"),
            Self::Mask => write!(f, "mask"),
            Self::Hash => write!(f, "hash"),
        }
    }
}

/// Randomly samples a hand of `hand` distinct cards out of `0..deck`, sorted ascending (unordered, without replacement)
///
/// # Panics
///
/// If `hand > deck`, since no such hand exists.
pub fn sample_hand<R: Rng + ?Sized>(deck: u32, hand: u32, rng: &mut R) -> Vec<u32> {
    let mut res = Vec::with_capacity(hand as usize);
    sample_hand_into(deck, hand, rng, &mut res);
    res
}

/// Same as [sample_hand], but reuses the storage of `res`, which is cleared first
pub fn sample_hand_into<R: Rng + ?Sized>(deck: u32, hand: u32, rng: &mut R, res: &mut Vec<u32>) {
    assert!(hand <= deck, "cannot deal {} cards from a deck of {}", hand, deck);
    res.clear();

    // keep drawing until we have `hand` distinct cards; a repeated card is just dropped, and does not count as an attempt
    while res.len() < hand as usize {
        let card = rng.random_range(0..deck);
        if !res.contains(&card) {
            res.push(card);
        }
    }

    // canonical order, so the same set of cards always looks the same no matter the order it was dealt in
    res.sort_unstable();
}
