//! Errors raised while configuring, simulating, and logging experiments

use std::io;
use std::path::PathBuf;

/// Everything that can go wrong in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A hand cannot hold more cards than the deck has
    #[error("invalid configuration: hand size {hand} exceeds deck size {deck}")]
    InvalidConfiguration { deck: u32, hand: u32 },

    /// C(deck, hand) does not fit in a 64-bit count, so it can neither be keyed nor covered
    #[error("invalid configuration: C({deck}, {hand}) does not fit in 64 bits")]
    TooManyHands { deck: u32, hand: u32 },

    /// The selected hand key cannot represent hands from a deck this large
    #[error("the '{key}' hand key supports decks of at most {max} cards, got {deck}")]
    KeyUnsupported { key: &'static str, deck: u32, max: u32 },

    /// The per-trial attempt cap was reached before every hand was seen
    #[error("gave up after {attempts} attempts with {unique} of {target} hands seen")]
    AttemptLimit { attempts: u64, unique: u64, target: u64 },

    /// Settings that are malformed regardless of any particular cell
    #[error("invalid settings: {0}")]
    Config(String),

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse { path: PathBuf, source: serde_json::Error },

    /// Reading or writing an output file failed
    #[error("i/o error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl Error {
    /// Whether this error only disqualifies a single (deck, hand) cell, rather than the whole run
    pub fn is_cell_error(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. } | Self::TooManyHands { .. } | Self::KeyUnsupported { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
