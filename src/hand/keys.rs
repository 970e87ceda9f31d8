//! The hand key strategies behind [KeyKind](super::KeyKind)

use crate::combrs::setspace::SetSpace;
use crate::hand::{Fingerprint, HandKey};
use crate::{Error, Result};

/// Keys hands by their rank in the combinatorial number system, so keys are exactly `0..C(deck, hand)`
#[derive(Debug, Clone)]
pub struct CombinadicKey {
    space: SetSpace,
}

impl CombinadicKey {
    pub fn new(deck: u32, hand: u32) -> Result<Self> {
        Ok(Self { space: SetSpace::new(deck, hand)? })
    }
}

impl HandKey for CombinadicKey {
    fn name(&self) -> &'static str {
        "combinadic"
    }

    #[inline]
    fn key(&self, sorted: &[u32]) -> Fingerprint {
        self.space.enc(sorted)
    }
}

/// Keys hands by setting one bit per card, the same way a card mask packs a set of cards
#[derive(Debug, Clone, Copy)]
pub struct MaskKey;

impl MaskKey {
    pub const MAX_DECK: u32 = Fingerprint::BITS;

    pub fn new(deck: u32) -> Result<Self> {
        if deck > Self::MAX_DECK {
            return Err(Error::KeyUnsupported { key: "mask", deck, max: Self::MAX_DECK });
        }
        Ok(Self)
    }
}

impl HandKey for MaskKey {
    fn name(&self) -> &'static str {
        "mask"
    }

    #[inline]
    fn key(&self, sorted: &[u32]) -> Fingerprint {
        sorted.iter().fold(0, |bits, &card| bits | (1 << card))
    }
}

// 64-bit FNV-1a parameters
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Keys hands by a 64-bit hash of the card sequence: FNV-1a over the card bytes, then a splitmix64 finalizer
///
/// Works for any deck, at the cost of a small collision chance, see [collision_bound]. A collision makes two hands
/// look like one, so a run would stall waiting for a key that can never appear.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashKey;

impl HashKey {
    pub fn new() -> Self {
        Self
    }
}

impl HandKey for HashKey {
    fn name(&self) -> &'static str {
        "hash"
    }

    #[inline]
    fn key(&self, sorted: &[u32]) -> Fingerprint {
        let mut h = FNV_OFFSET;
        for card in sorted {
            for byte in card.to_le_bytes() {
                h ^= byte as u64;
                h = h.wrapping_mul(FNV_PRIME);
            }
        }

        // FNV alone mixes the last bytes poorly, so finish with splitmix64
        h ^= h >> 30;
        h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        h ^= h >> 27;
        h = h.wrapping_mul(0x94d0_49bb_1331_11eb);
        h ^ (h >> 31)
    }
}

/// Upper bound on the chance that any two of `target` distinct hands share a [HashKey]
///
/// By the birthday bound this is `T * (T - 1) / 2^65` for a 64-bit key, e.g. about 1.8e-7 for the 2,598,960 five card
/// poker hands. [CombinadicKey] and [MaskKey] never collide.
pub fn collision_bound(target: u64) -> f64 {
    if target < 2 {
        return 0.0;
    }
    let t = target as f64;
    (t * (t - 1.0) / 2f64.powi(65)).min(1.0)
}
