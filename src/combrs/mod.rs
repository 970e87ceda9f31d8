//! Combinatorial counting and encoding utilities, such as binomial coefficients and ranking sets into flattened index spaces
use num::{Integer, PrimInt};

use crate::{Error, Result};

pub mod setspace;

/// Binomial coefficient C(n, k)
pub fn binom<T: PrimInt + Integer>(n: T, k: T) -> T {
    // check out-of-bounds cases, which are considered to be 0
    if k < T::zero() || k > n {
        return T::zero();
    }

    // now, compute it iteratively by multiplying and dividing
    let mut res = T::one();
    let mut i = T::zero();
    while i < k {
        res = res * (n - i) / (i + T::one());
        i = i + T::one();
    }
    res
}

/// The number of distinct hands of `hand` cards that can be dealt from a deck of `deck` cards, i.e. C(deck, hand)
///
/// Unlike [binom], this treats `hand > deck` as an error instead of a count of zero, since it describes a deal that can
/// never happen. The result is exact, and counts which do not fit in a `u64` are refused.
pub fn total_hands(deck: u32, hand: u32) -> Result<u64> {
    if hand > deck {
        return Err(Error::InvalidConfiguration { deck, hand });
    }

    // C(n, k) = C(n, n - k), so only loop over the smaller side
    let r = hand.min(deck - hand) as u128;
    let n = deck as u128;

    // after step i the running value is exactly C(n, i + 1), so the division never truncates, and the values only
    // grow towards the middle of the row so checking each step catches overflow early
    let mut res: u128 = 1;
    for i in 0..r {
        res = res * (n - i) / (i + 1);
        if res > u64::MAX as u128 {
            return Err(Error::TooManyHands { deck, hand });
        }
    }
    Ok(res as u64)
}

// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

// above this many terms, the asymptotic expansion of the harmonic numbers is more accurate than summing
const HARMONIC_EXACT_LIMIT: u64 = 1_000_000;

/// The `n`th harmonic number, H(n) = 1 + 1/2 + ... + 1/n
pub fn harmonic(n: u64) -> f64 {
    if n <= HARMONIC_EXACT_LIMIT {
        // sum smallest terms first, to lose less precision
        (1..=n).rev().map(|i| 1.0 / i as f64).sum()
    } else {
        let n = n as f64;
        n.ln() + EULER_GAMMA + 1.0 / (2.0 * n) - 1.0 / (12.0 * n * n)
    }
}

/// Expected number of uniform draws (with replacement) needed to see all `target` distinct items at least once
///
/// This is the classic coupon-collector expectation, `target * H(target)`, which is roughly `target * ln(target)`.
pub fn expected_draws(target: u64) -> f64 {
    target as f64 * harmonic(target)
}
