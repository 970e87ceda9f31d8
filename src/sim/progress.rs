//! Liveness reports emitted while a trial is running

use serde::Serialize;

use core::fmt;

// attempts beyond this multiple of the expected count get flagged as running long
const OVERDUE_RATIO: f64 = 2.0;

/// A snapshot of a running trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {

    /// Hands dealt so far, including repeats
    pub attempts: u64,

    /// Distinct hands seen so far
    pub unique: u64,

    /// Distinct hands that exist, C(deck, hand)
    pub target: u64,

    /// Expected number of attempts for a full trial, see [expected_draws](crate::combrs::expected_draws)
    pub expected: f64,
}

impl Progress {
    /// Coverage so far, as a percentage
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 100.0;
        }
        self.unique as f64 / self.target as f64 * 100.0
    }

    /// Distinct hands still to be seen
    pub fn remaining(&self) -> u64 {
        self.target.saturating_sub(self.unique)
    }

    /// How many times the expected number of attempts have been spent, if that is well beyond the norm
    pub fn overdue(&self) -> Option<f64> {
        let ratio = self.attempts as f64 / self.expected;
        (ratio > OVERDUE_RATIO).then_some(ratio)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coverage {:.2}% | attempts {} | unique {} of {} | {} still needed",
            self.percent(),
            group_thousands(self.attempts),
            group_thousands(self.unique),
            group_thousands(self.target),
            group_thousands(self.remaining()),
        )?;
        if let Some(ratio) = self.overdue() {
            write!(f, " | running long ({:.1}x expected)", ratio)?;
        }
        Ok(())
    }
}

/// Format an integer with a comma between each group of three digits, e.g. `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
