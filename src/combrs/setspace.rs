//! Ranking sets (a.k.a. combinations) into a compact index space, using the combinatorial number system

use crate::combrs::total_hands;
use crate::Result;

/// A helper structure to encode and decode sorted sets of `num_seq` distinct items from `num_uni` into and from the index space `0..C(num_uni, num_seq)`
///
/// The encoding is a bijection, so two sets share an index if and only if they are the same set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSpace {

    /// The number of items to choose from, i.e. the universe of possible single items
    pub num_uni: usize,

    /// The number of items in a particular set within this space, i.e. the number to choose
    pub num_seq: usize,

    /// The number of sets in this space, C(num_uni, num_seq)
    pub num_sets: u64,

    // Pascal's triangle, `pascal[a * (num_seq + 1) + j] = C(a, j)` for `a < num_uni` and `j <= num_seq`
    pascal: Vec<u64>,

}

impl SetSpace {
    /// Create the space of `num_seq`-sets out of `num_uni` items, failing if it is larger than a `u64` can index
    pub fn new(num_uni: u32, num_seq: u32) -> Result<Self> {
        let num_sets = total_hands(num_uni, num_seq)?;
        let (n, k) = (num_uni as usize, num_seq as usize);

        // build the table by additions only; an entry is never smaller than either parent, so every entry whose true
        // value fits in a u64 is exact, and the rest (which no valid set ever reaches) saturate
        let w = k + 1;
        let mut pascal = vec![0u64; n * w];
        for a in 0..n {
            pascal[a * w] = 1;
            for j in 1..=k.min(a) {
                pascal[a * w + j] = pascal[(a - 1) * w + j - 1].saturating_add(pascal[(a - 1) * w + j]);
            }
        }

        Ok(Self { num_uni: n, num_seq: k, num_sets, pascal })
    }

    // C(a, j), for a < num_uni and j <= num_seq
    #[inline]
    fn choose(&self, a: usize, j: usize) -> u64 {
        self.pascal[a * (self.num_seq + 1) + j]
    }

    /// Encode a sorted sequence of distinct items into its single index within this space
    #[inline]
    pub fn enc(&self, seq: &[u32]) -> u64 {
        debug_assert_eq!(seq.len(), self.num_seq, "expected sequence to be complete");
        debug_assert!(seq.windows(2).all(|w| w[0] < w[1]), "expected sequence to be sorted and distinct");

        // the item in position i contributes C(a, i + 1), i.e. the number of sets whose largest i + 1 items are all smaller
        let mut idx = 0u64;
        for (i, &a) in seq.iter().enumerate() {
            idx += self.choose(a as usize, i + 1);
        }
        idx
    }

    /// Decode an index into the sorted sequence of items it represents
    pub fn dec(&self, idx: u64, items: &mut [u32]) {
        assert_eq!(items.len(), self.num_seq, "expected sequence to be complete");
        assert!(idx < self.num_sets, "index {} is out of range for {} sets", idx, self.num_sets);

        let mut idx = idx;

        // start with the largest possible item, and greedily choose the largest item whose chunk still fits into the
        // remaining index, working backwards towards the first position
        let mut a = self.num_uni;
        for pos in (0..self.num_seq).rev() {
            a -= 1;
            while self.choose(a, pos + 1) > idx {
                a -= 1;
            }
            items[pos] = a as u32;
            idx -= self.choose(a, pos + 1);
        }
    }
}
