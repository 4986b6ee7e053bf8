//! A compact set of picked values plus the sequence helpers used by the
//! session: availability, order-sensitive equality and winning-line search.
//!
//! The set is `no_std` friendly and never allocates. Bit `v` stands for the
//! value `v`, so only bits `CHOICE_MIN..=CHOICE_MAX` are ever set.

use core::fmt;

use crate::common::{Choice, Triple, EMPTY_TRIPLE};
use crate::config::{CHOICE_MAX, CHOICE_MIN, TARGET_SUM};

/// Set of choices packed into a `u16`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChoiceSet {
    bits: u16,
}

impl ChoiceSet {
    #[inline]
    fn mask() -> u16 {
        let mut bits = 0u16;
        let mut v = CHOICE_MIN;
        while v <= CHOICE_MAX {
            bits |= 1 << v;
            v += 1;
        }
        bits
    }

    /// Empty set.
    pub const fn new() -> Self {
        ChoiceSet { bits: 0 }
    }

    /// Every playable value.
    pub fn full() -> Self {
        ChoiceSet { bits: Self::mask() }
    }

    /// Collect a set from any iterator of choices. Duplicates collapse.
    pub fn from_choices<'a, I>(choices: I) -> Self
    where
        I: IntoIterator<Item = &'a Choice>,
    {
        let mut set = Self::new();
        for c in choices {
            set.insert(*c);
        }
        set
    }

    /// Adds `choice`, returning `false` if it was already present.
    pub fn insert(&mut self, choice: Choice) -> bool {
        let bit = 1u16 << choice.get();
        let fresh = self.bits & bit == 0;
        self.bits |= bit;
        fresh
    }

    pub fn contains(&self, choice: Choice) -> bool {
        self.bits & (1u16 << choice.get()) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn union(self, other: Self) -> Self {
        ChoiceSet {
            bits: self.bits | other.bits,
        }
    }

    /// Values of the playable range missing from this set.
    pub fn complement(self) -> Self {
        ChoiceSet {
            bits: !self.bits & Self::mask(),
        }
    }

    /// Iterate members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        (CHOICE_MIN..=CHOICE_MAX)
            .filter(move |v| self.bits & (1u16 << v) != 0)
            .filter_map(|v| Choice::new(v).ok())
    }
}

impl fmt::Debug for ChoiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Choice::get)).finish()
    }
}

/// Values still free once both sides' picks are removed.
pub fn available_choices(local: &[Choice], remote: &[Choice]) -> ChoiceSet {
    ChoiceSet::from_choices(local)
        .union(ChoiceSet::from_choices(remote))
        .complement()
}

/// Same length and same value at every index.
pub fn sequences_equal(a: &[Choice], b: &[Choice]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// First `(i, j, k)` with `i < j < k`, in index order, whose values add up
/// to `TARGET_SUM`. Returns the empty triple when no such line exists.
pub fn winning_triple(seq: &[Choice]) -> Triple {
    let n = seq.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                let sum = seq[i].get() + seq[j].get() + seq[k].get();
                if sum == TARGET_SUM {
                    return [Some(seq[i]), Some(seq[j]), Some(seq[k])];
                }
            }
        }
    }
    EMPTY_TRIPLE
}

/// True if some three of `seq` complete a line.
pub fn has_winning_triple(seq: &[Choice]) -> bool {
    winning_triple(seq) != EMPTY_TRIPLE
}
