// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use crate::range::{Len, Range};

/// A run of lines equal in both sequences: (before start, after start, length).
/// Ordering is by before start first.
#[derive(Debug, Default, Clone, Copy, PartialOrd, PartialEq, Ord, Eq)]
pub struct CommonSubsequence(pub usize, pub usize, pub usize);

impl Len for CommonSubsequence {
    fn len(&self) -> usize {
        self.2
    }
}

impl CommonSubsequence {
    pub fn before_start(&self) -> usize {
        self.0
    }

    pub fn after_start(&self) -> usize {
        self.1
    }

    pub fn before_end(&self) -> usize {
        self.before_start() + self.len()
    }

    pub fn after_end(&self) -> usize {
        self.after_start() + self.len()
    }

    pub fn before_range(&self) -> Range {
        Range(self.before_start(), self.before_end())
    }

    pub fn after_range(&self) -> Range {
        Range(self.after_start(), self.after_end())
    }

    /// Absorb the `increment` lines that directly follow this run
    pub fn incr_size_moving_ends(&mut self, increment: usize) {
        self.2 += increment;
    }

    /// The last `count` (or fewer) lines of the run
    pub fn starts_trimmed(&self, count: usize) -> Self {
        let dropped = self.len().saturating_sub(count);
        Self(self.0 + dropped, self.1 + dropped, self.len() - dropped)
    }

    /// The first `count` (or fewer) lines of the run
    pub fn ends_trimmed(&self, count: usize) -> Self {
        Self(self.0, self.1, count.min(self.len()))
    }

    /// The first and last `count` lines, if the run is long enough that
    /// they do not touch.
    pub fn split(&self, count: usize) -> Option<(Self, Self)> {
        (self.len() > 2 * count).then(|| (self.ends_trimmed(count), self.starts_trimmed(count)))
    }
}

#[cfg(test)]
mod common_subsequence_tests {
    use super::*;

    #[test]
    fn trimming() {
        let run = CommonSubsequence(4, 6, 10);
        assert_eq!(run.starts_trimmed(3), CommonSubsequence(11, 13, 3));
        assert_eq!(run.ends_trimmed(3), CommonSubsequence(4, 6, 3));
        assert_eq!(run.starts_trimmed(20), run);
        assert_eq!(run.before_range(), Range(4, 14));
        assert_eq!(run.after_range(), Range(6, 16));
    }

    #[test]
    fn split() {
        assert_eq!(CommonSubsequence(0, 0, 6).split(3), None);
        assert_eq!(
            CommonSubsequence(0, 2, 7).split(3),
            Some((CommonSubsequence(0, 2, 3), CommonSubsequence(4, 6, 3)))
        );
        assert_eq!(
            CommonSubsequence(1, 1, 2).split(0),
            Some((CommonSubsequence(1, 1, 0), CommonSubsequence(3, 3, 0)))
        );
    }

    #[test]
    fn runs_order_by_before_start() {
        let mut runs = vec![
            CommonSubsequence(7, 2, 1),
            CommonSubsequence(0, 5, 2),
            CommonSubsequence(3, 3, 4),
        ];
        runs.sort();
        assert_eq!(
            runs.iter().map(|r| r.before_start()).collect::<Vec<_>>(),
            vec![0, 3, 7]
        );
    }
}
