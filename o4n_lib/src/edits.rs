// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::collections::HashMap;
use std::iter::Peekable;
use std::ops::Deref;
use std::slice;

use rayon::prelude::ParallelSliceMut;

use crate::common_subsequence::CommonSubsequence;
use crate::lines::{LineIndices, Lines};
use crate::range::{Len, Range};

/// One step of the script that turns the "before" lines into the "after"
/// lines.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Edit {
    Keep(CommonSubsequence),
    /// Lines dropped from before, and where that is in after
    Remove(Range, usize),
    /// Where in before, and the lines taken from after
    Add(usize, Range),
    Change(Range, Range),
}

impl Edit {
    pub fn before_range(&self) -> Range {
        match self {
            Self::Keep(run) => run.before_range(),
            Self::Remove(range, _) | Self::Change(range, _) => *range,
            Self::Add(position, _) => Range(*position, *position),
        }
    }

    pub fn after_range(&self) -> Range {
        match self {
            Self::Keep(run) => run.after_range(),
            Self::Add(_, range) | Self::Change(_, range) => *range,
            Self::Remove(_, position) => Range(*position, *position),
        }
    }
}

fn gap_edit(before: Range, after: Range) -> Option<Edit> {
    match (before.is_empty(), after.is_empty()) {
        (false, false) => Some(Edit::Change(before, after)),
        (false, true) => Some(Edit::Remove(before, after.start())),
        (true, false) => Some(Edit::Add(before.start(), after)),
        (true, true) => None,
    }
}

/// Finds the runs of lines common to two sequences
#[derive(Debug)]
pub struct RunFinder<'a> {
    before: &'a Lines,
    after: &'a Lines,
    after_index: LineIndices,
}

impl<'a> RunFinder<'a> {
    pub fn new(before: &'a Lines, after: &'a Lines) -> Self {
        let mut after_index = after.generate_content_indices();
        let dropped = after_index.drop_popular(after.len());
        if dropped > 0 {
            log::trace!("{dropped} popular lines are not used as anchors");
        }
        Self {
            before,
            after,
            after_index,
        }
    }

    /// The longest run of equal lines within the given ranges. Of equally
    /// long runs the one starting first in before wins, then the one
    /// starting first in after. Popular lines only join a run by extending
    /// it at either end.
    ///
    /// Example:
    /// ```
    /// use o4n_lib::lines::Lines;
    /// use o4n_lib::edits::RunFinder;
    /// use o4n_lib::common_subsequence::CommonSubsequence;
    /// let before = Lines::from("A\nB\nC\nD\nE\nF\nG\nH\nI\nJ\n");
    /// let after = Lines::from("X\nY\nZ\nC\nD\nE\nH\nI\nX\n");
    /// let finder = RunFinder::new(&before, &after);
    /// assert_eq!(
    ///     finder.longest_run(before.range_from(0), after.range_from(0)),
    ///     Some(CommonSubsequence(2, 3, 3))
    /// );
    /// ```
    pub fn longest_run(&self, before: Range, after: Range) -> Option<CommonSubsequence> {
        let (mut i, mut j, mut len) = (before.start(), after.start(), 0);
        // after index -> length of the run ending there and at the previous before line
        let mut run_ends = HashMap::<usize, usize>::new();
        for (before_index, line) in (before.start()..).zip(self.before.subsequence(before)) {
            let mut next_run_ends = HashMap::<usize, usize>::new();
            let candidates = self.after_index.indices(line).into_iter().flatten();
            for &after_index in candidates.skip_while(|&&k| k < after.start()) {
                if after_index >= after.end() {
                    break;
                }
                let run_len = after_index
                    .checked_sub(1)
                    .and_then(|prev| run_ends.get(&prev))
                    .map_or(1, |run_len| run_len + 1);
                next_run_ends.insert(after_index, run_len);
                if run_len > len {
                    (i, j, len) = (before_index + 1 - run_len, after_index + 1 - run_len, run_len);
                }
            }
            run_ends = next_run_ends;
        }
        while i > before.start() && j > after.start() && self.before[i - 1] == self.after[j - 1] {
            (i, j, len) = (i - 1, j - 1, len + 1);
        }
        while i + len < before.end()
            && j + len < after.end()
            && self.before[i + len] == self.after[j + len]
        {
            len += 1;
        }
        (len > 0).then_some(CommonSubsequence(i, j, len))
    }

    /// All common runs in order, with adjacent runs merged
    pub fn common_runs(&self) -> Vec<CommonSubsequence> {
        let mut pending = vec![(self.before.range_from(0), self.after.range_from(0))];
        let mut runs = vec![];
        while let Some((before, after)) = pending.pop() {
            let Some(run) = self.longest_run(before, after) else {
                continue;
            };
            if before.start() < run.before_start() && after.start() < run.after_start() {
                pending.push((
                    Range(before.start(), run.before_start()),
                    Range(after.start(), run.after_start()),
                ));
            }
            if run.before_end() < before.end() && run.after_end() < after.end() {
                pending.push((
                    Range(run.before_end(), before.end()),
                    Range(run.after_end(), after.end()),
                ));
            }
            runs.push(run);
        }
        runs.par_sort();

        let mut merged: Vec<CommonSubsequence> = Vec::with_capacity(runs.len());
        for run in runs {
            if let Some(last) = merged.last_mut() {
                if last.before_end() == run.before_start() && last.after_end() == run.after_start() {
                    last.incr_size_moving_ends(run.len());
                    continue;
                }
            }
            merged.push(run);
        }
        merged
    }

    /// Example:
    /// ```
    /// use o4n_lib::range::Range;
    /// use o4n_lib::lines::Lines;
    /// use o4n_lib::common_subsequence::CommonSubsequence;
    /// use o4n_lib::edits::RunFinder;
    /// use o4n_lib::edits::Edit::*;
    ///
    /// let before = Lines::from("A\nB\nC\nD\nE\nF\nG\nH\nI\nJ\nK\nL\nM\n");
    /// let after = Lines::from("A\nC\nD\nEf\nFg\nG\nH\nI\nJ\nK\nH\nL\nM\n");
    /// assert_eq!(
    ///     RunFinder::new(&before, &after).edits(),
    ///     vec![
    ///         Keep(CommonSubsequence(0, 0, 1)), Remove(Range(1, 2), 1),
    ///         Keep(CommonSubsequence(2, 1, 2)), Change(Range(4, 6), Range(3, 5)),
    ///         Keep(CommonSubsequence(6, 5, 5)), Add(11, Range(10, 11)),
    ///         Keep(CommonSubsequence(11, 11, 2))
    ///     ]
    /// );
    /// ```
    pub fn edits(&self) -> Vec<Edit> {
        let mut edits = vec![];
        let (mut i, mut j) = (0, 0);
        for run in self.common_runs() {
            edits.extend(gap_edit(
                Range(i, run.before_start()),
                Range(j, run.after_start()),
            ));
            edits.push(Edit::Keep(run));
            (i, j) = (run.before_end(), run.after_end());
        }
        edits.extend(gap_edit(
            self.before.range_from(i),
            self.after.range_from(j),
        ));
        edits
    }
}

/// The edits between two sets of lines
#[derive(Debug, Default)]
pub struct EditScript {
    before: Lines,
    after: Lines,
    edits: Vec<Edit>,
}

impl EditScript {
    pub fn new(before: Lines, after: Lines) -> Self {
        let edits = RunFinder::new(&before, &after).edits();
        log::trace!("{} edits", edits.len());
        Self {
            before,
            after,
            edits,
        }
    }

    pub fn before(&self) -> &Lines {
        &self.before
    }

    pub fn after(&self) -> &Lines {
        &self.after
    }

    pub fn is_unchanged(&self) -> bool {
        self.edits.iter().all(|edit| matches!(edit, Edit::Keep(_)))
    }

    /// Group the changes into hunks with (up to) `context` unchanged lines
    /// either side. Changes separated by more than `2 * context` unchanged
    /// lines go in different hunks.
    ///
    /// Example:
    /// ```
    /// use o4n_lib::common_subsequence::CommonSubsequence;
    /// use o4n_lib::lines::Lines;
    /// use o4n_lib::edits::{EditScript, Hunk, Edit::*};
    /// use o4n_lib::range::Range;
    ///
    /// let before = "A\nB\nC\nD\nE\nF\nG\nH\nI\nJ\nK\nL\nM\n";
    /// let after = "A\nC\nD\nEf\nFg\nG\nH\nI\nJ\nK\nH\nL\nM\n";
    /// let script = EditScript::new(Lines::from(before), Lines::from(after));
    /// let hunks: Vec<_> = script.hunks(2).collect();
    /// assert_eq!(
    ///     hunks,
    ///     vec![
    ///         Hunk(vec![
    ///             Keep(CommonSubsequence(0, 0, 1)),
    ///             Remove(Range(1, 2), 1),
    ///             Keep(CommonSubsequence(2, 1, 2)),
    ///             Change(Range(4, 6), Range(3, 5)),
    ///             Keep(CommonSubsequence(6, 5, 2))
    ///         ]),
    ///         Hunk(vec![
    ///             Keep(CommonSubsequence(9, 8, 2)),
    ///             Add(11, Range(10, 11)),
    ///             Keep(CommonSubsequence(11, 11, 2))
    ///         ]),
    ///     ]
    /// );
    /// ```
    pub fn hunks(&self, context: usize) -> Hunks<'_> {
        Hunks {
            edits: self.edits.iter().peekable(),
            context,
            leading: None,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Hunk(pub Vec<Edit>);

impl Deref for Hunk {
    type Target = [Edit];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Hunk {
    fn push_keep(&mut self, run: CommonSubsequence) {
        if !run.is_empty() {
            self.0.push(Edit::Keep(run))
        }
    }

    /// The before and after ranges covered by this hunk
    pub fn ranges(&self) -> (Range, Range) {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => (
                Range(first.before_range().start(), last.before_range().end()),
                Range(first.after_range().start(), last.after_range().end()),
            ),
            _ => (Range::default(), Range::default()),
        }
    }
}

pub struct Hunks<'a> {
    edits: Peekable<slice::Iter<'a, Edit>>,
    context: usize,
    leading: Option<CommonSubsequence>,
}

impl Iterator for Hunks<'_> {
    type Item = Hunk;

    fn next(&mut self) -> Option<Hunk> {
        let mut hunk = Hunk::default();
        if let Some(run) = self.leading.take() {
            hunk.push_keep(run);
        }
        let mut changed = false;
        while let Some(edit) = self.edits.next() {
            let Edit::Keep(run) = edit else {
                changed = true;
                hunk.0.push(*edit);
                continue;
            };
            let is_last = self.edits.peek().is_none();
            if !changed {
                if !is_last {
                    hunk.push_keep(run.starts_trimmed(self.context));
                }
            } else if is_last {
                hunk.push_keep(run.ends_trimmed(self.context));
                break;
            } else if let Some((head, tail)) = run.split(self.context) {
                hunk.push_keep(head);
                self.leading = Some(tail);
                break;
            } else {
                hunk.0.push(*edit);
            }
        }
        changed.then_some(hunk)
    }
}
