// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use serde::{Deserialize, Serialize};

use crate::lines::Lines;
use crate::edits::{Edit, EditScript, Hunk};
use crate::range::Range;

pub const BEFORE_LABEL: &str = "original";
pub const AFTER_LABEL: &str = "current";

/// A line that is present on only one side of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedLine {
    /// Position in the diff body (i.e. not counting the two file header lines)
    pub diff_index: usize,
    /// Position in the file the line came from
    pub source_index: usize,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct UnifiedDiff {
    lines: Vec<String>,
    removed: Vec<ChangedLine>,
    added: Vec<ChangedLine>,
}

struct UnifiedDiffBuilder<'a> {
    before: &'a Lines,
    after: &'a Lines,
    diff: UnifiedDiff,
}

impl<'a> UnifiedDiffBuilder<'a> {
    fn body_len(&self) -> usize {
        self.diff.lines.len() - 2
    }

    fn push_context(&mut self, range: Range) {
        for line in self.before.subsequence(range) {
            self.diff.lines.push(format!(" {line}"));
        }
    }

    fn push_removed(&mut self, range: Range) {
        for (index, line) in self.before.subsequence(range).enumerate() {
            self.diff.removed.push(ChangedLine {
                diff_index: self.body_len(),
                source_index: range.start() + index,
                text: line.to_string(),
            });
            self.diff.lines.push(format!("-{line}"));
        }
    }

    fn push_added(&mut self, range: Range) {
        for (index, line) in self.after.subsequence(range).enumerate() {
            self.diff.added.push(ChangedLine {
                diff_index: self.body_len(),
                source_index: range.start() + index,
                text: line.to_string(),
            });
            self.diff.lines.push(format!("+{line}"));
        }
    }

    fn push_hunk(&mut self, hunk: &Hunk) {
        let (before_range, after_range) = hunk.ranges();
        self.diff.lines.push(format!(
            "@@ -{} +{} @@",
            before_range.unified_format(),
            after_range.unified_format()
        ));
        for edit in hunk.iter() {
            match edit {
                Edit::Keep(run) => self.push_context(run.before_range()),
                Edit::Remove(range, _) => self.push_removed(*range),
                Edit::Add(_, range) => self.push_added(*range),
                Edit::Change(before_range, after_range) => {
                    self.push_removed(*before_range);
                    self.push_added(*after_range);
                }
            }
        }
    }
}

impl UnifiedDiff {
    /// Generate the unified diff of `before` ("original") to `after`
    /// ("current") with `context` lines of context around each change.
    ///
    /// Example:
    /// ```
    /// use o4n_lib::lines::Lines;
    /// use o4n_lib::unified::UnifiedDiff;
    /// let original = Lines::from("interface Gi0/1\n description UPLINK\n no shutdown\n");
    /// let current = Lines::from("interface Gi0/1\n description BACKUP\n no shutdown\n");
    /// let diff = UnifiedDiff::new(&original, &current, 3);
    /// assert_eq!(
    ///     diff.text(),
    ///     "--- original\n+++ current\n@@ -1,3 +1,3 @@\n interface Gi0/1\n- description UPLINK\n+ description BACKUP\n  no shutdown"
    /// );
    /// ```
    pub fn new(before: &Lines, after: &Lines, context: usize) -> Self {
        let script = EditScript::new(before.clone(), after.clone());
        let mut builder = UnifiedDiffBuilder {
            before: script.before(),
            after: script.after(),
            diff: UnifiedDiff::default(),
        };
        let mut hunks = script.hunks(context).peekable();
        if hunks.peek().is_some() {
            builder.diff.lines.push(format!("--- {BEFORE_LABEL}"));
            builder.diff.lines.push(format!("+++ {AFTER_LABEL}"));
            for hunk in hunks {
                builder.push_hunk(&hunk);
            }
        }
        log::trace!(
            "unified diff: {} lines, {} removed, {} added",
            builder.diff.lines.len(),
            builder.diff.removed.len(),
            builder.diff.added.len()
        );

        builder.diff
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines including the "---" and "+++" headers
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The lines after the two file headers
    pub fn body(&self) -> &[String] {
        self.lines.get(2..).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Lines only in the "original"
    pub fn removed(&self) -> &[ChangedLine] {
        &self.removed
    }

    /// Lines only in the "current"
    pub fn added(&self) -> &[ChangedLine] {
        &self.added
    }
}
