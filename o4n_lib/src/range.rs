// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

pub trait Len {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Half open range of line indices: `start..end`
#[derive(Debug, Default, Clone, Copy, PartialOrd, PartialEq, Eq)]
pub struct Range(pub usize, pub usize);

impl Len for Range {
    fn len(&self) -> usize {
        self.1.saturating_sub(self.0)
    }
}

impl Range {
    pub fn start(&self) -> usize {
        self.0
    }

    pub fn end(&self) -> usize {
        self.1
    }

    /// True if this is a well formed range over a sequence of `len` items
    pub fn fits_within(&self, len: usize) -> bool {
        self.0 <= self.1 && self.1 <= len
    }

    /// Format as a unified diff hunk header range (1 based line numbers).
    ///
    /// Example:
    /// ```
    /// use o4n_lib::range::Range;
    /// assert_eq!(Range(3, 4).unified_format(), "4");
    /// assert_eq!(Range(0, 6).unified_format(), "1,6");
    /// assert_eq!(Range(5, 5).unified_format(), "5,0");
    /// ```
    pub fn unified_format(&self) -> String {
        match self.len() {
            0 => format!("{},0", self.0),
            1 => (self.0 + 1).to_string(),
            length => format!("{},{length}", self.0 + 1),
        }
    }
}
