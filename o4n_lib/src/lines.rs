// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::collections::HashMap;
use std::fs;
use std::ops::Index;
use std::path::Path;

use crate::error::{Error, Result};
use crate::range::{Len, Range};

#[derive(Debug, Default)]
pub struct LineIndices(HashMap<String, Vec<usize>>);

impl LineIndices {
    pub fn indices(&self, key: &str) -> Option<&Vec<usize>> {
        self.0.get(key)
    }

    /// Forget lines that are too common in a long sequence (200 lines or
    /// more) to be useful anchors: those occurring more than once per
    /// hundred lines plus one. Returns the number of distinct lines dropped.
    pub fn drop_popular(&mut self, sequence_len: usize) -> usize {
        if sequence_len < 200 {
            return 0;
        }
        let limit = sequence_len / 100 + 1;
        let before = self.0.len();
        self.0.retain(|_, indices| indices.len() <= limit);
        before - self.0.len()
    }
}

/// The lines of a configuration with their terminators removed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lines(Box<[String]>);

impl From<&str> for Lines {
    /// Leading/trailing white space of the whole text is discarded before
    /// splitting, so trailing blank lines never take part in a comparison.
    fn from(text: &str) -> Self {
        Self(text.trim().lines().map(|s| s.to_string()).collect())
    }
}

impl From<String> for Lines {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Vec<String>> for Lines {
    fn from(lines: Vec<String>) -> Self {
        Self(lines.into_boxed_slice())
    }
}

impl Len for Lines {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl Index<usize> for Lines {
    type Output = String;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Lines {
    /// Read a configuration file. A file with no content is an error.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = Self::from(text);
        if lines.is_empty() {
            Err(Error::EmptyFile(path.to_path_buf()))
        } else {
            log::debug!("read {} lines from {path:?}", lines.len());
            Ok(lines)
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &String> {
        self.0.iter()
    }

    /// From `start` to the end of the lines
    pub fn range_from(&self, start: usize) -> Range {
        Range(start, self.len())
    }

    pub fn subsequence(&self, range: Range) -> impl DoubleEndedIterator<Item = &String> {
        debug_assert!(range.fits_within(self.len()));
        self.0[range.start()..range.end()].iter()
    }

    /// Generate the content to index mechanism for these `Lines`
    ///
    /// Example:
    /// ```
    /// use o4n_lib::lines::Lines;
    /// let lines = Lines::from("A\nB\nC\nD\nA\nB\nC\nD\n");
    /// let indices = lines.generate_content_indices();
    /// assert_eq!(indices.indices("A"), Some(&vec![0usize, 4]));
    /// assert_eq!(indices.indices("C"), Some(&vec![2usize, 6]));
    /// assert_eq!(indices.indices("E"), None);
    /// ```
    pub fn generate_content_indices(&self) -> LineIndices {
        let mut indices = LineIndices::default();
        for (index, line) in self.0.iter().enumerate() {
            indices.0.entry(line.clone()).or_default().push(index);
        }
        indices
    }

    /// Find the nearest line at or before `index` that is not indented.
    pub fn parent_of(&self, index: usize) -> Option<&String> {
        self.0.get(..=index)?.iter().rev().find(|line| !is_indented(line))
    }

    /// Number of lines that are not blank
    pub fn non_blank_count(&self) -> usize {
        self.0.iter().filter(|l| !l.trim().is_empty()).count()
    }
}

pub fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

#[cfg(test)]
mod lines_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_text() {
        let lines = Lines::from("\n\ninterface Gi0/1\n description X\r\n!\n\n\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "interface Gi0/1");
        assert_eq!(lines[1], " description X");
        assert_eq!(
            vec!["description X", "!"],
            lines
                .subsequence(Range(1, 3))
                .map(|l| l.trim())
                .collect::<Vec<&str>>()
        );
    }

    #[test]
    fn parents() {
        let lines = Lines::from("hostname R1\ninterface Gi0/1\n description X\n shutdown\n");
        assert_eq!(lines.parent_of(3), Some(&"interface Gi0/1".to_string()));
        assert_eq!(lines.parent_of(1), Some(&"interface Gi0/1".to_string()));
        assert_eq!(lines.parent_of(0), Some(&"hostname R1".to_string()));
        let orphans = Lines::from(" a\n b\n");
        assert_eq!(orphans.parent_of(1), None);
    }

    #[test]
    fn popular_lines_dropped_from_long_sequences() {
        let mut text = String::new();
        for index in 0..200 {
            match index % 50 {
                0 if index % 100 == 0 => text.push_str("!\n"),
                1 | 2 => text.push_str(" no shutdown\n"),
                _ => text.push_str(&format!("line {index}\n")),
            }
        }
        let lines = Lines::from(text.as_str());
        let mut indices = lines.generate_content_indices();
        // limit is 3: "!" occurs twice, " no shutdown" 8 times
        assert_eq!(indices.drop_popular(lines.len()), 1);
        assert_eq!(indices.indices(" no shutdown"), None);
        assert_eq!(indices.indices("!"), Some(&vec![0usize, 100]));
        assert_eq!(indices.indices("line 3"), Some(&vec![3usize]));

        let short = Lines::from("!\n!\n!\n!\n");
        let mut indices = short.generate_content_indices();
        assert_eq!(indices.drop_popular(short.len()), 0);
        assert!(indices.indices("!").is_some());
    }

    #[test]
    fn read_empty_file_fails() {
        let file = temp_file::with_contents(b"  \n\n");
        match Lines::read(file.path()) {
            Err(Error::EmptyFile(path)) => assert_eq!(path, file.path()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hostname R1\n!\n").unwrap();
        let lines = Lines::read(file.path()).unwrap();
        assert_eq!(lines.as_slice(), &["hostname R1".to_string(), "!".to_string()]);
        assert_eq!(lines.non_blank_count(), 2);
    }
}
