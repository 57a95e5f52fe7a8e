// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::report::OrderedMap;

pub const FIND_SUCCESS_MSG: &str = "Find algorithm run successfully";

/// A regular expression search, case insensitive by default
#[derive(Debug, Clone)]
pub struct RegMatch {
    expression: String,
    case_sensitive: bool,
}

impl RegMatch {
    pub fn new(expression: &str, case_sensitive: bool) -> Self {
        Self {
            expression: expression.to_string(),
            case_sensitive,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn pattern(&self) -> Result<Regex> {
        Ok(RegexBuilder::new(&self.expression)
            .case_insensitive(!self.case_sensitive)
            .build()?)
    }
}

/// Where a match was found: character offsets and 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FoundItem {
    Text(String),
    Groups(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct FindReport {
    pub exp_regular: String,
    pub path_file: PathBuf,
    pub lines_included: Vec<FoundItem>,
    pub lines_included_span: OrderedMap<MatchSpan>,
}

fn found_item(regex: &Regex, captures: &regex::Captures) -> FoundItem {
    let group_text = |i: usize| {
        captures
            .get(i)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    match regex.captures_len() {
        1 => FoundItem::Text(group_text(0)),
        2 => FoundItem::Text(group_text(1)),
        n => FoundItem::Groups((1..n).map(group_text).collect()),
    }
}

/// Search `text` for every non overlapping match of `reg_match`.
///
/// Example:
/// ```
/// use o4n_lib::find::{find_in_text, FoundItem, RegMatch};
/// let text = "hostname R1\nInterface Gi0/1\ninterface Gi0/2\n";
/// let (found, spans) = find_in_text(&RegMatch::new(r"interface \S+", false), text).unwrap();
/// assert_eq!(found[0], FoundItem::Text("Interface Gi0/1".to_string()));
/// assert_eq!(spans.get("interface Gi0/2").unwrap().line, 3);
/// ```
pub fn find_in_text(
    reg_match: &RegMatch,
    text: &str,
) -> Result<(Vec<FoundItem>, OrderedMap<MatchSpan>)> {
    let regex = reg_match.pattern()?;
    let mut found = vec![];
    let mut spans = OrderedMap::default();
    // running totals up to byte offset `scanned`
    let (mut scanned, mut chars, mut newlines) = (0, 0, 0);
    for captures in regex.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let skipped = &text[scanned..whole.start()];
        chars += skipped.chars().count();
        newlines += skipped.matches('\n').count();
        scanned = whole.start();
        let start = chars;
        let end = start + whole.as_str().chars().count();
        spans.insert(
            whole.as_str(),
            MatchSpan {
                start,
                end,
                line: newlines + 1,
            },
        );
        found.push(found_item(&regex, &captures));
    }
    log::debug!("{} matches for {:?}", found.len(), reg_match.expression());

    Ok((found, spans))
}

pub fn find_regex(path: &Path, expression: &str, case_sensitive: bool) -> Result<FindReport> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reg_match = RegMatch::new(expression, case_sensitive);
    let (lines_included, lines_included_span) = find_in_text(&reg_match, &text)?;

    Ok(FindReport {
        exp_regular: expression.to_string(),
        path_file: path.to_path_buf(),
        lines_included,
        lines_included_span,
    })
}
