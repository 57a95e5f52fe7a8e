// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::report::{format_elapsed, ModuleOutput};

lazy_static::lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^\w\-_.]").unwrap();
}

pub fn read_configuration_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if text.is_empty() {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }
    Ok(text)
}

/// A block of configuration text: byte offsets into the whole text, the
/// block text verbatim and the identifier following the start marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub id: String,
}

/// Find the blocks of `text` that begin with a line starting with `start`.
///
/// A block ends with the `end` marker at the start of a later line, or just
/// before the next line starting with `start`. Unterminated blocks are
/// dropped.
///
/// Example:
/// ```
/// use o4n_lib::split::find_configuration_blocks;
/// let text = "interface Gi0/1\n no shutdown\n!\ninterface Gi0/2\n shutdown\n!\n";
/// let blocks = find_configuration_blocks(text, "interface", "!").unwrap();
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[0].id, "Gi0/1");
/// assert_eq!(blocks[0].text, "interface Gi0/1\n no shutdown\n!");
/// ```
pub fn find_configuration_blocks(text: &str, start: &str, end: &str) -> Result<Vec<ConfigBlock>> {
    if start.is_empty() || end.is_empty() {
        return Err(Error::InvalidOption(
            "start and end patterns must not be empty".to_string(),
        ));
    }
    let mut offsets = vec![];
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offsets.push((offset, line));
        offset += line.len();
    }

    let mut blocks = vec![];
    let mut index = 0;
    while index < offsets.len() {
        let (header_start, header) = offsets[index];
        if !header.starts_with(start) || !header.ends_with('\n') {
            index += 1;
            continue;
        }
        let id = header[start.len()..].trim().to_string();
        let mut terminator = None;
        for (next, &(line_start, line)) in offsets.iter().enumerate().skip(index + 1) {
            if line.starts_with(end) {
                terminator = Some((line_start + end.len(), next + 1));
                break;
            } else if line.starts_with(start) {
                terminator = Some((line_start, next));
                break;
            }
        }
        match terminator {
            Some((block_end, resume)) => {
                log::trace!("block {id:?} at {header_start}..{block_end}");
                blocks.push(ConfigBlock {
                    start: header_start,
                    end: block_end,
                    text: text[header_start..block_end].to_string(),
                    id,
                });
                index = resume;
            }
            None => {
                log::debug!("block {id:?} is not terminated");
                break;
            }
        }
    }
    log::debug!("found {} blocks starting with {start:?}", blocks.len());

    Ok(blocks)
}

/// Example:
/// ```
/// use o4n_lib::split::sanitize_filename;
/// assert_eq!(sanitize_filename("GigabitEthernet0/1 point-to-point"), "GigabitEthernet0_1_point-to-point");
/// ```
pub fn sanitize_filename(text: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(text, "_").into_owned()
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub start_pattern: String,
    pub end_pattern: String,
    /// Only blocks containing this are extracted. Blank selects every block.
    pub keyword: String,
    pub path: PathBuf,
    pub hostname: String,
    pub extension: String,
}

impl SplitOptions {
    pub fn new(start_pattern: &str, hostname: &str) -> Self {
        Self {
            start_pattern: start_pattern.to_string(),
            end_pattern: "!".to_string(),
            keyword: " ".to_string(),
            path: PathBuf::from("./"),
            hostname: hostname.to_string(),
            extension: "txt".to_string(),
        }
    }

    fn selects(&self, block: &ConfigBlock) -> bool {
        self.keyword.trim().is_empty() || block.text.contains(self.keyword.as_str())
    }

    fn filename(&self, block: &ConfigBlock) -> PathBuf {
        self.path.join(format!(
            "{}_{}_{}.{}",
            self.hostname,
            sanitize_filename(&self.start_pattern),
            sanitize_filename(&block.id),
            self.extension
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub instance_name: String,
    pub filename: PathBuf,
    pub section_text: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct SplitReport {
    pub file_names: Vec<PathBuf>,
    pub sections_list: Vec<Section>,
}

/// Ids of the blocks that `options` selects
pub fn matching_blocks(blocks: &[ConfigBlock], options: &SplitOptions) -> Vec<String> {
    blocks
        .iter()
        .filter(|block| options.selects(block))
        .map(|block| block.id.clone())
        .collect()
}

/// Write each selected block to its own file under `options.path`
pub fn extract_matching_blocks(blocks: &[ConfigBlock], options: &SplitOptions) -> Result<SplitReport> {
    fs::create_dir_all(&options.path).map_err(|source| Error::CreateDir {
        path: options.path.clone(),
        source,
    })?;

    let mut report = SplitReport::default();
    for block in blocks.iter().filter(|block| options.selects(block)) {
        let filename = options.filename(block);
        fs::write(&filename, &block.text).map_err(|source| Error::Write {
            path: filename.clone(),
            source,
        })?;
        log::debug!("wrote {filename:?}");
        report.sections_list.push(Section {
            instance_name: block.id.clone(),
            filename: filename.clone(),
            section_text: block.text.trim().lines().map(str::to_string).collect(),
        });
        report.file_names.push(filename);
    }

    Ok(report)
}

#[derive(Debug, Serialize)]
pub struct SplitContent {
    #[serde(rename = "Total_execution_time")]
    pub total_execution_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_names: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections_list: Option<Vec<Section>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_process_blocks: Option<Vec<String>>,
}

impl SplitContent {
    fn new(started: Instant) -> Self {
        Self {
            total_execution_time: format_elapsed(started.elapsed()),
            file_names: None,
            sections_list: None,
            would_process_blocks: None,
        }
    }
}

/// Split `file` into blocks and, unless `check` is set, write the selected
/// blocks out.
pub fn split_config(
    file: &Path,
    options: &SplitOptions,
    check: bool,
    started: Instant,
) -> Result<ModuleOutput<SplitContent>> {
    let text = read_configuration_file(file)?;
    let blocks = find_configuration_blocks(&text, &options.start_pattern, &options.end_pattern)?;

    if check {
        let ids = matching_blocks(&blocks, options);
        let msg = format!("Check mode: Found {} matching blocks", ids.len());
        let mut content = SplitContent::new(started);
        content.would_process_blocks = Some(ids);
        return Ok(ModuleOutput::new(false, msg, content));
    }

    if blocks.is_empty() {
        let msg = format!(
            "No configuration blocks found matching '{}'",
            options.start_pattern
        );
        return Ok(ModuleOutput::new(false, msg, SplitContent::new(started)));
    }

    let report = extract_matching_blocks(&blocks, options)?;
    if report.file_names.is_empty() {
        let msg = format!("No blocks contain keyword '{}'", options.keyword);
        return Ok(ModuleOutput::new(false, msg, SplitContent::new(started)));
    }

    let msg = format!(
        "Successfully extracted {} configuration blocks",
        report.file_names.len()
    );
    let mut content = SplitContent::new(started);
    content.file_names = Some(report.file_names);
    content.sections_list = Some(report.sections_list);

    Ok(ModuleOutput::new(true, msg, content))
}

#[cfg(test)]
mod split_tests;
