// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error reading {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("File {0:?} is empty")]
    EmptyFile(PathBuf),

    #[error("Error writing file {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid settings file: {0}")]
    Settings(#[from] toml::de::Error),
}
