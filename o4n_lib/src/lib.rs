// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

pub mod acl;
pub mod blocks;
pub mod common_subsequence;
pub mod compliance;
pub mod edits;
pub mod error;
pub mod find;
pub mod lines;
pub mod range;
pub mod report;
pub mod settings;
pub mod split;
pub mod template;
pub mod unified;

pub use compliance::{ComplianceAnalyzer, ComplianceConfig, ComplianceReport, ComplianceType, MatchStrategy};
pub use error::{Error, Result};
pub use lines::Lines;
pub use report::{DiffResults, ModuleOutput};
pub use settings::DiffSettings;
