// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::acl::{is_acl_config, AclProcessor, DEFAULT_POSITION_OFFSET};
use crate::blocks::hierarchical_block;
use crate::error::{Error, Result};
use crate::lines::Lines;
use crate::range::Len;
use crate::report::OrderedMap;
use crate::template::{has_template_var, TemplateComparison};
use crate::unified::{ChangedLine, UnifiedDiff};

pub const DEFAULT_CONTEXT_LINES: usize = 3;
pub const MAX_VAR_OFFSET: u8 = 9;

pub fn default_ignore_chars() -> Vec<String> {
    vec!["!".to_string(), "#".to_string()]
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceType {
    /// Compare a whole configuration against a master configuration
    #[default]
    Config,
    /// Compare a context (configuration fragment) against a configuration
    Context,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    #[default]
    Full,
    Include,
    Var,
}

impl ComplianceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Context => "context",
        }
    }
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Include => "include",
            Self::Var => "var",
        }
    }
}

impl fmt::Display for ComplianceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "config" => Ok(Self::Config),
            "context" => Ok(Self::Context),
            _ => Err(Error::InvalidOption(format!(
                "type_diff must be one of config, context: got {s:?}"
            ))),
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(Self::Full),
            "include" => Ok(Self::Include),
            "var" => Ok(Self::Var),
            _ => Err(Error::InvalidOption(format!(
                "match_type must be one of full, include, var: got {s:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "OK")]
    Ok,
    Failed,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of the `total` reference lines that are satisfied, given
/// `shortfall` lines are not. Always within 0..=100.
pub fn compliance_rate(total: usize, shortfall: usize) -> (f64, ComplianceStatus) {
    if shortfall == 0 {
        (100.0, ComplianceStatus::Ok)
    } else if total == 0 {
        (0.0, ComplianceStatus::Failed)
    } else {
        let rate = (total as f64 - shortfall as f64) / total as f64 * 100.0;
        (round2(rate.clamp(0.0, 100.0)), ComplianceStatus::Failed)
    }
}

/// Name of a context: its file name up to the first '.'
pub fn context_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    pub original_file: PathBuf,
    pub current_file: PathBuf,
    pub compliance_type: ComplianceType,
    pub match_strategy: MatchStrategy,
    pub context_lines: usize,
    pub ignore_chars: Vec<String>,
    pub var_offset: u8,
}

impl ComplianceConfig {
    pub fn new(original_file: &Path, current_file: &Path) -> Self {
        Self {
            original_file: original_file.to_path_buf(),
            current_file: current_file.to_path_buf(),
            compliance_type: ComplianceType::default(),
            match_strategy: MatchStrategy::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
            ignore_chars: default_ignore_chars(),
            var_offset: DEFAULT_POSITION_OFFSET,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.var_offset > MAX_VAR_OFFSET {
            return Err(Error::InvalidOption(format!(
                "var_diff must be in 0..={MAX_VAR_OFFSET}: got {}",
                self.var_offset
            )));
        }
        Ok(())
    }
}

/// Parameters passed through to every strategy
#[derive(Debug, Clone)]
pub struct CompareParams {
    pub context_name: String,
    pub context_lines: usize,
    pub ignore_chars: Vec<String>,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            context_name: String::new(),
            context_lines: DEFAULT_CONTEXT_LINES,
            ignore_chars: default_ignore_chars(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub diff: String,
    pub lines_to_delete: Vec<ChangedLine>,
    pub lines_to_add: Vec<ChangedLine>,
    pub block_to_add: Option<String>,
    pub block_to_del: Option<String>,
    pub compliance_rate: f64,
    pub compliance_status: ComplianceStatus,
}

#[derive(Debug, Serialize)]
pub struct ContextFullReport {
    pub match_type: MatchStrategy,
    pub context_name: String,
    pub original_context: Vec<String>,
    pub lines_to_add_config_file: Vec<String>,
    pub compliance_rate: f64,
    pub compliance_status: ComplianceStatus,
}

#[derive(Debug, Serialize)]
pub struct ContextIncludeReport {
    pub match_type: MatchStrategy,
    pub context_name: String,
    pub original_context: Vec<String>,
    pub lines_included: OrderedMap<Vec<String>>,
    pub lines_to_add_config_file: Vec<String>,
    pub compliance_rate: f64,
    pub compliance_status: ComplianceStatus,
}

#[derive(Debug, Serialize)]
pub struct ContextVarReport {
    pub lines_to_add_config_file: Vec<String>,
    pub match_type: MatchStrategy,
    pub context_name: String,
    pub original_context: Vec<String>,
    pub lines_difference: Vec<String>,
    pub delta_results: String,
    pub compliance_rate: f64,
    pub compliance_status: ComplianceStatus,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ComplianceReport {
    Config(ConfigReport),
    ContextFull(ContextFullReport),
    ContextInclude(ContextIncludeReport),
    ContextVar(ContextVarReport),
}

impl ComplianceReport {
    pub fn compliance_rate(&self) -> f64 {
        match self {
            Self::Config(report) => report.compliance_rate,
            Self::ContextFull(report) => report.compliance_rate,
            Self::ContextInclude(report) => report.compliance_rate,
            Self::ContextVar(report) => report.compliance_rate,
        }
    }

    pub fn compliance_status(&self) -> ComplianceStatus {
        match self {
            Self::Config(report) => report.compliance_status,
            Self::ContextFull(report) => report.compliance_status,
            Self::ContextInclude(report) => report.compliance_status,
            Self::ContextVar(report) => report.compliance_status,
        }
    }
}

pub trait ComplianceStrategy {
    /// Compare the device configuration (`current`) with the reference
    /// (`original`): a master configuration or a context.
    fn compare(
        &self,
        current: &Lines,
        original: &Lines,
        params: &CompareParams,
    ) -> Result<ComplianceReport>;
}

/// Whole configuration against a master configuration
#[derive(Debug, Default)]
pub struct FullConfigStrategy;

impl ComplianceStrategy for FullConfigStrategy {
    fn compare(
        &self,
        current: &Lines,
        original: &Lines,
        params: &CompareParams,
    ) -> Result<ComplianceReport> {
        let diff = UnifiedDiff::new(original, current, params.context_lines);
        // lines only in the master must be added to the device and vice versa
        let block_to_add = hierarchical_block(original, diff.removed(), &params.ignore_chars);
        let block_to_del = hierarchical_block(current, diff.added(), &params.ignore_chars);
        let changes = diff.added().len() + diff.removed().len();
        let (compliance_rate, compliance_status) = compliance_rate(original.len(), changes);

        Ok(ComplianceReport::Config(ConfigReport {
            diff: diff.text(),
            lines_to_delete: diff.added().to_vec(),
            lines_to_add: diff.removed().to_vec(),
            block_to_add,
            block_to_del,
            compliance_rate,
            compliance_status,
        }))
    }
}

/// Lines in the reference which carry a template variable are "headers" and
/// one of them is forgiven when counting missing lines.
fn header_allowance<'a>(lines: impl IntoIterator<Item = &'a String>) -> usize {
    if lines.into_iter().any(|line| has_template_var(line)) {
        1
    } else {
        0
    }
}

/// Context must appear in the configuration exactly as given
#[derive(Debug, Default)]
pub struct ContextFullStrategy;

impl ComplianceStrategy for ContextFullStrategy {
    fn compare(
        &self,
        current: &Lines,
        original: &Lines,
        params: &CompareParams,
    ) -> Result<ComplianceReport> {
        let diff = UnifiedDiff::new(original, current, params.context_lines);
        let to_add: Vec<String> = diff.removed().iter().map(|l| l.text.clone()).collect();
        let missing = to_add.len() - header_allowance(to_add.iter());
        let (compliance_rate, compliance_status) = compliance_rate(original.len(), missing);

        Ok(ComplianceReport::ContextFull(ContextFullReport {
            match_type: MatchStrategy::Full,
            context_name: params.context_name.clone(),
            original_context: original.as_slice().to_vec(),
            lines_to_add_config_file: if compliance_status == ComplianceStatus::Failed {
                to_add
            } else {
                vec![]
            },
            compliance_rate,
            compliance_status,
        }))
    }
}

/// Every context line must be contained in some configuration line
#[derive(Debug, Default)]
pub struct ContextIncludeStrategy;

impl ComplianceStrategy for ContextIncludeStrategy {
    fn compare(
        &self,
        current: &Lines,
        original: &Lines,
        params: &CompareParams,
    ) -> Result<ComplianceReport> {
        let matches: Vec<(&String, Vec<String>)> = original
            .as_slice()
            .par_iter()
            .map(|context_line| {
                let found: Vec<String> = current
                    .iter()
                    .filter(|config_line| config_line.contains(context_line.as_str()))
                    .map(|config_line| format!("Line included in config line: {config_line}"))
                    .collect();
                (context_line, found)
            })
            .collect();

        let mut lines_included = OrderedMap::default();
        let mut not_included = vec![];
        for (context_line, found) in matches {
            if found.is_empty() {
                not_included.push(context_line.to_string());
            } else {
                lines_included.insert(context_line.as_str(), found);
            }
        }
        let missing = not_included.len() - header_allowance(not_included.iter());
        let (compliance_rate, compliance_status) = compliance_rate(original.len(), missing);

        Ok(ComplianceReport::ContextInclude(ContextIncludeReport {
            match_type: MatchStrategy::Include,
            context_name: params.context_name.clone(),
            original_context: original.as_slice().to_vec(),
            lines_included,
            lines_to_add_config_file: if compliance_status == ComplianceStatus::Failed {
                not_included
            } else {
                vec![]
            },
            compliance_rate,
            compliance_status,
        }))
    }
}

/// Context is a template with `{{ var }}` place holders
#[derive(Debug, Default)]
pub struct ContextVarStrategy {
    acl_processor: AclProcessor,
}

impl ContextVarStrategy {
    pub fn new(acl_processor: AclProcessor) -> Self {
        Self { acl_processor }
    }
}

impl ComplianceStrategy for ContextVarStrategy {
    fn compare(
        &self,
        current: &Lines,
        original: &Lines,
        params: &CompareParams,
    ) -> Result<ComplianceReport> {
        let (comparison, missing) = if is_acl_config(current.as_slice()) {
            log::debug!("access list configuration: ignoring sequence numbers");
            let cleaned_original = self.acl_processor.clean_positions(original.as_slice());
            let cleaned_current = self.acl_processor.clean_positions(current.as_slice());
            let comparison = TemplateComparison::new(&cleaned_original, &cleaned_current)?;
            let missing = self
                .acl_processor
                .calculate_positions(&comparison.missing_lines(), &cleaned_original);
            (comparison, missing)
        } else {
            let comparison = TemplateComparison::new(original.as_slice(), current.as_slice())?;
            let missing = comparison.missing_lines();
            (comparison, missing)
        };

        let real_missing: Vec<String> = missing
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let (compliance_rate, compliance_status) =
            compliance_rate(original.non_blank_count(), real_missing.len());

        Ok(ComplianceReport::ContextVar(ContextVarReport {
            lines_to_add_config_file: real_missing,
            match_type: MatchStrategy::Var,
            context_name: params.context_name.clone(),
            original_context: original.as_slice().to_vec(),
            lines_difference: comparison.additional_lines(),
            delta_results: comparison.delta(),
            compliance_rate,
            compliance_status,
        }))
    }
}

pub fn create_strategy(
    compliance_type: ComplianceType,
    match_strategy: MatchStrategy,
    var_offset: u8,
) -> Box<dyn ComplianceStrategy> {
    log::debug!("creating {compliance_type}/{match_strategy} strategy");
    match (compliance_type, match_strategy) {
        (ComplianceType::Config, _) => Box::new(FullConfigStrategy),
        (ComplianceType::Context, MatchStrategy::Full) => Box::new(ContextFullStrategy),
        (ComplianceType::Context, MatchStrategy::Include) => Box::new(ContextIncludeStrategy),
        (ComplianceType::Context, MatchStrategy::Var) => {
            Box::new(ContextVarStrategy::new(AclProcessor::new(var_offset)))
        }
    }
}

#[derive(Debug)]
pub struct ComplianceAnalyzer {
    config: ComplianceConfig,
}

impl ComplianceAnalyzer {
    pub fn new(config: ComplianceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn analyze(&self) -> Result<ComplianceReport> {
        let current = Lines::read(&self.config.current_file)?;
        let original = Lines::read(&self.config.original_file)?;
        let strategy = create_strategy(
            self.config.compliance_type,
            self.config.match_strategy,
            self.config.var_offset,
        );
        let params = CompareParams {
            context_name: context_name(&self.config.original_file),
            context_lines: self.config.context_lines,
            ignore_chars: self.config.ignore_chars.clone(),
        };
        let report = strategy.compare(&current, &original, &params)?;
        log::info!(
            "{:?} vs {:?}: {}% ({:?})",
            self.config.original_file,
            self.config.current_file,
            report.compliance_rate(),
            report.compliance_status()
        );

        Ok(report)
    }
}
