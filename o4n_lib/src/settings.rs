// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::acl::DEFAULT_POSITION_OFFSET;
use crate::compliance::{
    default_ignore_chars, ComplianceConfig, ComplianceType, MatchStrategy, DEFAULT_CONTEXT_LINES,
    MAX_VAR_OFFSET,
};
use crate::error::{Error, Result};

/// Defaults for the compliance analysis read from a TOML file. Any field
/// may be left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffSettings {
    #[serde(default)]
    pub type_diff: ComplianceType,
    #[serde(default)]
    pub match_type: MatchStrategy,
    #[serde(default = "default_lines_in_context")]
    pub lines_in_context: usize,
    #[serde(default = "default_ignore_chars")]
    pub list_char_ignore: Vec<String>,
    #[serde(default = "default_var_diff")]
    pub var_diff: u8,
}

fn default_lines_in_context() -> usize {
    DEFAULT_CONTEXT_LINES
}

fn default_var_diff() -> u8 {
    DEFAULT_POSITION_OFFSET
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            type_diff: ComplianceType::default(),
            match_type: MatchStrategy::default(),
            lines_in_context: DEFAULT_CONTEXT_LINES,
            list_char_ignore: default_ignore_chars(),
            var_diff: DEFAULT_POSITION_OFFSET,
        }
    }
}

impl DiffSettings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&text)?;
        settings.validate()?;
        log::debug!("settings from {path:?}: {settings:?}");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.var_diff > MAX_VAR_OFFSET {
            return Err(Error::InvalidOption(format!(
                "var_diff must be in 0..={MAX_VAR_OFFSET}: got {}",
                self.var_diff
            )));
        }
        Ok(())
    }

    /// Configuration for comparing `original_file` with `current_file`
    pub fn compliance_config(&self, original_file: &Path, current_file: &Path) -> ComplianceConfig {
        ComplianceConfig {
            compliance_type: self.type_diff,
            match_strategy: self.match_type,
            context_lines: self.lines_in_context,
            ignore_chars: self.list_char_ignore.clone(),
            var_offset: self.var_diff,
            ..ComplianceConfig::new(original_file, current_file)
        }
    }
}

#[cfg(test)]
mod settings_tests {
    use super::*;

    #[test]
    fn partial_file() {
        let settings: DiffSettings = toml::from_str(
            r#"
type_diff = "context"
match_type = "var"
var_diff = 0
"#,
        )
        .unwrap();
        assert_eq!(settings.type_diff, ComplianceType::Context);
        assert_eq!(settings.match_type, MatchStrategy::Var);
        assert_eq!(settings.var_diff, 0);
        assert_eq!(settings.lines_in_context, 3);
        assert_eq!(settings.list_char_ignore, vec!["!", "#"]);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let settings: DiffSettings = toml::from_str("").unwrap();
        assert_eq!(settings, DiffSettings::default());
    }

    #[test]
    fn bad_files() {
        let file = temp_file::with_contents(b"match_type = \"fuzzy\"\n");
        assert!(matches!(
            DiffSettings::from_file(file.path()),
            Err(Error::Settings(_))
        ));
        let file = temp_file::with_contents(b"lines_in_contxt = 2\n");
        assert!(matches!(
            DiffSettings::from_file(file.path()),
            Err(Error::Settings(_))
        ));
        let file = temp_file::with_contents(b"var_diff = 12\n");
        assert!(matches!(
            DiffSettings::from_file(file.path()),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn into_compliance_config() {
        let file = temp_file::with_contents(b"lines_in_context = 1\nlist_char_ignore = []\n");
        let settings = DiffSettings::from_file(file.path()).unwrap();
        let config = settings.compliance_config(Path::new("master.cfg"), Path::new("r1.cfg"));
        assert_eq!(config.context_lines, 1);
        assert!(config.ignore_chars.is_empty());
        assert_eq!(config.original_file, Path::new("master.cfg"));
        assert_eq!(config.compliance_type, ComplianceType::Config);
    }
}
