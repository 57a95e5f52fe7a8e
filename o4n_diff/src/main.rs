use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use log;
use stderrlog;

use o4n_lib::compliance::{ComplianceAnalyzer, ComplianceReport, ComplianceType, MatchStrategy};
use o4n_lib::{DiffResults, DiffSettings, ModuleOutput};

/// Compliance analysis of a device configuration against a master
/// configuration or a context
#[derive(Parser)]
struct Cli {
    /// Master configuration or context file
    #[arg(required = true, long)]
    original: PathBuf,
    /// Device configuration file
    #[arg(required = true, long)]
    current: PathBuf,
    /// config or context
    #[arg(long)]
    type_diff: Option<ComplianceType>,
    /// full, include or var
    #[arg(long)]
    match_type: Option<MatchStrategy>,
    #[arg(long)]
    lines_in_context: Option<usize>,
    /// Changed lines containing this are left out of the blocks (repeatable)
    #[arg(long)]
    list_char_ignore: Option<Vec<String>>,
    /// Offset subtracted from the computed ACL sequence numbers
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    var_diff: Option<u8>,
    /// TOML file of defaults for the options above
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn settings(&self) -> o4n_lib::Result<DiffSettings> {
        let mut settings = match &self.config {
            Some(path) => DiffSettings::from_file(path)?,
            None => DiffSettings::default(),
        };
        if let Some(type_diff) = self.type_diff {
            settings.type_diff = type_diff;
        }
        if let Some(match_type) = self.match_type {
            settings.match_type = match_type;
        }
        if let Some(lines_in_context) = self.lines_in_context {
            settings.lines_in_context = lines_in_context;
        }
        if let Some(list_char_ignore) = &self.list_char_ignore {
            settings.list_char_ignore = list_char_ignore.clone();
        }
        if let Some(var_diff) = self.var_diff {
            settings.var_diff = var_diff;
        }
        Ok(settings)
    }

    fn analyze(&self) -> o4n_lib::Result<ComplianceReport> {
        let config = self
            .settings()?
            .compliance_config(&self.original, &self.current);
        ComplianceAnalyzer::new(config)?.analyze()
    }
}

fn main() {
    let args = Cli::parse();

    stderrlog::new()
        .module(module_path!())
        .module("o4n_lib")
        .quiet(args.quiet)
        .verbosity(args.verbose as usize + 1)
        .init()
        .unwrap();

    let started = Instant::now();
    let report = match args.analyze() {
        Ok(report) => report,
        Err(err) => {
            log::error!("Error: {err}");
            std::process::exit(1);
        }
    };

    let output = ModuleOutput::new(
        false,
        "Compliance analysis completed successfully",
        DiffResults::new(report, started.elapsed()),
    );
    match output.to_writer(&mut io::stdout()) {
        Ok(_) => (),
        Err(err) => {
            log::error!("Error writing results: {err}");
            std::process::exit(5);
        }
    }
}
