use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use log;
use stderrlog;

use o4n_lib::find::{find_regex, FIND_SUCCESS_MSG};
use o4n_lib::{DiffResults, ModuleOutput};

/// Search a configuration file with a regular expression
#[derive(Parser)]
struct Cli {
    #[arg(required = true, long)]
    exp_reg: String,
    #[arg(required = true, long)]
    path_file: PathBuf,
    #[arg(long)]
    case_sensitive: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(short, long)]
    quiet: bool,
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
    let report = match find_regex(&args.path_file, &args.exp_reg, args.case_sensitive) {
        Ok(report) => report,
        Err(err) => {
            log::error!("Find algorithm failed, error {err}");
            std::process::exit(1);
        }
    };

    let output = ModuleOutput::new(
        false,
        FIND_SUCCESS_MSG,
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
