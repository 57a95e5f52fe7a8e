use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use log;
use stderrlog;

use o4n_lib::split::{split_config, SplitOptions};

/// Split a configuration file into one file per configuration block
#[derive(Parser)]
struct Cli {
    #[arg(required = true, long)]
    file_cfg: PathBuf,
    /// Text starting the first line of each block
    #[arg(required = true, long)]
    parameter_start: String,
    /// Text starting the line that closes a block
    #[arg(long, default_value = "!")]
    parameter_end: String,
    /// Only extract blocks containing this (blank for all)
    #[arg(long, default_value = " ")]
    keyword: String,
    /// Output directory
    #[arg(long, default_value = "./")]
    path_file: PathBuf,
    #[arg(required = true, long)]
    hostname: String,
    #[arg(long, default_value = "txt")]
    ext: String,
    /// Report the blocks that would be extracted without writing them
    #[arg(long)]
    check: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> SplitOptions {
        SplitOptions {
            end_pattern: self.parameter_end.clone(),
            keyword: self.keyword.clone(),
            path: self.path_file.clone(),
            extension: self.ext.clone(),
            ..SplitOptions::new(&self.parameter_start, &self.hostname)
        }
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
    let output = match split_config(&args.file_cfg, &args.options(), args.check, started) {
        Ok(output) => output,
        Err(err) => {
            log::error!("Error splitting configuration: {err}");
            std::process::exit(1);
        }
    };

    match output.to_writer(&mut io::stdout()) {
        Ok(_) => (),
        Err(err) => {
            log::error!("Error writing results: {err}");
            std::process::exit(5);
        }
    }
}
