// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use clap::*;
use colored::Colorize;
use log::{debug, LevelFilter};
use objc2swift::{execute, Options};
use simplelog::{Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Runs the intention passes over a translated Objective-C collection and prints \
             the resulting Swift declarations",
    rename_all = "kebab-case",
    author,
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Args {
    /// Path to a JSON-serialized intention collection
    #[clap(long = "input", short = 'i', required_unless_present = "print_config")]
    pub input: Option<PathBuf>,

    /// Path to a toml config
    #[clap(long = "config", short = 'c', env = "OBJC2SWIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// General options
    #[clap(flatten)]
    pub general_config: GeneralConfig,
}

/// General options
#[derive(Args)]
#[clap(next_help_heading = "General Options")]
pub struct GeneralConfig {
    /// Dump the collection before and after every pass to `<base>_<step>_<pass>.intentions`
    #[clap(name = "dump-passes", long, short = 'd', value_name = "BASE")]
    pub dump_passes: Option<String>,

    /// Print the change history of every declaration
    #[clap(name = "history", long)]
    pub history: bool,

    /// Display detailed progress
    #[clap(name = "verbose", long, short = 'v')]
    pub verbose: bool,

    /// Print the effective config and exit
    #[clap(name = "print_config", long = "print-config")]
    pub print_config: bool,
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut options = match &args.config {
        Some(path) => Options::from_toml_file(path)?,
        None => Options::default(),
    };
    if args.general_config.verbose {
        options.verbosity_level = LevelFilter::Trace;
    }
    options.print_history |= args.general_config.history;

    if args.general_config.print_config {
        println!("{}", options.to_toml()?);
        return Ok(());
    }

    let _ = TermLogger::init(options.verbosity_level, Config::default(), TerminalMode::Stderr);
    debug!("objc2swift CLI version: {}", env!("CARGO_PKG_VERSION"));

    let Some(input) = &args.input else {
        anyhow::bail!("no input collection given");
    };
    let output = execute(input, &options, args.general_config.dump_passes.as_deref())?;
    if options.output_path.is_none() {
        print!("{}", output);
    }
    Ok(())
}

fn main() {
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);

    if let Err(err) = run(Args::parse()) {
        let err = format!("{:?}", err);
        eprintln!("{}", err.bold().red());
        std::process::exit(1);
    }
}
