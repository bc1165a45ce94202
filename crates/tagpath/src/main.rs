//! Tagpath CLI
//!
//! Resolves course-material filenames to destination folders using a tag rule file:
//! - **resolve**: classify filenames given on the command line
//! - **scan**: preview destinations for every file in a directory
//! - **rules** / **check**: inspect and validate the rule file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tagpath_logging::{init_logging, LogConfig};
use tagpath_rules::TieBreak;
use tracing::debug;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "tagpath", version, about = "Sort course files into folders by tag rules")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Rule file (.json or .toml); defaults to ~/.tagpath/rules.json
    #[arg(long, global = true, env = "TAGPATH_RULES")]
    rules: Option<PathBuf>,

    /// Override the rule file's tie-break (last, first, deepest)
    #[arg(long, global = true, value_parser = parse_tie_break)]
    tie_break: Option<TieBreak>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show where filenames belong
    Resolve {
        /// Filenames to classify (need not exist)
        #[arg(required = true)]
        names: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Also list the result of every matching root
        #[arg(long)]
        all: bool,

        /// Base directory that resolved paths are joined onto
        #[arg(long, env = "TAGPATH_DEST")]
        dest: Option<PathBuf>,
    },

    /// Preview destinations for the files in a directory
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Scan subdirectories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Maximum directory depth (1 = top level only); implies --recursive
        #[arg(short, long, value_parser = parse_depth)]
        depth: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Only list files no rule matched
        #[arg(long)]
        unmatched: bool,

        /// Base directory that resolved paths are joined onto
        #[arg(long, env = "TAGPATH_DEST")]
        dest: Option<PathBuf>,
    },

    /// List the loaded rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the rule file
    Check,
}

fn parse_tie_break(value: &str) -> Result<TieBreak, String> {
    value
        .parse()
        .map_err(|_| cli::error::HelpfulError::invalid_tie_break(value).to_string())
}

fn parse_depth(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("depth must be at least 1 (1 scans the top level only)".to_string()),
        Ok(depth) => Ok(depth),
        Err(err) => Err(format!("invalid depth '{}': {}", value, err)),
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let rules_path = cli::config::rules_path(cli.rules.as_deref());
    debug!(rules = %rules_path.display(), "Using rule file");
    let forest = cli::config::load_forest(&rules_path, cli.tie_break)?;

    match cli.command {
        Commands::Resolve {
            names,
            json,
            all,
            dest,
        } => cli::resolve::run(
            &forest,
            cli::resolve::ResolveArgs {
                names,
                json,
                all,
                dest,
            },
        ),
        Commands::Scan {
            path,
            recursive,
            depth,
            json,
            unmatched,
            dest,
        } => cli::scan::run(
            &forest,
            cli::scan::ScanArgs {
                path,
                recursive,
                depth,
                json,
                unmatched,
                dest,
            },
        ),
        Commands::Rules { json } => cli::rules::run(&forest, cli::rules::RulesArgs { json }),
        Commands::Check => cli::rules::check(&forest, &rules_path),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "tagpath",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
