//! ato CLI: resolves a configured build of an ato project.
//!
//! `ato check` runs the front end and reports the first resolution error;
//! `ato tree` additionally prints the materialized instance tree.

#![warn(missing_docs)]

mod check;
mod pipeline;
mod tree;

use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// ato: the hardware description language compiler front end.
#[derive(Parser, Debug)]
#[command(name = "ato", version, about = "ato front end")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to an `ato.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a build and report errors.
    Check(CheckArgs),
    /// Resolve a build and print its instance tree.
    Tree(TreeArgs),
}

/// Arguments for `ato check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Build name from `ato.toml` (default: `default` or the only build).
    pub build: Option<String>,
}

/// Arguments for `ato tree`.
#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Build name from `ato.toml` (default: `default` or the only build).
    pub build: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = TreeFormat::Text)]
    pub format: TreeFormat,
}

/// Instance tree output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// Indented text.
    Text,
    /// JSON document.
    Json,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    init_logging(cli.quiet, cli.verbose, color);

    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::Tree(ref args) => tree::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// The log filter used when `RUST_LOG` is unset.
fn default_filter(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "warn,ato_front=debug,ato_cli=debug",
        (false, _) => "debug,ato_front=trace,ato_ast=trace",
    }
}

fn init_logging(quiet: bool, verbose: u8, color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(quiet, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_check_default() {
        let cli = Cli::parse_from(["ato", "check"]);
        match cli.command {
            Command::Check(ref args) => assert!(args.build.is_none()),
            _ => panic!("expected Check command"),
        }
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn parse_tree_with_args() {
        let cli = Cli::parse_from([
            "ato", "-vv", "--config", "proj/ato.toml", "tree", "release", "--format", "json",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("proj/ato.toml"));
        match cli.command {
            Command::Tree(ref args) => {
                assert_eq!(args.build.as_deref(), Some("release"));
                assert_eq!(args.format, TreeFormat::Json);
            }
            _ => panic!("expected Tree command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ato", "check", "-q", "--color", "never"]);
        assert!(cli.quiet);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn filters_by_verbosity() {
        assert_eq!(default_filter(true, 3), "error");
        assert_eq!(default_filter(false, 0), "warn");
        assert!(default_filter(false, 1).contains("ato_front=debug"));
        assert!(default_filter(false, 5).contains("trace"));
    }
}
