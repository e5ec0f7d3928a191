//! liftc - local type lifting
//!
//! CLI driver that loads a serialized module, lifts its locally defined types
//! to the top level and prints the result.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

/// Local type lifting
#[derive(Parser, Debug)]
#[command(name = "liftc")]
#[command(author, version, about = "Lift locally defined types to module top level")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format for diagnostics and summaries
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the local types of a serialized module
    Convert(commands::convert::ConvertArgs),

    /// Explain a diagnostic code
    Explain(commands::explain::ExplainArgs),
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, 2) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };
    // RUST_LOG still wins when set.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let use_color = !cli.no_color && !cli.quiet && atty::is(atty::Stream::Stderr);

    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Convert(args) => commands::convert::run(args, cli.format, use_color, cli.quiet),
        Commands::Explain(args) => commands::explain::run(args, cli.format, use_color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::parse_from(["liftc", "-vv", "convert", "m.json", "--emit", "json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Convert(args)) => {
                assert_eq!(args.input.to_str(), Some("m.json"));
                assert!(matches!(args.emit, commands::convert::EmitKind::Json));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
