use clap::{Parser, Subcommand};
use tracing::Level;

use self::{analyze::AnalyzeArg, discretize::DiscretizeArg};

mod analyze;
mod discretize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compute statistics, discretize the dataset and write all reports
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Discretize a dataset against previously saved reference statistics
    Discretize(#[clap(flatten)] DiscretizeArg),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Discretize(arg) => discretize::run(&arg)?,
    }
    Ok(())
}
