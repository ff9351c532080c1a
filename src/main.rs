use anyhow::Result;
use clap::{Parser, Subcommand};
use segscan::algorithm::search;

#[derive(Parser)]
#[command(name = "segscan")]
#[command(version = "0.1.0")]
#[command(about = "Partitioned k-mer search that merges hits into match segments", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the build sequences and report segments shared with the search sequences
    Search(search::SearchArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Search(args) => {
            search::run(args)?;
        }
    }
    Ok(())
}
