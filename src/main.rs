use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use bagfilter::cli::{Cli, Commands};
use bagfilter::export::ExportOptions;
use bagfilter::filter::{FilterOptions, filter_bags};
use bagfilter::inspect::inspect_bags;
use bagfilter::selection::Grouping;

fn grouping(by_type: bool) -> Grouping {
    if by_type {
        Grouping::ByMessageType
    } else {
        Grouping::ByTopic
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { bags, by_type, json } => inspect_bags(&bags, grouping(by_type), json),
        Commands::Filter {
            bags,
            out_dir,
            by_type,
            all,
            toggle,
            pattern,
            invert,
            tool,
            parallel,
            dry_run,
            json,
        } => {
            let options = FilterOptions {
                bags,
                out_dirs: out_dir,
                grouping: grouping(by_type),
                select_all: all,
                toggle,
                pattern,
                invert,
                dry_run,
                json,
                export: ExportOptions { tool, parallel },
            };
            filter_bags(&options)
        }
    }
}
