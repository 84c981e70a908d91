use clap::{ArgAction, Parser, Subcommand};

use crate::command::DEFAULT_FILTER_TOOL;

#[derive(Parser, Debug)]
#[command(name = "bagfilter", about = "Inspect ROS1 bag files and export copies filtered by topic", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List topics and message types across one or more bags
    Inspect {
        /// Paths to the .bag files
        bags: Vec<String>,
        /// Group rows by message type instead of topic
        #[arg(long = "by-type")]
        by_type: bool,
        /// Print the catalog as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Write a filtered copy of each bag keeping only the selected topics
    Filter {
        /// Paths to the .bag files
        bags: Vec<String>,
        /// Directory receiving the filtered bags (exactly one)
        #[arg(long = "out-dir", action = ArgAction::Append)]
        out_dir: Vec<String>,
        /// Select message types instead of topics
        #[arg(long = "by-type")]
        by_type: bool,
        /// Select every topic (or message type)
        #[arg(long = "all")]
        all: bool,
        /// Toggle one topic (or message type); can be repeated
        #[arg(long = "toggle", action = ArgAction::Append)]
        toggle: Vec<String>,
        /// Also select every key matching this regex
        #[arg(long = "match")]
        pattern: Option<String>,
        /// Invert the selection after all other edits
        #[arg(long = "invert")]
        invert: bool,
        /// Filter tool to run as `<tool> filter <in> <out> <expr>`
        #[arg(long = "tool", default_value = DEFAULT_FILTER_TOOL)]
        tool: String,
        /// Filter bags concurrently
        #[arg(long = "parallel")]
        parallel: bool,
        /// Print the filter commands without running them
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Print the export report as JSON
        #[arg(long = "json")]
        json: bool,
    },
}
