use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Browse links interactively (default).
    Browse {
        /// Write logs to this file instead of discarding them
        #[clap(long)]
        log_file: Option<PathBuf>,
    },

    /// Search links and print them grouped by bucket
    Search {
        /// Search text. Empty lists everything.
        query: Option<String>,

        /// Only print this bucket (primary-source, domain, general)
        #[clap(short, long)]
        bucket: Option<String>,

        /// Print bucket counts only
        #[clap(short, long, default_value = "false")]
        count: bool,
    },

    /// Print a random selection of links
    Discover {
        /// How many links to draw
        #[clap(short = 'n', long)]
        count: Option<usize>,
    },

    /// Print search terms mined from link titles
    Suggest {
        /// How many terms to print
        #[clap(short = 'k', long)]
        count: Option<usize>,
    },

    /// Print the effective configuration
    Config {},
}
