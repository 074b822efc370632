pub mod pipe;
pub mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "navfilter")]
#[command(about = "Request disposition engine - block, redirect or allow outgoing requests")]
#[command(version)]
pub struct Cli {
    /// Path to the rule-set file (the built-in rules are used if it does not exist)
    #[arg(short, long, default_value = "navfilter.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single URL
    Check {
        /// Absolute URL of the request
        url: String,
        /// Resource category tag (e.g., mainFrame, navigation, script, xhr)
        #[arg(long, default_value = "mainFrame")]
        category: String,
        /// Print the host callback response as JSON
        #[arg(long, conflicts_with = "explain")]
        json: bool,
        /// Print the full evaluation (disposition, tier, rule, reason) as JSON
        #[arg(long)]
        explain: bool,
    },
    /// Show the effective rule table in evaluation order
    Rules,
    /// Load and compile the rule set, reporting any error
    Validate,
    /// Write the built-in rule set to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Read "<category> <url>" lines from stdin, answer one JSON response per line
    Pipe {
        /// Reload the rule set when the config file changes
        #[arg(long)]
        watch: bool,
    },
}
