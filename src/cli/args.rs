//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Filter-query tree editor: normalize trees and apply add/modify/remove edits
#[derive(Parser, Debug)]
#[command(name = "querytree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.querytree.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output format, overrides the configured one
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a tree and print it with fresh ids
    Normalize {
        /// Tree JSON file ("-" or absent: stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Apply an edit script to a tree
    Run {
        /// Edit script (add/modify/remove lines)
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,

        /// Initial tree JSON file (default: empty root group)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,

        /// Print the snapshot after every step, not only the last
        #[arg(short, long)]
        each: bool,
    },

    /// Render a tree as an indented outline
    Show {
        /// Tree JSON file ("-" or absent: stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// List the field, operator and combinator choices
    Options,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
