//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Query and edit JSON documents by dotted path
#[derive(Parser, Debug)]
#[command(name = "dyntree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file to use instead of the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the value at a path (arrays on the path fan out)
    Get {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Dotted path; empty for the whole document
        #[arg(default_value = "")]
        path: String,
    },

    /// Print whether a path resolves
    Exists {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: String,
    },

    /// Write a value at a path, creating intermediate objects
    Set {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: String,
        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,
        /// Refuse to create missing intermediate objects
        #[arg(long)]
        strict: bool,
        /// Write the result back to FILE
        #[arg(short, long)]
        in_place: bool,
    },

    /// Remove the key at a path
    Delete {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: String,
        /// Write the result back to FILE
        #[arg(short, long)]
        in_place: bool,
    },

    /// Append a value to the array at a path
    Append {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: String,
        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,
        /// Write the result back to FILE
        #[arg(short, long)]
        in_place: bool,
    },

    /// Remove an element from the array at a path
    Remove {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: String,
        index: usize,
        /// Write the result back to FILE
        #[arg(short, long)]
        in_place: bool,
    },

    /// Print the length of the array at a path
    Count {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: String,
    },

    /// Show the document (or the value at a path) as a tree
    Tree {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(default_value = "")]
        path: String,
    },

    /// Re-indent a document using the configured indent and prefix
    Fmt {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write the result back to FILE
        #[arg(short, long)]
        in_place: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
