//! CLI argument definitions using clap
//!
//! Commands:
//! - couchbatch submit --config <path> [--all-or-nothing] [FILE]
//! - couchbatch read --config <path> <ID> [--conflicts]
//! - couchbatch info --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// couchbatch - bulk document writes with conflict detection
#[derive(Parser, Debug)]
#[command(name = "couchbatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a JSON array of documents in one batch
    Submit {
        /// Path to configuration file
        #[arg(long, default_value = "./couchbatch.json")]
        config: PathBuf,

        /// Write every document unconditionally, recording conflicts
        #[arg(long)]
        all_or_nothing: bool,

        /// File holding the batch; stdin when omitted
        file: Option<PathBuf>,
    },

    /// Read the current revision of a document
    Read {
        /// Path to configuration file
        #[arg(long, default_value = "./couchbatch.json")]
        config: PathBuf,

        /// Document id
        id: String,

        /// Include conflicting revisions
        #[arg(long)]
        conflicts: bool,
    },

    /// Show database metadata
    Info {
        /// Path to configuration file
        #[arg(long, default_value = "./couchbatch.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "couchbatch",
            "submit",
            "--config",
            "/etc/cb.json",
            "--all-or-nothing",
            "batch.json",
        ])
        .unwrap();

        match cli.command {
            Command::Submit {
                config,
                all_or_nothing,
                file,
            } => {
                assert_eq!(config, PathBuf::from("/etc/cb.json"));
                assert!(all_or_nothing);
                assert_eq!(file, Some(PathBuf::from("batch.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_read_defaults() {
        let cli = Cli::try_parse_from(["couchbatch", "--quiet", "read", "doc1"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Command::Read {
                config,
                id,
                conflicts,
            } => {
                assert_eq!(config, PathBuf::from("./couchbatch.json"));
                assert_eq!(id, "doc1");
                assert!(!conflicts);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_read_requires_id() {
        assert!(Cli::try_parse_from(["couchbatch", "read"]).is_err());
    }
}
