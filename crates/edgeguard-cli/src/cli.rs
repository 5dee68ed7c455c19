//! CLI structure and command definitions.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use edgeguard_types::LogLevel;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keygen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate, rotate, and expire JWT signing keys stored in Doppler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Doppler project
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Doppler config (environment) within the project
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Configuration file (default: ~/.edgeguard/config)
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Secret name prefix
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and store a new signing key
    Generate {
        /// Key size in bytes
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// List stored keys and their status
    List,

    /// Replace an active key with a new one
    Rotate {
        /// Id of the key to rotate
        key_id: String,
    },

    /// Delete inactive keys older than the retention window
    Cleanup {
        /// Retention window (e.g. 2160h, 90d)
        #[arg(long, value_name = "DURATION")]
        max_age: Option<String>,

        /// Only report what would be deleted
        #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
        dry_run: bool,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Check that a key's material is present and decodes
    Verify {
        /// Id of the key to check
        key_id: String,
    },

    /// List key material secrets that have no metadata
    Orphans,
}

impl Cli {
    /// Log level requested on the command line, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            return Some(LogLevel::Error);
        }
        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        use crate::commands::*;

        let session = Session::open(self)?;

        match &self.command {
            Commands::Generate { size } => generate::execute(&session, *size).await,
            Commands::List => list::execute(&session).await,
            Commands::Rotate { key_id } => rotate::execute(&session, key_id).await,
            Commands::Cleanup { max_age, dry_run, yes } => {
                cleanup::execute(&session, max_age.as_deref(), *dry_run, *yes).await
            }
            Commands::Verify { key_id } => verify::execute(&session, key_id).await,
            Commands::Orphans => orphans::execute(&session).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("keygen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cleanup_defaults_to_dry_run() {
        match parse(&["cleanup"]).command {
            Commands::Cleanup { max_age, dry_run, yes } => {
                assert_eq!(max_age, None);
                assert!(dry_run);
                assert!(!yes);
            }
            other => panic!("unexpected command {:?}", other),
        }

        match parse(&["cleanup", "--dry-run=false", "--max-age", "720h", "-y"]).command {
            Commands::Cleanup { max_age, dry_run, yes } => {
                assert_eq!(max_age.as_deref(), Some("720h"));
                assert!(!dry_run);
                assert!(yes);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["rotate", "KEY_1700000000", "--project", "edge-guard", "--config", "prd", "-vv"]);
        assert_eq!(cli.project.as_deref(), Some("edge-guard"));
        assert_eq!(cli.config.as_deref(), Some("prd"));
        assert_eq!(cli.log_level(), Some(LogLevel::Debug));
        assert!(matches!(cli.command, Commands::Rotate { ref key_id } if key_id == "KEY_1700000000"));
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["-q", "list"]).log_level(), Some(LogLevel::Error));
        assert_eq!(parse(&["-vvvv", "list"]).log_level(), Some(LogLevel::Trace));
        assert!(Cli::try_parse_from(["keygen", "-q", "-v", "list"]).is_err());
    }

    #[test]
    fn test_generate_size() {
        assert!(matches!(parse(&["generate", "--size", "64"]).command, Commands::Generate { size: Some(64) }));
        assert!(Cli::try_parse_from(["keygen", "rotate"]).is_err());
    }
}
