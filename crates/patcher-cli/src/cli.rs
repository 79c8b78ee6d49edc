//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use patcher_core::ConflictPolicy;
use std::path::PathBuf;

/// Game Patcher - Manage file overlays for game modifications
#[derive(Parser, Debug)]
#[command(name = "patcher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing config.json and patches/
    #[arg(long, global = true, default_value = ".", env = "PATCHER_CONFIG_DIR")]
    pub config_dir: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Overlay the game's patch files onto its install directory
    ///
    /// Files that existed before patching are backed up first so the
    /// install can be reverted. Externally modified files are conflicts:
    /// pass --conflicts to settle them without prompting.
    Apply {
        /// Game name from config.json
        game: String,

        /// Conflict handling for externally modified files
        #[arg(long, value_enum)]
        conflicts: Option<ConflictsArg>,
    },

    /// Restore original files and clear tracking state
    Revert {
        /// Game name from config.json
        game: String,
    },

    /// Report drift between tracked files and the install directory
    Status {
        /// Game name from config.json
        game: String,
    },
}

/// Non-interactive conflict policy
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictsArg {
    /// Leave conflicted files untouched
    Abort,
    /// Overwrite conflicted files, discarding the drift
    Force,
    /// Adopt the drifted content as the new backup baseline
    Rebase,
}

impl From<ConflictsArg> for ConflictPolicy {
    fn from(arg: ConflictsArg) -> Self {
        match arg {
            ConflictsArg::Abort => ConflictPolicy::Abort,
            ConflictsArg::Force => ConflictPolicy::Force,
            ConflictsArg::Rebase => ConflictPolicy::RebaseBackup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_apply_with_policy() {
        let cli = Cli::try_parse_from(["patcher", "apply", "skyrim", "--conflicts", "rebase"])
            .unwrap();
        match cli.command {
            Commands::Apply { game, conflicts } => {
                assert_eq!(game, "skyrim");
                assert_eq!(conflicts, Some(ConflictsArg::Rebase));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_dir_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["patcher", "status", "skyrim"]).unwrap();
        assert_eq!(cli.config_dir, PathBuf::from("."));
    }

    #[test]
    fn policy_arg_maps_onto_core_policy() {
        assert_eq!(ConflictPolicy::from(ConflictsArg::Abort), ConflictPolicy::Abort);
        assert_eq!(ConflictPolicy::from(ConflictsArg::Force), ConflictPolicy::Force);
        assert_eq!(
            ConflictPolicy::from(ConflictsArg::Rebase),
            ConflictPolicy::RebaseBackup
        );
    }
}
