//! Command-line interface definitions using clap.
//!
//! Plan, instance and goal inputs are JSON. Every `<json>` argument accepts a
//! file path, `-` for stdin, or an inline JSON value.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tempo_core::DeleteSession;

/// Command-line interface for the Tempo session-plan core
///
/// Tempo repairs session plans against their activity instances, reports
/// goal and target achievements, and keeps a local store of session
/// documents that is only written when a document actually changed.
#[derive(Parser)]
#[command(version, about, name = "tempo")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/tempo/tempo.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize a plan against its activity instances
    #[command(alias = "n")]
    Normalize(NormalizeArgs),
    /// Compute achieved and reverted targets and goals
    #[command(alias = "a")]
    Achievements(AchievementsArgs),
    /// Manage stored session documents
    #[command(alias = "s")]
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

/// Normalize a plan
///
/// Drops references to unknown or duplicated instances, resolves legacy
/// exercise entries to instances and prints the repaired plan.
#[derive(ClapArgs)]
pub struct NormalizeArgs {
    /// Plan document
    #[arg(long, value_name = "JSON")]
    pub plan: String,
    /// Array of activity instances
    #[arg(long, value_name = "JSON")]
    pub instances: String,
    /// Also show what the normalization changed
    #[arg(long)]
    pub report: bool,
    /// Print the normalized document as JSON
    #[arg(long)]
    pub json: bool,
}

/// Compute achievements
///
/// Evaluates every goal and target against the instances and prints what
/// changed relative to the previous satisfied snapshot.
#[derive(ClapArgs)]
pub struct AchievementsArgs {
    /// Array of activity instances
    #[arg(long, value_name = "JSON")]
    pub instances: String,
    /// Array of goals with their targets
    #[arg(long, value_name = "JSON")]
    pub goals: String,
    /// Previous tracker state: the `satisfied` object printed by `--json`
    #[arg(long, value_name = "JSON")]
    pub previous: Option<String>,
    /// Print events and the tracker state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Save a session document
///
/// Nothing is written when the document matches what is already stored.
#[derive(ClapArgs)]
pub struct SaveSessionArgs {
    /// Session identifier
    pub id: String,
    /// Plan document
    #[arg(long, value_name = "JSON")]
    pub plan: String,
    /// Normalize the plan against these instances before saving
    #[arg(long, value_name = "JSON")]
    pub instances: Option<String>,
}

/// Show a stored session
#[derive(ClapArgs)]
pub struct ShowSessionArgs {
    /// Session identifier
    pub id: String,
    /// Print the stored document as JSON
    #[arg(long)]
    pub json: bool,
}

/// Delete a stored session permanently
#[derive(ClapArgs)]
pub struct DeleteSessionArgs {
    /// Session identifier
    pub id: String,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

impl From<DeleteSessionArgs> for DeleteSession {
    fn from(val: DeleteSessionArgs) -> Self {
        DeleteSession {
            id: val.id,
            confirmed: val.confirm,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Save a plan document under a session ID
    Save(SaveSessionArgs),
    /// Show a stored session
    Show(ShowSessionArgs),
    /// List stored sessions
    #[command(alias = "ls")]
    List,
    /// Delete a stored session permanently
    #[command(alias = "rm")]
    Delete(DeleteSessionArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_delete_args_convert_to_params() {
        let params = DeleteSession::from(DeleteSessionArgs {
            id: "monday".to_string(),
            confirm: true,
        });
        assert_eq!(params.id, "monday");
        assert!(params.confirmed);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "tempo",
            "session",
            "list",
            "--no-color",
            "--database-file",
            "x.db",
        ])
        .unwrap();
        assert!(args.no_color);
        assert_eq!(args.database_file, Some(PathBuf::from("x.db")));
        assert!(matches!(
            args.command,
            Commands::Session {
                command: SessionCommands::List
            }
        ));
    }
}
