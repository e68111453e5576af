use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{PlanCommands, ProfileCommands, TaskCommands, UserCommands};

/// Command-line client for shared Plandeck plans
///
/// Plans are trees of tasks shared with other people through a Plandeck
/// server. Plans you create or join are remembered locally together with
/// their access keys, and stay usable while the server is unreachable.
#[derive(Parser)]
#[command(version, about, name = "pd")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/plandeck/plandeck.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Base URL of the Plandeck server
    #[arg(long, global = true, env = "PLANDECK_SERVER")]
    pub server: Option<String>,

    /// Minimum number of seconds between two refreshes of a plan
    #[arg(long, global = true, default_value_t = 10)]
    pub refresh_interval: u64,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Plandeck CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage tasks within plans
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage the users of a plan
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Show or change the profile used when creating plans
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}
