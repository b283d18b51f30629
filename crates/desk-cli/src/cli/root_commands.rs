use clap::Subcommand;

use crate::cli::subcommands::{NotificationCommands, TaskCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Insert demo statuses, users, a company, a project and a required attribute.
    Seed,
    /// Task mutations and lookup.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Notification inbox.
    Notification {
        #[command(subcommand)]
        action: NotificationCommands,
    },
}
