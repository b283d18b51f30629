use clap::Subcommand;

/// Task commands. Bodies are JSON patches read from a file or `-` for stdin.
#[derive(Clone, Debug, Subcommand)]
pub enum TaskCommands {
    /// Create a task.
    Create {
        /// Acting user id.
        #[arg(long = "as")]
        actor: String,
        #[arg(long)]
        body: String,
    },
    /// Update a task.
    Update {
        id: String,
        /// Acting user id.
        #[arg(long = "as")]
        actor: String,
        #[arg(long)]
        body: String,
    },
    /// Get a task by ID.
    Get { id: String },
}
