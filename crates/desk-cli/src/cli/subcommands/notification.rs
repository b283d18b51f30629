use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum NotificationCommands {
    /// Newest notifications for a user.
    List {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}
