use crate::cli::{Commands, GlobalFlags};
use crate::context::AppContext;

mod notification;
mod seed;
mod shared;
mod task;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Seed => seed::handle(ctx, flags).await,
        Commands::Task { action } => task::handle(&action, ctx, flags).await,
        Commands::Notification { action } => notification::handle(&action, ctx, flags).await,
    }
}
