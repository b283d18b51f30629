use crate::cli::GlobalFlags;
use crate::cli::subcommands::NotificationCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `desk notification`.
pub async fn handle(
    action: &NotificationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        NotificationCommands::List { user, limit } => {
            let notifications = ctx
                .service()
                .list_notifications_for_user(user, *limit)
                .await?;
            output(&notifications, flags.format)
        }
    }
}
