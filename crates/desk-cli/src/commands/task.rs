use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TaskCommands;
use crate::commands::shared::{parse_patch, read_body, rejected};
use crate::context::AppContext;
use crate::output::output;

/// Handle `desk task`.
pub async fn handle(action: &TaskCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        TaskCommands::Create { actor, body } => {
            let actor = ctx.actor(actor).await?;
            let patch = parse_patch(&read_body(body)?)?;
            let response = ctx
                .workflow
                .create_task(&actor, &patch)
                .await
                .map_err(rejected)?;
            output(&response, flags.format)
        }
        TaskCommands::Update { id, actor, body } => {
            let actor = ctx.actor(actor).await?;
            let patch = parse_patch(&read_body(body)?)?;
            let response = ctx
                .workflow
                .update_task(&actor, id, &patch)
                .await
                .map_err(rejected)?;
            output(&response, flags.format)
        }
        TaskCommands::Get { id } => {
            let task = ctx
                .service()
                .find_task(id)
                .await?
                .with_context(|| format!("task {id} not found"))?;
            output(&task, flags.format)
        }
    }
}
