use std::path::Path;

use anyhow::Context;
use desk_config::DeskConfig;
use desk_core::entities::User;
use desk_db::service::DeskService;
use desk_workflow::TaskWorkflow;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub workflow: TaskWorkflow,
}

impl AppContext {
    /// Open the database named by `database.path` and wire the workflow.
    pub async fn init(config: DeskConfig) -> anyhow::Result<Self> {
        let db_path = config.database.path.as_str();
        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        let service = DeskService::new_local(db_path)
            .await
            .with_context(|| format!("failed to open helpdesk database at {db_path}"))?;
        let workflow = TaskWorkflow::new(service, &config)
            .context("failed to initialize the task workflow")?;
        Ok(Self { workflow })
    }

    pub fn service(&self) -> &DeskService {
        self.workflow.service()
    }

    /// Resolve `--as <userId>` to the acting user.
    pub async fn actor(&self, user_id: &str) -> anyhow::Result<User> {
        self.service()
            .find_user(user_id)
            .await?
            .with_context(|| format!("unknown acting user {user_id}"))
    }
}
