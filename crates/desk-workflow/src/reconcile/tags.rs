use serde_json::Value;
use tracing::debug;

use desk_core::entities::Task;

use crate::access::{Permission, require};
use crate::apply::Mutation;
use crate::error::WorkflowError;
use crate::patch::{RelationTarget, string_item};

impl Mutation<'_> {
    /// Replace the task's tags by title, creating unknown tags on the fly.
    pub(crate) async fn reconcile_tags(
        &mut self,
        task: &mut Task,
        raw: &Value,
    ) -> Result<(), WorkflowError> {
        let target = RelationTarget::parse("tag", raw)?;
        let old = task.tag_titles();
        task.tags.clear();

        for item in target.items() {
            let Some(title) = string_item("tag", item)? else {
                continue;
            };
            if task.tags.iter().any(|t| t.title == title) {
                continue;
            }
            let tag = match self.svc.find_tag_by_title(&title).await? {
                Some(tag) => {
                    require(
                        self.access,
                        self.actor,
                        Permission::AddTagToTask {
                            tag_id: tag.id.clone(),
                            task_id: task.id.clone(),
                        },
                    )?;
                    tag
                }
                None => {
                    let tag = self
                        .svc
                        .insert_tag(&title, self.tag_color, false, Some(self.actor.id.as_str()))
                        .await?;
                    debug!(tag = %tag.id, title = %tag.title, "created tag");
                    tag
                }
            };
            task.tags.push(tag);
        }

        self.ledger.record_set_change("tag", &old, &task.tag_titles());
        Ok(())
    }
}
