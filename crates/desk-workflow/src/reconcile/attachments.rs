use serde_json::Value;

use desk_core::entities::{Attachment, Task};
use desk_core::enums::EntityType;
use desk_core::errors::CoreError;

use crate::apply::Mutation;
use crate::error::WorkflowError;
use crate::patch::{RelationTarget, string_item};

impl Mutation<'_> {
    /// Replace the task's attachments by file slug.
    ///
    /// The file must be known to the metadata store (`NOT_FOUND` otherwise)
    /// and present on disk (`RESOURCE_NOT_FOUND` otherwise).
    pub(crate) async fn reconcile_attachments(
        &mut self,
        task: &mut Task,
        raw: &Value,
    ) -> Result<(), WorkflowError> {
        let target = RelationTarget::parse("attachment", raw)?;
        let old = task.attachment_names();
        task.attachments.clear();

        for item in target.items() {
            let Some(slug) = string_item("attachment", item)? else {
                continue;
            };
            if task.attachments.iter().any(|a| a.slug == slug) {
                continue;
            }
            let file = self
                .svc
                .find_file_by_slug(&slug)
                .await?
                .ok_or_else(|| CoreError::not_found(EntityType::File, &slug))?;
            if !self.files.exists_on_disk(&file) {
                return Err(CoreError::ResourceNotFound(format!(
                    "File {slug} is missing from storage"
                ))
                .into());
            }
            task.attachments.push(Attachment {
                slug,
                file_name: file.name,
            });
        }

        self.ledger
            .record_set_change("attachment", &old, &task.attachment_names());
        Ok(())
    }
}
