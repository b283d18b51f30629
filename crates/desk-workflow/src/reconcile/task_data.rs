use serde_json::Value;

use desk_core::entities::{Task, TaskData};
use desk_core::errors::CoreError;

use crate::apply::Mutation;
use crate::error::WorkflowError;
use crate::patch::task_data_entries;
use crate::validate::coerce_task_data;

fn display(data: &[TaskData]) -> Vec<String> {
    data.iter()
        .map(|d| format!("{}: {}", d.attribute.title, d.value.display()))
        .collect()
}

impl Mutation<'_> {
    /// Upsert or delete the custom attribute values named in `taskData`.
    pub(crate) async fn reconcile_task_data(
        &mut self,
        task: &mut Task,
        raw: &Value,
    ) -> Result<(), WorkflowError> {
        let entries = task_data_entries(raw)?;
        let old = display(&task.custom_data);

        for (attribute_id, value) in entries {
            let attribute = self
                .svc
                .find_task_attribute(&attribute_id)
                .await?
                .ok_or_else(|| {
                    CoreError::invalid(format!(
                        "Task attribute with id {attribute_id} does not exist"
                    ))
                })?;

            match coerce_task_data(&attribute, &value)? {
                None if attribute.required => {
                    return Err(CoreError::invalid(format!(
                        "Task attribute {} ({}) is required and cannot be removed",
                        attribute.title, attribute.id
                    ))
                    .into());
                }
                None => task.custom_data.retain(|d| d.attribute.id != attribute.id),
                Some(value) => {
                    if let Some(existing) = task
                        .custom_data
                        .iter_mut()
                        .find(|d| d.attribute.id == attribute.id)
                    {
                        existing.value = value;
                        existing.attribute = attribute;
                    } else {
                        task.custom_data.push(TaskData { attribute, value });
                    }
                }
            }
        }

        self.ledger
            .record_set_change("taskData", &old, &display(&task.custom_data));
        Ok(())
    }

    /// Every required, active attribute must have a value on a new task.
    pub(crate) async fn check_required_task_data(&self, task: &Task) -> Result<(), WorkflowError> {
        let missing: Vec<String> = self
            .svc
            .list_required_attributes()
            .await?
            .into_iter()
            .filter(|attr| !task.custom_data.iter().any(|d| d.attribute.id == attr.id))
            .map(|attr| attr.id)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(CoreError::invalid(format!(
            "Missing values for required task attributes: {}",
            missing.join(", ")
        ))
        .into())
    }
}
