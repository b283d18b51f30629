use serde_json::Value;

use desk_core::changes::Recipient;
use desk_core::entities::{Assignee, Task};
use desk_core::enums::EntityType;
use desk_core::errors::CoreError;

use crate::access::{Permission, require};
use crate::apply::Mutation;
use crate::error::WorkflowError;
use crate::patch::{AssigneeTarget, RelationTarget};

impl Mutation<'_> {
    /// Replace the task's assignees with `[{userId, statusId?}]`.
    ///
    /// A missing `statusId` takes the task's resulting status. The ledger
    /// record is written by [`Self::record_assigner_change`] once the final
    /// set is known, so a project-switch cascade is reported too.
    pub(crate) async fn reconcile_assignees(
        &mut self,
        task: &mut Task,
        raw: &Value,
    ) -> Result<(), WorkflowError> {
        let targets = RelationTarget::parse("assigned", raw)?
            .items()
            .iter()
            .map(AssigneeTarget::parse)
            .collect::<Result<Vec<_>, _>>()?;
        task.assignees.clear();

        for target in targets {
            let user = self
                .svc
                .find_user(&target.user_id)
                .await?
                .ok_or_else(|| CoreError::not_found(EntityType::User, &target.user_id))?;
            let status = match &target.status_id {
                Some(id) => self
                    .svc
                    .find_status(id)
                    .await?
                    .ok_or_else(|| CoreError::not_found(EntityType::Status, id))?,
                None => task.status.clone(),
            };
            require(
                self.access,
                self.actor,
                Permission::AssignUserToTask {
                    user_id: user.id.clone(),
                    task_id: task.id.clone(),
                },
            )?;

            if let Some(existing) = task.assignees.iter_mut().find(|a| a.user.id == user.id) {
                existing.status = status;
                existing.actual = true;
            } else {
                task.assignees.push(Assignee {
                    user,
                    status,
                    actual: true,
                });
            }
        }
        Ok(())
    }

    /// Record `assigner: old usernames -> new usernames` when the member set
    /// moved, carrying both user lists for the notification router.
    pub(crate) fn record_assigner_change(&mut self, before: &[Assignee], after: &[Assignee]) {
        let names = |list: &[Assignee]| -> Vec<String> {
            list.iter().map(|a| a.user.username.clone()).collect()
        };
        let users = |list: &[Assignee]| -> Vec<Recipient> {
            list.iter().map(|a| Recipient::from(&a.user)).collect()
        };
        if let Some(record) = self
            .ledger
            .record_set_change("assigner", &names(before), &names(after))
            .cloned()
        {
            self.ledger
                .record(record.with_users(users(before), users(after)));
        }
    }
}
