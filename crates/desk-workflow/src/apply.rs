//! Task patch applier.
//!
//! Applies the scalar and reference fields of a [`TaskPatch`] onto a task
//! aggregate, appending to the change ledger for every real change. Set-valued
//! relations are handled by `crate::reconcile`.

use chrono::Utc;
use tracing::debug;

use desk_core::changes::{ChangeLedger, ChangeRecord, ChangeValue, Recipient};
use desk_core::entities::{Task, User};
use desk_core::enums::EntityType;
use desk_core::errors::CoreError;
use desk_db::service::DeskService;

use crate::access::{AccessPolicy, Permission, require};
use crate::error::WorkflowError;
use crate::files::FileStore;
use crate::patch::TaskPatch;
use crate::validate::{ScalarField, parse_id, parse_timestamp, resolve_closed_at, validate_field};

/// Everything one create/update needs while it runs.
pub(crate) struct Mutation<'a> {
    pub(crate) svc: &'a DeskService,
    pub(crate) access: &'a dyn AccessPolicy,
    pub(crate) files: &'a dyn FileStore,
    pub(crate) actor: &'a User,
    pub(crate) tag_color: &'a str,
    pub(crate) is_create: bool,
    pub(crate) ledger: ChangeLedger,
}

impl Mutation<'_> {
    /// Apply every scalar and reference field present in `patch`.
    ///
    /// Order matters: `statusId` is resolved before `closedAt` so the closing
    /// rules see the resulting status.
    pub(crate) async fn apply_patch(
        &mut self,
        task: &mut Task,
        patch: &TaskPatch,
    ) -> Result<(), WorkflowError> {
        self.apply_scalars(task, patch)?;
        self.apply_project(task, patch).await?;
        self.apply_status(task, patch).await?;
        self.apply_requester(task, patch).await?;
        self.apply_company(task, patch).await?;
        self.apply_closed_at(task, patch)?;
        debug_assert!(task.closing_invariant_holds(), "closedAt out of step with status");
        Ok(())
    }

    fn apply_scalars(&mut self, task: &mut Task, patch: &TaskPatch) -> Result<(), CoreError> {
        for field in ScalarField::ORDERED {
            let Some(raw) = patch.scalar(field) else {
                continue;
            };
            let new = validate_field(field, raw)?;
            let old = field.read(task);
            if self
                .ledger
                .record_if_changed(field.name(), old.to_change_value(), new.to_change_value())
            {
                debug!(task = %task.id, field = field.name(), "field changed");
            }
            field.write(task, new)?;
        }
        Ok(())
    }

    async fn apply_project(&mut self, task: &mut Task, patch: &TaskPatch) -> Result<(), WorkflowError> {
        let Some(raw) = &patch.project_id else {
            return Ok(());
        };
        let new_project = match parse_id("projectId", raw)? {
            Some(id) => {
                let project = self
                    .svc
                    .find_project(&id)
                    .await?
                    .ok_or_else(|| CoreError::not_found(EntityType::Project, &id))?;
                require(
                    self.access,
                    self.actor,
                    Permission::CreateTaskInProject { project_id: id },
                )?;
                Some(project)
            }
            None if self.is_create => return Err(CoreError::invalid("projectId is required").into()),
            None => None,
        };

        let old_id = task.project.as_ref().map(|p| p.id.clone());
        let new_id = new_project.as_ref().map(|p| p.id.clone());
        if let Some(id) = &old_id {
            self.svc.touch_project(id).await?;
        }
        if let Some(id) = new_id.as_ref().filter(|id| Some(*id) != old_id.as_ref()) {
            self.svc.touch_project(id).await?;
        }

        if old_id != new_id {
            self.ledger.record(ChangeRecord::new(
                "project",
                ChangeValue::opt_text(task.project.as_ref().map(|p| p.title.as_str())),
                ChangeValue::opt_text(new_project.as_ref().map(|p| p.title.as_str())),
            ));
            if !task.assignees.is_empty() {
                debug!(task = %task.id, count = task.assignees.len(), "project switch clears assignees");
                task.assignees.clear();
            }
        }
        task.project = new_project;
        Ok(())
    }

    async fn apply_status(&mut self, task: &mut Task, patch: &TaskPatch) -> Result<(), WorkflowError> {
        let Some(raw) = &patch.status_id else {
            return Ok(());
        };
        let id = parse_id("statusId", raw)?
            .ok_or_else(|| CoreError::invalid("statusId is required"))?;
        let status = self
            .svc
            .find_status(&id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityType::Status, &id))?;

        let now = Utc::now();
        if status.id != task.status.id {
            self.ledger.record(ChangeRecord::new(
                "status",
                ChangeValue::text(task.status.title.as_str()),
                ChangeValue::text(status.title.as_str()),
            ));
        }
        task.status_change = Some(now);

        if status.function.starts_work() && patch.started_at.is_none() && task.started_at.is_none() {
            self.ledger
                .record_if_changed("startedAt", ChangeValue::Null, ChangeValue::Date(now));
            task.started_at = Some(now);
        }
        task.status = status;
        Ok(())
    }

    async fn apply_requester(&mut self, task: &mut Task, patch: &TaskPatch) -> Result<(), WorkflowError> {
        let Some(raw) = &patch.requester_id else {
            return Ok(());
        };
        let id = parse_id("requesterId", raw)?
            .ok_or_else(|| CoreError::invalid("requesterId must not be empty"))?;
        let requester = self
            .svc
            .find_user(&id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityType::User, &id))?;

        if requester.id != task.requested_by.id {
            let record = ChangeRecord::new(
                "requester",
                ChangeValue::text(task.requested_by.display_name()),
                ChangeValue::text(requester.display_name()),
            )
            .with_users(
                vec![Recipient::from(&task.requested_by)],
                vec![Recipient::from(&requester)],
            );
            self.ledger.record(record);
        }
        task.requested_by = requester;
        Ok(())
    }

    async fn apply_company(&mut self, task: &mut Task, patch: &TaskPatch) -> Result<(), WorkflowError> {
        let Some(raw) = &patch.company_id else {
            return Ok(());
        };
        let company = match parse_id("companyId", raw)? {
            Some(id) => Some(
                self.svc
                    .find_company(&id)
                    .await?
                    .ok_or_else(|| CoreError::not_found(EntityType::Company, &id))?,
            ),
            None => None,
        };
        let old_id = task.company.as_ref().map(|c| c.id.as_str());
        if old_id != company.as_ref().map(|c| c.id.as_str()) {
            self.ledger.record(ChangeRecord::new(
                "company",
                ChangeValue::opt_text(task.company.as_ref().map(|c| c.title.as_str())),
                ChangeValue::opt_text(company.as_ref().map(|c| c.title.as_str())),
            ));
        }
        task.company = company;
        Ok(())
    }

    fn apply_closed_at(&mut self, task: &mut Task, patch: &TaskPatch) -> Result<(), CoreError> {
        let supplied = patch
            .closed_at
            .as_ref()
            .map(|raw| parse_timestamp(ScalarField::ClosedAt.name(), raw))
            .transpose()?;
        let closed_at = resolve_closed_at(task.status.function, task.closed_at, supplied)?;
        self.ledger.record_if_changed(
            ScalarField::ClosedAt.name(),
            ChangeValue::opt_date(task.closed_at),
            ChangeValue::opt_date(closed_at),
        );
        task.closed_at = closed_at;
        Ok(())
    }
}
