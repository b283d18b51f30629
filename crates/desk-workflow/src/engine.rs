//! `TaskWorkflow`: the create/update orchestrator.
//!
//! A mutation runs as one database transaction:
//! 1. Apply scalar and reference fields (`crate::apply`)
//! 2. Reconcile tags, assignees, attachments, task data (`crate::reconcile`)
//! 3. Persist the task row and relation rows
//! 4. Route the change ledger and insert notification rows
//! 5. Commit, then send emails
//!
//! Any error before the commit rolls back every write of the mutation. Email
//! failures happen after the commit and only show up in the returned
//! [`NotificationOutcome`](desk_core::responses::NotificationOutcome).

use chrono::Utc;
use tracing::{error, info, warn};

use desk_config::DeskConfig;
use desk_core::changes::ChangeLedger;
use desk_core::entities::{Assignee, Company, Task, User};
use desk_core::enums::EntityType;
use desk_core::errors::CoreError;
use desk_core::ids::PREFIX_TASK;
use desk_core::responses::TaskMutationResponse;
use desk_db::error::DatabaseError;
use desk_db::service::DeskService;

use crate::access::{AccessPolicy, AllowAll, Permission, require};
use crate::apply::Mutation;
use crate::dispatch::{DispatchSettings, EmailDispatcher};
use crate::error::WorkflowError;
use crate::files::{FileStore, LocalFileStore};
use crate::mail::{Mailer, OutboxMailer};
use crate::notify::{RoutePlan, route};
use crate::patch::TaskPatch;
use crate::templates::{TemplateRenderer, Templates};
use crate::validate::{ScalarField, parse_id, parse_work_type, validate_field};

/// Settings the engine reads from [`DeskConfig`].
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub tag_color: String,
    pub dispatch: DispatchSettings,
}

impl WorkflowSettings {
    #[must_use]
    pub fn from_config(config: &DeskConfig) -> Self {
        Self {
            tag_color: config.tags.default_color.clone(),
            dispatch: DispatchSettings {
                from: config.mail.from.clone(),
                subject_prefix: config.mail.subject_prefix.clone(),
                admin_contact: config.mail.admin_contact.clone(),
            },
        }
    }
}

pub struct TaskWorkflow {
    svc: DeskService,
    access: Box<dyn AccessPolicy>,
    files: Box<dyn FileStore>,
    mailer: Box<dyn Mailer>,
    templates: Box<dyn TemplateRenderer>,
    settings: WorkflowSettings,
}

impl TaskWorkflow {
    /// Wire the default collaborators from configuration: every permission
    /// granted, files under `files.upload_dir`, mail queued to the outbox
    /// (or dropped when `mail.enabled` is false), built-in templates with
    /// the optional override directory.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Rejected` if the outbox directory cannot be
    /// created.
    pub fn new(svc: DeskService, config: &DeskConfig) -> Result<Self, WorkflowError> {
        let mailer = if config.mail.is_configured() {
            OutboxMailer::new(&config.mail.outbox_dir)
                .map_err(|e| CoreError::Other(anyhow::anyhow!("mail outbox unavailable: {e}")))?
        } else {
            OutboxMailer::disabled()
        };
        let templates = config
            .mail
            .template_dir
            .as_deref()
            .map_or_else(Templates::builtin, Templates::with_override_dir);

        Ok(Self {
            svc,
            access: Box::new(AllowAll),
            files: Box::new(LocalFileStore::new(&config.files.upload_dir)),
            mailer: Box::new(mailer),
            templates: Box::new(templates),
            settings: WorkflowSettings::from_config(config),
        })
    }

    #[must_use]
    pub fn with_access_policy(mut self, access: impl AccessPolicy + 'static) -> Self {
        self.access = Box::new(access);
        self
    }

    #[must_use]
    pub fn with_file_store(mut self, files: impl FileStore + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    #[must_use]
    pub fn with_mailer(mut self, mailer: impl Mailer + 'static) -> Self {
        self.mailer = Box::new(mailer);
        self
    }

    #[must_use]
    pub fn with_templates(mut self, templates: impl TemplateRenderer + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    #[must_use]
    pub const fn service(&self) -> &DeskService {
        &self.svc
    }

    #[must_use]
    pub const fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    fn mutation<'a>(&'a self, actor: &'a User, is_create: bool) -> Mutation<'a> {
        Mutation {
            svc: &self.svc,
            access: self.access.as_ref(),
            files: self.files.as_ref(),
            actor,
            tag_color: &self.settings.tag_color,
            is_create,
            ledger: ChangeLedger::new(),
        }
    }

    /// Create a task from `patch` on behalf of `actor`.
    ///
    /// `title`, `workType`, `projectId` and `statusId` are required. The
    /// requester defaults to the actor and the company to the actor's
    /// company.
    ///
    /// # Errors
    ///
    /// Returns the first validation, lookup or permission failure; nothing
    /// is stored in that case.
    pub async fn create_task(
        &self,
        actor: &User,
        patch: &TaskPatch,
    ) -> Result<TaskMutationResponse, WorkflowError> {
        let tx = self.svc.begin().await?;
        match self.create_in_tx(actor, patch).await {
            Ok((task, ledger, plan)) => {
                self.svc.commit(tx).await?;
                info!(task = %task.id, actor = %actor.username, notifications = plan.notifications.len(), "task created");
                Ok(self.finish(task, actor, ledger, &plan))
            }
            Err(e) => {
                warn!(actor = %actor.username, error = %e, "task create rolled back");
                Err(keep_rejection(e, self.svc.rollback(tx).await))
            }
        }
    }

    /// Apply `patch` to task `task_id` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` for an unknown task, `ACCESS_DENIED` without the
    /// update permission, and otherwise the first failure of the patch; the
    /// task is left untouched in that case.
    pub async fn update_task(
        &self,
        actor: &User,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<TaskMutationResponse, WorkflowError> {
        let tx = self.svc.begin().await?;
        match self.update_in_tx(actor, task_id, patch).await {
            Ok((task, ledger, plan)) => {
                self.svc.commit(tx).await?;
                info!(task = %task.id, actor = %actor.username, changes = ledger.len(), notifications = plan.notifications.len(), "task updated");
                Ok(self.finish(task, actor, ledger, &plan))
            }
            Err(e) => {
                warn!(task = task_id, actor = %actor.username, error = %e, "task update rolled back");
                Err(keep_rejection(e, self.svc.rollback(tx).await))
            }
        }
    }

    async fn create_in_tx(
        &self,
        actor: &User,
        patch: &TaskPatch,
    ) -> Result<(Task, ChangeLedger, RoutePlan), WorkflowError> {
        let title = match patch.title.as_ref() {
            Some(raw) => validate_field(ScalarField::Title, raw)?,
            None => return Err(CoreError::invalid("title is required").into()),
        };
        let work_type = match patch.work_type.as_ref() {
            Some(raw) => parse_work_type(raw)?,
            None => return Err(CoreError::invalid("workType is required").into()),
        };
        if patch.project_id.is_none() {
            return Err(CoreError::invalid("projectId is required").into());
        }
        let status_id = patch
            .status_id
            .as_ref()
            .map(|raw| parse_id("statusId", raw))
            .transpose()?
            .flatten()
            .ok_or_else(|| CoreError::invalid("statusId is required"))?;
        let status = self
            .svc
            .find_status(&status_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityType::Status, &status_id))?;

        let now = Utc::now();
        let mut task = Task {
            id: self.svc.db().generate_id(PREFIX_TASK).await?,
            title: String::new(),
            description: None,
            work_type,
            important: false,
            work: None,
            work_time: None,
            started_at: None,
            deadline: None,
            closed_at: None,
            status_change: None,
            status,
            project: None,
            company: None,
            requested_by: actor.clone(),
            created_by: actor.clone(),
            tags: Vec::new(),
            assignees: Vec::new(),
            attachments: Vec::new(),
            custom_data: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        ScalarField::Title.write(&mut task, title)?;

        let mut mutation = self.mutation(actor, true);
        mutation.apply_patch(&mut task, patch).await?;
        if task.company.is_none() {
            task.company = Some(self.default_company(actor).await?);
        }
        Self::reconcile_relations(&mut mutation, &mut task, patch).await?;
        mutation.check_required_task_data(&task).await?;
        mutation.record_assigner_change(&[], &task.assignees);

        self.svc.insert_task_row(&task).await?;
        self.save_relations(&task).await?;

        let ledger = mutation.ledger;
        let plan = self.store_notifications(&task, actor, &ledger, true).await?;
        let task = self.svc.get_task(&task.id).await?;
        Ok((task, ledger, plan))
    }

    async fn update_in_tx(
        &self,
        actor: &User,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<(Task, ChangeLedger, RoutePlan), WorkflowError> {
        let mut task = self
            .svc
            .find_task(task_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityType::Task, task_id))?;
        require(
            self.access.as_ref(),
            actor,
            Permission::UpdateTask {
                task_id: task.id.clone(),
            },
        )?;
        let before: Vec<Assignee> = task.assignees.clone();

        let mut mutation = self.mutation(actor, false);
        mutation.apply_patch(&mut task, patch).await?;
        Self::reconcile_relations(&mut mutation, &mut task, patch).await?;
        mutation.record_assigner_change(&before, &task.assignees);

        self.svc.save_task_fields(&task).await?;
        self.save_relations(&task).await?;

        let ledger = mutation.ledger;
        let plan = self.store_notifications(&task, actor, &ledger, false).await?;
        let task = self.svc.get_task(&task.id).await?;
        Ok((task, ledger, plan))
    }

    async fn default_company(
        &self,
        actor: &User,
    ) -> Result<Company, WorkflowError> {
        let Some(id) = actor.company_id.as_deref() else {
            return Err(CoreError::invalid(
                "companyId is required when the acting user has no company",
            )
            .into());
        };
        let company = self
            .svc
            .find_company(id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityType::Company, id))?;
        Ok(company)
    }

    async fn reconcile_relations(
        mutation: &mut Mutation<'_>,
        task: &mut Task,
        patch: &TaskPatch,
    ) -> Result<(), WorkflowError> {
        if let Some(raw) = &patch.tag {
            mutation.reconcile_tags(task, raw).await?;
        }
        if let Some(raw) = &patch.assigned {
            mutation.reconcile_assignees(task, raw).await?;
        }
        if let Some(raw) = &patch.attachment {
            mutation.reconcile_attachments(task, raw).await?;
        }
        if let Some(raw) = &patch.task_data {
            mutation.reconcile_task_data(task, raw).await?;
        }
        Ok(())
    }

    async fn save_relations(&self, task: &Task) -> Result<(), WorkflowError> {
        self.svc.replace_task_tags(&task.id, &task.tags).await?;
        self.svc
            .replace_task_assignees(&task.id, &task.assignees)
            .await
            .map_err(|e| WorkflowError::assignees_not_saved(&e))?;
        self.svc
            .replace_task_attachments(&task.id, &task.attachments)
            .await?;
        self.svc.replace_task_data(&task.id, &task.custom_data).await?;
        Ok(())
    }

    async fn store_notifications(
        &self,
        task: &Task,
        actor: &User,
        ledger: &ChangeLedger,
        is_create: bool,
    ) -> Result<RoutePlan, WorkflowError> {
        let plan = route(task, actor, ledger, is_create)
            .map_err(|e| CoreError::Other(anyhow::Error::new(e)))?;
        let title = format!("Task {}", task.title);
        for planned in &plan.notifications {
            self.svc
                .insert_notification(
                    &task.id,
                    &actor.id,
                    &planned.recipient.user_id,
                    &title,
                    &planned.body,
                )
                .await?;
        }
        Ok(plan)
    }

    fn finish(
        &self,
        task: Task,
        actor: &User,
        changes: ChangeLedger,
        plan: &RoutePlan,
    ) -> TaskMutationResponse {
        let dispatcher = EmailDispatcher::new(
            self.mailer.as_ref(),
            self.templates.as_ref(),
            &self.settings.dispatch,
        );
        let notifications = dispatcher.dispatch_all(&task, actor, &changes, plan);
        TaskMutationResponse {
            task,
            changes,
            notifications,
        }
    }
}

/// The failure that aborted a mutation is what the caller sees, even when
/// the rollback after it fails too.
fn keep_rejection(rejection: WorkflowError, rollback: Result<(), DatabaseError>) -> WorkflowError {
    if let Err(rollback_err) = rollback {
        error!(error = %rollback_err, rejection = %rejection, "rollback failed");
    }
    rejection
}
