//! Shared fixtures for the workflow integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tempfile::TempDir;

use desk_config::DeskConfig;
use desk_core::entities::{Company, Project, Status, User};
use desk_core::enums::StatusFunction;
use desk_db::service::DeskService;
use desk_workflow::mail::{EmailMessage, MailError, Mailer, SendOutcome};
use desk_workflow::{TaskPatch, TaskWorkflow};

// ---------------------------------------------------------------------------
// Mailers
// ---------------------------------------------------------------------------

/// Records every message; clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    log: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingMailer {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.log.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        let mut all: Vec<String> = self.messages().into_iter().flat_map(|m| m.to).collect();
        all.sort();
        all
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &EmailMessage) -> Result<SendOutcome, MailError> {
        self.log.lock().unwrap().push(message.clone());
        Ok(SendOutcome::all_sent(&message.to))
    }
}

/// Transport that is always down.
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _message: &EmailMessage) -> Result<SendOutcome, MailError> {
        Err(MailError::Transport("connection refused".into()))
    }
}

// ---------------------------------------------------------------------------
// Desk fixture
// ---------------------------------------------------------------------------

pub struct Desk {
    pub workflow: TaskWorkflow,
    pub mailer: RecordingMailer,
    pub company: Company,
    pub project: Project,
    pub other_project: Project,
    pub new: Status,
    pub in_progress: Status,
    pub closed: Status,
    pub actor: User,
    pub uploads: TempDir,
}

impl Desk {
    pub fn svc(&self) -> &DeskService {
        self.workflow.service()
    }

    /// A user in the fixture company, email `{username}@example.com`.
    pub async fn user(&self, username: &str) -> User {
        self.svc()
            .insert_user(
                username,
                &format!("{username}@example.com"),
                None,
                None,
                Some(&self.company.id),
            )
            .await
            .unwrap()
    }

    /// Minimal valid create body merged with `extra`.
    pub fn create_body(&self, extra: Value) -> TaskPatch {
        let mut body = serde_json::json!({
            "title": "Printer broken",
            "workType": "IT_SERVICE",
            "projectId": self.project.id,
            "statusId": self.new.id,
        });
        if let (Some(base), Value::Object(extra)) = (body.as_object_mut(), extra) {
            base.extend(extra);
        }
        patch(body)
    }
}

pub fn patch(body: Value) -> TaskPatch {
    TaskPatch::from_json(&body.to_string()).unwrap()
}

pub async fn desk() -> Desk {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = DeskConfig::default();
    config.mail.enabled = false;
    config.files.upload_dir = uploads.path().display().to_string();

    let svc = DeskService::new_local(":memory:").await.unwrap();
    let company = svc.insert_company("ACME").await.unwrap();
    let project = svc.insert_project("Office").await.unwrap();
    let other_project = svc.insert_project("Datacenter").await.unwrap();
    let new = svc
        .insert_status("New", "#ffffff", StatusFunction::New)
        .await
        .unwrap();
    let in_progress = svc
        .insert_status("In progress", "#ffaa00", StatusFunction::InProgress)
        .await
        .unwrap();
    let closed = svc
        .insert_status("Closed", "#000000", StatusFunction::Closed)
        .await
        .unwrap();
    let actor = svc
        .insert_user(
            "agent",
            "agent@example.com",
            Some("Ann"),
            Some("Agent"),
            Some(&company.id),
        )
        .await
        .unwrap();

    let mailer = RecordingMailer::default();
    let workflow = TaskWorkflow::new(svc, &config)
        .unwrap()
        .with_mailer(mailer.clone());

    Desk {
        workflow,
        mailer,
        company,
        project,
        other_project,
        new,
        in_progress,
        closed,
        actor,
        uploads,
    }
}
