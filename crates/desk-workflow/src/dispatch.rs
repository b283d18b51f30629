//! Email dispatch planner.
//!
//! One email per recipient group, rendered from the group's template. Send
//! failures never fail the mutation: they set the generic "contact the
//! administrator" message on the returned [`NotificationOutcome`].

use tracing::{debug, warn};

use desk_core::changes::{ChangeLedger, ChangeValue};
use desk_core::entities::{Task, User};
use desk_core::enums::RecipientRole;
use desk_core::responses::NotificationOutcome;

use crate::mail::{EmailMessage, Mailer};
use crate::notify::{EmailGroup, RoutePlan};
use crate::templates::{
    TEMPLATE_CHANGES, TEMPLATE_NEW_ASSIGNER, TEMPLATE_NEW_REQUESTER, TEMPLATE_OLD_ASSIGNER,
    TEMPLATE_OLD_REQUESTER, TemplateParams, TemplateRenderer, TemplateValue, escape_html,
};

pub const SEND_FAILURE_MESSAGE: &str =
    "Email notifications could not be sent, please contact the administrator";

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub from: String,
    pub subject_prefix: String,
    pub admin_contact: String,
}

impl DispatchSettings {
    #[must_use]
    pub fn failure_message(&self) -> String {
        if self.admin_contact.trim().is_empty() {
            SEND_FAILURE_MESSAGE.to_string()
        } else {
            format!("{SEND_FAILURE_MESSAGE}: {}", self.admin_contact.trim())
        }
    }
}

#[must_use]
pub const fn template_for(role: RecipientRole) -> &'static str {
    match role {
        RecipientRole::OldRequester => TEMPLATE_OLD_REQUESTER,
        RecipientRole::NewRequester => TEMPLATE_NEW_REQUESTER,
        RecipientRole::OldAssigners => TEMPLATE_OLD_ASSIGNER,
        RecipientRole::NewAssigners => TEMPLATE_NEW_ASSIGNER,
        RecipientRole::General => TEMPLATE_CHANGES,
    }
}

fn subject_for(role: RecipientRole, prefix: &str, title: &str) -> String {
    let text = match role {
        RecipientRole::OldRequester | RecipientRole::NewRequester => {
            format!("Requester of task {title} changed")
        }
        RecipientRole::OldAssigners | RecipientRole::NewAssigners => {
            format!("Assignees of task {title} changed")
        }
        RecipientRole::General => format!("Task {title} was updated"),
    };
    if prefix.is_empty() {
        text
    } else {
        format!("{prefix} {text}")
    }
}

fn show(value: &ChangeValue) -> String {
    match value {
        ChangeValue::Null => "-".to_string(),
        ChangeValue::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
        ChangeValue::Int(i) => i.to_string(),
        ChangeValue::Text(s) => s.clone(),
        ChangeValue::Date(d) => d.format("%Y-%m-%d %H:%M").to_string(),
    }
}

fn changes_html(ledger: &ChangeLedger) -> String {
    ledger
        .iter()
        .map(|record| {
            format!(
                "<li><strong>{}</strong>: {} &rarr; {}</li>",
                escape_html(&record.field),
                escape_html(&show(&record.from)),
                escape_html(&show(&record.to))
            )
        })
        .collect()
}

pub struct EmailDispatcher<'a> {
    mailer: &'a dyn Mailer,
    templates: &'a dyn TemplateRenderer,
    settings: &'a DispatchSettings,
}

impl<'a> EmailDispatcher<'a> {
    #[must_use]
    pub const fn new(
        mailer: &'a dyn Mailer,
        templates: &'a dyn TemplateRenderer,
        settings: &'a DispatchSettings,
    ) -> Self {
        Self {
            mailer,
            templates,
            settings,
        }
    }

    /// Send every group of `plan`, folding the outcomes together.
    #[must_use]
    pub fn dispatch_all(
        &self,
        task: &Task,
        actor: &User,
        ledger: &ChangeLedger,
        plan: &RoutePlan,
    ) -> NotificationOutcome {
        let mut outcome = NotificationOutcome::default();
        for group in &plan.groups {
            outcome.merge(self.dispatch(task, actor, ledger, group));
        }
        outcome
    }

    /// Render and send one group's email.
    #[must_use]
    pub fn dispatch(
        &self,
        task: &Task,
        actor: &User,
        ledger: &ChangeLedger,
        group: &EmailGroup,
    ) -> NotificationOutcome {
        let to = group.emails();
        if to.is_empty() {
            return NotificationOutcome::default();
        }

        let mut params = TemplateParams::new();
        params.insert("actor".into(), TemplateValue::Text(actor.display_name()));
        params.insert("task_title".into(), TemplateValue::Text(task.title.clone()));
        params.insert("task_id".into(), TemplateValue::Text(task.id.clone()));
        if group.role == RecipientRole::NewAssigners && group.recipients.len() > 1 {
            let names: Vec<&str> = group.recipients.iter().map(|r| r.username.as_str()).collect();
            params.insert(
                "other_assigners".into(),
                TemplateValue::Text(format!("Assigned together with: {}", names.join(", "))),
            );
        }
        if group.role == RecipientRole::General {
            params.insert("changes".into(), TemplateValue::Html(changes_html(ledger)));
        }

        let template = template_for(group.role);
        let body = match self.templates.render(template, &params) {
            Ok(body) => body,
            Err(e) => {
                warn!(template, error = %e, "email template failed to render");
                return self.failed();
            }
        };

        let message = EmailMessage {
            from: self.settings.from.clone(),
            to,
            subject: subject_for(group.role, &self.settings.subject_prefix, &task.title),
            body,
        };
        match self.mailer.send(&message) {
            Ok(sent) => {
                debug!(role = %group.role, sent = sent.sent.len(), "email dispatched");
                let error = if sent.failed.is_empty() {
                    None
                } else {
                    warn!(role = %group.role, failed = ?sent.failed, "email rejected for some recipients");
                    Some(self.settings.failure_message())
                };
                NotificationOutcome {
                    error,
                    sent_emails: sent.sent,
                }
            }
            Err(e) => {
                warn!(role = %group.role, error = %e, "email transport failed");
                self.failed()
            }
        }
    }

    fn failed(&self) -> NotificationOutcome {
        NotificationOutcome {
            error: Some(self.settings.failure_message()),
            sent_emails: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::Utc;
    use desk_core::changes::Recipient;
    use desk_core::entities::Status;
    use desk_core::enums::{StatusFunction, WorkType};
    use pretty_assertions::assert_eq;

    use crate::mail::{MailError, SendOutcome};
    use crate::templates::{RenderError, Templates};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        reject: Vec<String>,
        broken: bool,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, message: &EmailMessage) -> Result<SendOutcome, MailError> {
            if self.broken {
                return Err(MailError::Transport("smtp down".into()));
            }
            self.sent.lock().unwrap().push(message.clone());
            let (failed, sent): (Vec<String>, Vec<String>) = message
                .to
                .iter()
                .cloned()
                .partition(|to| self.reject.contains(to));
            Ok(SendOutcome { sent, failed })
        }
    }

    fn settings(admin: &str) -> DispatchSettings {
        DispatchSettings {
            from: "helpdesk@localhost".into(),
            subject_prefix: "[Helpdesk]".into(),
            admin_contact: admin.into(),
        }
    }

    fn user(name: &str) -> User {
        User {
            id: format!("usr-{name}"),
            username: name.into(),
            email: format!("{name}@example.com"),
            name: None,
            surname: None,
            company_id: None,
        }
    }

    fn task() -> Task {
        let now = Utc::now();
        let status = Status {
            id: "sts-1".into(),
            title: "New".into(),
            color: "#fff".into(),
            function: StatusFunction::New,
        };
        Task {
            id: "tsk-1".into(),
            title: "VPN down".into(),
            description: None,
            work_type: WorkType::RemoteSupport,
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
            requested_by: user("req"),
            created_by: user("req"),
            tags: Vec::new(),
            assignees: Vec::new(),
            attachments: Vec::new(),
            custom_data: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn group(role: RecipientRole, names: &[&str]) -> EmailGroup {
        EmailGroup {
            role,
            recipients: names.iter().map(|n| Recipient::from(&user(n))).collect(),
        }
    }

    fn plan(groups: Vec<EmailGroup>) -> RoutePlan {
        RoutePlan {
            notifications: Vec::new(),
            groups,
        }
    }

    #[test]
    fn general_email_lists_changes() {
        let mailer = RecordingMailer::default();
        let templates = Templates::builtin();
        let settings = settings("");
        let dispatcher = EmailDispatcher::new(&mailer, &templates, &settings);

        let mut ledger = ChangeLedger::new();
        ledger.record_if_changed("title", ChangeValue::text("A"), ChangeValue::text("B"));
        let outcome = dispatcher.dispatch(
            &task(),
            &user("actor"),
            &ledger,
            &group(RecipientRole::General, &["req", "a"]),
        );

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.sent_emails, vec!["req@example.com", "a@example.com"]);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "[Helpdesk] Task VPN down was updated");
        assert!(sent[0].body.contains("<li><strong>title</strong>: A &rarr; B</li>"));
    }

    #[test]
    fn new_assigner_email_names_the_others() {
        let mailer = RecordingMailer::default();
        let templates = Templates::builtin();
        let settings = settings("");
        let dispatcher = EmailDispatcher::new(&mailer, &templates, &settings);

        let _ = dispatcher.dispatch(
            &task(),
            &user("actor"),
            &ChangeLedger::new(),
            &group(RecipientRole::NewAssigners, &["a", "b"]),
        );
        let sent = mailer.sent.lock().unwrap();
        assert!(sent[0].body.contains("Assigned together with: a, b"));
    }

    #[test]
    fn transport_failure_sets_error_and_continues() {
        let mailer = RecordingMailer {
            broken: true,
            ..RecordingMailer::default()
        };
        let templates = Templates::builtin();
        let settings = settings("it@acme.test");
        let dispatcher = EmailDispatcher::new(&mailer, &templates, &settings);

        let outcome = dispatcher.dispatch_all(
            &task(),
            &user("actor"),
            &ChangeLedger::new(),
            &plan(vec![
                group(RecipientRole::OldRequester, &["r1"]),
                group(RecipientRole::NewRequester, &["r2"]),
            ]),
        );
        assert_eq!(
            outcome.error.as_deref(),
            Some("Email notifications could not be sent, please contact the administrator: it@acme.test")
        );
        assert!(outcome.sent_emails.is_empty());
    }

    #[test]
    fn partial_rejection_keeps_sent_addresses() {
        let mailer = RecordingMailer {
            reject: vec!["b@example.com".into()],
            ..RecordingMailer::default()
        };
        let templates = Templates::builtin();
        let settings = settings("");
        let dispatcher = EmailDispatcher::new(&mailer, &templates, &settings);

        let outcome = dispatcher.dispatch_all(
            &task(),
            &user("actor"),
            &ChangeLedger::new(),
            &plan(vec![
                group(RecipientRole::OldAssigners, &["a", "b"]),
                group(RecipientRole::NewAssigners, &["c"]),
            ]),
        );
        assert_eq!(outcome.error.as_deref(), Some(SEND_FAILURE_MESSAGE));
        assert_eq!(outcome.sent_emails, vec!["a@example.com", "c@example.com"]);
    }

    struct BrokenTemplates;

    impl TemplateRenderer for BrokenTemplates {
        fn render(&self, name: &str, _params: &TemplateParams) -> Result<String, RenderError> {
            Err(RenderError::UnknownTemplate(name.to_string()))
        }
    }

    #[test]
    fn template_failure_is_reported_not_raised() {
        let mailer = RecordingMailer::default();
        let settings = settings("");
        let dispatcher = EmailDispatcher::new(&mailer, &BrokenTemplates, &settings);

        let outcome = dispatcher.dispatch(
            &task(),
            &user("actor"),
            &ChangeLedger::new(),
            &group(RecipientRole::OldRequester, &["r1"]),
        );
        assert_eq!(outcome.error.as_deref(), Some(SEND_FAILURE_MESSAGE));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_group_sends_nothing() {
        let mailer = RecordingMailer::default();
        let templates = Templates::builtin();
        let settings = settings("");
        let dispatcher = EmailDispatcher::new(&mailer, &templates, &settings);

        let outcome = dispatcher.dispatch(
            &task(),
            &user("actor"),
            &ChangeLedger::new(),
            &group(RecipientRole::General, &[]),
        );
        assert_eq!(outcome, NotificationOutcome::default());
    }
}
