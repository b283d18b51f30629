//! Notification router.
//!
//! Reads the change ledger and splits the people affected by a mutation into
//! disjoint recipient groups, each with a notification body:
//!
//! - requester changes reach the old and new requester with fixed sentences
//! - assignee changes reach removed and added assignees with fixed sentences
//! - everyone else affected (current requester and assignees, when their own
//!   role did not change) gets the serialized ledger as a "general" body
//!
//! The acting user never notifies themselves.

use desk_core::changes::{ChangeLedger, ChangeRecord, Recipient};
use desk_core::entities::{Task, User};
use desk_core::enums::RecipientRole;

pub const BODY_NEW_REQUESTER: &str = "You are now the requester of this task.";
pub const BODY_OLD_REQUESTER: &str = "You are no longer the requester of this task.";
pub const BODY_NEW_ASSIGNER: &str = "You have been assigned to this task.";
pub const BODY_OLD_ASSIGNER: &str = "You are no longer assigned to this task.";

/// One notification row to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNotification {
    pub recipient: Recipient,
    pub role: RecipientRole,
    pub body: String,
}

/// Recipients who share one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailGroup {
    pub role: RecipientRole,
    pub recipients: Vec<Recipient>,
}

impl EmailGroup {
    #[must_use]
    pub fn emails(&self) -> Vec<String> {
        self.recipients.iter().map(|r| r.email.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePlan {
    pub notifications: Vec<PlannedNotification>,
    pub groups: Vec<EmailGroup>,
}

impl RoutePlan {
    #[must_use]
    pub fn group(&self, role: RecipientRole) -> Option<&EmailGroup> {
        self.groups.iter().find(|g| g.role == role)
    }

    #[must_use]
    pub fn notifications_for(&self, role: RecipientRole) -> Vec<&PlannedNotification> {
        self.notifications.iter().filter(|n| n.role == role).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    fn add(&mut self, recipient: &Recipient, role: RecipientRole, body: &str) {
        self.notifications.push(PlannedNotification {
            recipient: recipient.clone(),
            role,
            body: body.to_string(),
        });
        match self.groups.iter_mut().find(|g| g.role == role) {
            Some(group) => group.recipients.push(recipient.clone()),
            None => self.groups.push(EmailGroup {
                role,
                recipients: vec![recipient.clone()],
            }),
        }
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn contains_email(list: &[Recipient], email: &str) -> bool {
    list.iter().any(|r| same_email(&r.email, email))
}

/// Build the recipient groups for one mutation.
///
/// # Errors
///
/// Returns `serde_json::Error` if the ledger cannot be serialized for the
/// general body.
pub fn route(
    task: &Task,
    actor: &User,
    ledger: &ChangeLedger,
    is_create: bool,
) -> Result<RoutePlan, serde_json::Error> {
    if is_create {
        Ok(route_create(actor, ledger))
    } else {
        route_update(task, actor, ledger)
    }
}

fn route_create(actor: &User, ledger: &ChangeLedger) -> RoutePlan {
    let mut plan = RoutePlan::default();
    let is_actor = |r: &Recipient| same_email(&r.email, &actor.email);

    if let Some(record) = ledger.get("requester") {
        for requester in record.to_users.iter().filter(|r| !is_actor(r)) {
            plan.add(requester, RecipientRole::NewRequester, BODY_NEW_REQUESTER);
        }
    }

    if let Some(record) = ledger.get("assigner") {
        let mut notified: Vec<Recipient> = Vec::new();
        for assignee in &record.to_users {
            if is_actor(assignee) || contains_email(&notified, &assignee.email) {
                continue;
            }
            plan.add(assignee, RecipientRole::NewAssigners, BODY_NEW_ASSIGNER);
            notified.push(assignee.clone());
        }
    }
    plan
}

fn route_update(
    task: &Task,
    actor: &User,
    ledger: &ChangeLedger,
) -> Result<RoutePlan, serde_json::Error> {
    let mut plan = RoutePlan::default();
    if ledger.is_empty() {
        return Ok(plan);
    }
    let is_actor = |r: &Recipient| same_email(&r.email, &actor.email);

    // Old and new requesters are reached through their own groups only.
    let mut requester_parties: Vec<Recipient> = Vec::new();
    let requester_record = ledger.get("requester");
    if let Some(record) = requester_record {
        requester_parties.extend(record.from_users.iter().cloned());
        requester_parties.extend(record.to_users.iter().cloned());
        for old in record.from_users.iter().filter(|r| !is_actor(r)) {
            plan.add(old, RecipientRole::OldRequester, BODY_OLD_REQUESTER);
        }
        for new in record.to_users.iter().filter(|r| !is_actor(r)) {
            plan.add(new, RecipientRole::NewRequester, BODY_NEW_REQUESTER);
        }
    }

    // Everyone placed in an old/new assigner group.
    let mut assigner_recipients: Vec<Recipient> = Vec::new();
    let assigner_record = ledger.get("assigner");
    if let Some(record) = assigner_record {
        let (removed, added) = assignee_differences(record);
        for (people, role, body) in [
            (removed, RecipientRole::OldAssigners, BODY_OLD_ASSIGNER),
            (added, RecipientRole::NewAssigners, BODY_NEW_ASSIGNER),
        ] {
            for person in people {
                if is_actor(person) || contains_email(&assigner_recipients, &person.email) {
                    continue;
                }
                plan.add(person, role, body);
                assigner_recipients.push(person.clone());
            }
        }
    }

    let mut general: Vec<Recipient> = Vec::new();
    let mut consider = |candidate: Recipient| {
        if !is_actor(&candidate)
            && !contains_email(&assigner_recipients, &candidate.email)
            && !contains_email(&requester_parties, &candidate.email)
            && !contains_email(&general, &candidate.email)
        {
            general.push(candidate);
        }
    };
    if requester_record.is_none() {
        consider(Recipient::from(&task.requested_by));
    }
    if assigner_record.is_none() {
        for assignee in &task.assignees {
            consider(Recipient::from(&assignee.user));
        }
    }

    if !general.is_empty() {
        let body = ledger.to_json_body()?;
        for recipient in &general {
            plan.add(recipient, RecipientRole::General, &body);
        }
    }
    Ok(plan)
}

/// (old − new, new − old) by email.
fn assignee_differences(record: &ChangeRecord) -> (Vec<&Recipient>, Vec<&Recipient>) {
    let removed = record
        .from_users
        .iter()
        .filter(|r| !contains_email(&record.to_users, &r.email))
        .collect();
    let added = record
        .to_users
        .iter()
        .filter(|r| !contains_email(&record.from_users, &r.email))
        .collect();
    (removed, added)
}
