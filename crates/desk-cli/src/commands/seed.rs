use serde::Serialize;
use tracing::info;

use desk_core::enums::{AttributeType, StatusFunction};
use desk_db::service::DeskService;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedReport {
    company_id: String,
    project_id: String,
    statuses: Vec<SeededStatus>,
    users: Vec<SeededUser>,
    required_attribute_id: String,
}

#[derive(Debug, Serialize)]
struct SeededStatus {
    id: String,
    title: String,
    function: StatusFunction,
}

#[derive(Debug, Serialize)]
struct SeededUser {
    id: String,
    username: String,
    email: String,
}

const STATUSES: &[(&str, &str, StatusFunction)] = &[
    ("New", "#3c8dbc", StatusFunction::New),
    ("In progress", "#f39c12", StatusFunction::InProgress),
    ("Completed", "#00a65a", StatusFunction::Completed),
    ("Closed", "#222222", StatusFunction::Closed),
];

const USERS: &[(&str, &str, &str)] = &[
    ("agent", "Ann", "Agent"),
    ("tech", "Tom", "Tech"),
    ("customer", "Cleo", "Customer"),
];

/// Handle `desk seed`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = ctx.service();
    let tx = svc.begin().await?;
    match seed(svc).await {
        Ok(report) => {
            svc.commit(tx).await?;
            info!(users = report.users.len(), "demo data seeded");
            output(&report, flags.format)
        }
        Err(e) => {
            svc.rollback(tx).await?;
            Err(e)
        }
    }
}

async fn seed(svc: &DeskService) -> anyhow::Result<SeedReport> {
    let company = svc.insert_company("ACME").await?;
    let project = svc.insert_project("Office IT").await?;

    let mut statuses = Vec::with_capacity(STATUSES.len());
    for (title, color, function) in STATUSES {
        let status = svc.insert_status(title, color, *function).await?;
        statuses.push(SeededStatus {
            id: status.id,
            title: status.title,
            function: status.function,
        });
    }

    let mut users = Vec::with_capacity(USERS.len());
    for (username, name, surname) in USERS {
        let user = svc
            .insert_user(
                username,
                &format!("{username}@acme.test"),
                Some(*name),
                Some(*surname),
                Some(&company.id),
            )
            .await?;
        users.push(SeededUser {
            id: user.id,
            username: user.username,
            email: user.email,
        });
    }

    let attribute = svc
        .insert_task_attribute(
            "Contract",
            AttributeType::Select,
            true,
            true,
            &["gold".to_string(), "silver".to_string()],
        )
        .await?;

    Ok(SeedReport {
        company_id: company.id,
        project_id: project.id,
        statuses,
        users,
        required_attribute_id: attribute.id,
    })
}
