//! Task repository: aggregate load, row insert/save, relation row replacement.
//!
//! Relations are stored clear-then-repopulate: `replace_task_*` deletes every
//! row for the task and re-inserts the given members with their list
//! position, so the aggregate round-trips in the order the engine built it.

use chrono::Utc;

use desk_core::entities::{Assignee, Attachment, Tag, Task, TaskData, TaskDataValue};
use desk_core::enums::AttributeType;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_string, opt_datetime_value, opt_text_value, parse_datetime, parse_enum,
    parse_optional_datetime,
};
use crate::repos::attribute::row_to_attribute;
use crate::repos::status::row_to_status;
use crate::repos::tag::row_to_tag;
use crate::repos::user::row_to_user;
use crate::service::DeskService;

const SELECT_COLS: &str = "id, title, description, work_type, important, work, work_time, \
     started_at, deadline, closed_at, status_change, status_id, project_id, company_id, \
     requested_by, created_by, created_at, updated_at";

/// Scalar columns of a task row; references are resolved afterwards.
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    work_type: String,
    important: bool,
    work: Option<String>,
    work_time: Option<String>,
    started_at: Option<String>,
    deadline: Option<String>,
    closed_at: Option<String>,
    status_change: Option<String>,
    status_id: String,
    project_id: Option<String>,
    company_id: Option<String>,
    requested_by: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

fn row_to_task_row(row: &libsql::Row) -> Result<TaskRow, DatabaseError> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        work_type: row.get(3)?,
        important: get_bool(row, 4)?,
        work: get_opt_string(row, 5)?,
        work_time: get_opt_string(row, 6)?,
        started_at: get_opt_string(row, 7)?,
        deadline: get_opt_string(row, 8)?,
        closed_at: get_opt_string(row, 9)?,
        status_change: get_opt_string(row, 10)?,
        status_id: row.get(11)?,
        project_id: get_opt_string(row, 12)?,
        company_id: get_opt_string(row, 13)?,
        requested_by: row.get(14)?,
        created_by: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

fn dangling(what: &str, id: &str) -> DatabaseError {
    DatabaseError::DanglingReference {
        what: what.to_string(),
        id: id.to_string(),
    }
}

fn task_data_columns(value: &TaskDataValue) -> (libsql::Value, libsql::Value, libsql::Value) {
    match value {
        TaskDataValue::Text(text) => (text.clone().into(), libsql::Value::Null, libsql::Value::Null),
        TaskDataValue::Bool(flag) => (
            libsql::Value::Null,
            i64::from(*flag).into(),
            libsql::Value::Null,
        ),
        TaskDataValue::Date(epoch) => (libsql::Value::Null, libsql::Value::Null, (*epoch).into()),
    }
}

impl DeskService {
    /// Load the full task aggregate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no task has this id.
    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        self.find_task(id).await?.ok_or(DatabaseError::NoResult)
    }

    pub async fn find_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"), [id])
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let raw = row_to_task_row(&row)?;
        drop(rows);

        let status = self
            .find_status(&raw.status_id)
            .await?
            .ok_or_else(|| dangling("status", &raw.status_id))?;
        let project = match raw.project_id.as_deref() {
            Some(pid) => Some(self.find_project(pid).await?.ok_or_else(|| dangling("project", pid))?),
            None => None,
        };
        let company = match raw.company_id.as_deref() {
            Some(cid) => Some(self.find_company(cid).await?.ok_or_else(|| dangling("company", cid))?),
            None => None,
        };
        let requested_by = self
            .find_user(&raw.requested_by)
            .await?
            .ok_or_else(|| dangling("user", &raw.requested_by))?;
        let created_by = self
            .find_user(&raw.created_by)
            .await?
            .ok_or_else(|| dangling("user", &raw.created_by))?;

        Ok(Some(Task {
            tags: self.load_task_tags(&raw.id).await?,
            assignees: self.load_task_assignees(&raw.id).await?,
            attachments: self.load_task_attachments(&raw.id).await?,
            custom_data: self.load_task_data(&raw.id).await?,
            id: raw.id,
            title: raw.title,
            description: raw.description,
            work_type: parse_enum(&raw.work_type)?,
            important: raw.important,
            work: raw.work,
            work_time: raw.work_time,
            started_at: parse_optional_datetime(raw.started_at.as_deref())?,
            deadline: parse_optional_datetime(raw.deadline.as_deref())?,
            closed_at: parse_optional_datetime(raw.closed_at.as_deref())?,
            status_change: parse_optional_datetime(raw.status_change.as_deref())?,
            status,
            project,
            company,
            requested_by,
            created_by,
            created_at: parse_datetime(&raw.created_at)?,
            updated_at: parse_datetime(&raw.updated_at)?,
        }))
    }

    /// Insert a new task row and all of its relation rows.
    pub async fn insert_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.insert_task_row(task).await?;
        self.replace_task_tags(&task.id, &task.tags).await?;
        self.replace_task_assignees(&task.id, &task.assignees).await?;
        self.replace_task_attachments(&task.id, &task.attachments).await?;
        self.replace_task_data(&task.id, &task.custom_data).await?;
        Ok(())
    }

    /// Insert only the `tasks` row; relation rows are written separately.
    pub async fn insert_task_row(&self, task: &Task) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO tasks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
                ),
                libsql::params_from_iter(vec![
                    libsql::Value::from(task.id.clone()),
                    task.title.clone().into(),
                    opt_text_value(task.description.as_deref()),
                    task.work_type.as_str().to_string().into(),
                    i64::from(task.important).into(),
                    opt_text_value(task.work.as_deref()),
                    opt_text_value(task.work_time.as_deref()),
                    opt_datetime_value(task.started_at),
                    opt_datetime_value(task.deadline),
                    opt_datetime_value(task.closed_at),
                    opt_datetime_value(task.status_change),
                    task.status.id.clone().into(),
                    opt_text_value(task.project.as_ref().map(|p| p.id.as_str())),
                    opt_text_value(task.company.as_ref().map(|c| c.id.as_str())),
                    task.requested_by.id.clone().into(),
                    task.created_by.id.clone().into(),
                    task.created_at.to_rfc3339().into(),
                    task.updated_at.to_rfc3339().into(),
                ]),
            )
            .await?;
        Ok(())
    }

    /// Write every scalar and reference column of an existing task and bump
    /// `updated_at`. Relation rows are left alone.
    pub async fn save_task_fields(&self, task: &Task) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, work_type = ?3, important = ?4, \
                 work = ?5, work_time = ?6, started_at = ?7, deadline = ?8, closed_at = ?9, \
                 status_change = ?10, status_id = ?11, project_id = ?12, company_id = ?13, \
                 requested_by = ?14, updated_at = ?15 WHERE id = ?16",
                libsql::params_from_iter(vec![
                    libsql::Value::from(task.title.clone()),
                    opt_text_value(task.description.as_deref()),
                    task.work_type.as_str().to_string().into(),
                    i64::from(task.important).into(),
                    opt_text_value(task.work.as_deref()),
                    opt_text_value(task.work_time.as_deref()),
                    opt_datetime_value(task.started_at),
                    opt_datetime_value(task.deadline),
                    opt_datetime_value(task.closed_at),
                    opt_datetime_value(task.status_change),
                    task.status.id.clone().into(),
                    opt_text_value(task.project.as_ref().map(|p| p.id.as_str())),
                    opt_text_value(task.company.as_ref().map(|c| c.id.as_str())),
                    task.requested_by.id.clone().into(),
                    Utc::now().to_rfc3339().into(),
                    task.id.clone().into(),
                ]),
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    pub async fn replace_task_tags(&self, task_id: &str, tags: &[Tag]) -> Result<(), DatabaseError> {
        let conn = self.db().conn();
        conn.execute("DELETE FROM task_tags WHERE task_id = ?1", [task_id])
            .await?;
        for (position, tag) in (0_i64..).zip(tags) {
            conn.execute(
                "INSERT INTO task_tags (task_id, tag_id, position) VALUES (?1, ?2, ?3)",
                libsql::params![task_id, tag.id.as_str(), position],
            )
            .await?;
        }
        Ok(())
    }

    pub async fn replace_task_assignees(
        &self,
        task_id: &str,
        assignees: &[Assignee],
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn();
        conn.execute("DELETE FROM task_assignees WHERE task_id = ?1", [task_id])
            .await?;
        for (position, assignee) in (0_i64..).zip(assignees) {
            conn.execute(
                "INSERT INTO task_assignees (task_id, user_id, status_id, actual, position) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    task_id,
                    assignee.user.id.as_str(),
                    assignee.status.id.as_str(),
                    i64::from(assignee.actual),
                    position
                ],
            )
            .await?;
        }
        Ok(())
    }

    pub async fn replace_task_attachments(
        &self,
        task_id: &str,
        attachments: &[Attachment],
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn();
        conn.execute("DELETE FROM task_attachments WHERE task_id = ?1", [task_id])
            .await?;
        for (position, attachment) in (0_i64..).zip(attachments) {
            conn.execute(
                "INSERT INTO task_attachments (task_id, slug, position) VALUES (?1, ?2, ?3)",
                libsql::params![task_id, attachment.slug.as_str(), position],
            )
            .await?;
        }
        Ok(())
    }

    pub async fn replace_task_data(
        &self,
        task_id: &str,
        data: &[TaskData],
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn();
        conn.execute("DELETE FROM task_data WHERE task_id = ?1", [task_id])
            .await?;
        for (position, entry) in (0_i64..).zip(data) {
            let (text, flag, date) = task_data_columns(&entry.value);
            conn.execute(
                "INSERT INTO task_data (task_id, attribute_id, value_text, value_bool, value_date, position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params_from_iter(vec![
                    libsql::Value::from(task_id.to_string()),
                    entry.attribute.id.clone().into(),
                    text,
                    flag,
                    date,
                    position.into(),
                ]),
            )
            .await?;
        }
        Ok(())
    }

    async fn load_task_tags(&self, task_id: &str) -> Result<Vec<Tag>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT t.id, t.title, t.color, t.public, t.created_by \
                 FROM task_tags tt JOIN tags t ON t.id = tt.tag_id \
                 WHERE tt.task_id = ?1 ORDER BY tt.position",
                [task_id],
            )
            .await?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            tags.push(row_to_tag(&row)?);
        }
        Ok(tags)
    }

    async fn load_task_assignees(&self, task_id: &str) -> Result<Vec<Assignee>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT u.id, u.username, u.email, u.name, u.surname, u.company_id, \
                 s.id, s.title, s.color, s.function, ta.actual \
                 FROM task_assignees ta \
                 JOIN users u ON u.id = ta.user_id \
                 JOIN statuses s ON s.id = ta.status_id \
                 WHERE ta.task_id = ?1 ORDER BY ta.position",
                [task_id],
            )
            .await?;
        let mut assignees = Vec::new();
        while let Some(row) = rows.next().await? {
            assignees.push(Assignee {
                user: row_to_user(&row, 0)?,
                status: row_to_status(&row, 6)?,
                actual: get_bool(&row, 10)?,
            });
        }
        Ok(assignees)
    }

    async fn load_task_attachments(&self, task_id: &str) -> Result<Vec<Attachment>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT ta.slug, f.name FROM task_attachments ta \
                 JOIN files f ON f.slug = ta.slug \
                 WHERE ta.task_id = ?1 ORDER BY ta.position",
                [task_id],
            )
            .await?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next().await? {
            attachments.push(Attachment {
                slug: row.get(0)?,
                file_name: row.get(1)?,
            });
        }
        Ok(attachments)
    }

    async fn load_task_data(&self, task_id: &str) -> Result<Vec<TaskData>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT a.id, a.title, a.attribute_type, a.required, a.active, a.options, \
                 d.value_text, d.value_bool, d.value_date \
                 FROM task_data d JOIN task_attributes a ON a.id = d.attribute_id \
                 WHERE d.task_id = ?1 ORDER BY d.position",
                [task_id],
            )
            .await?;
        let mut data = Vec::new();
        while let Some(row) = rows.next().await? {
            let attribute = row_to_attribute(&row, 0)?;
            let value = match attribute.attribute_type {
                AttributeType::Checkbox => {
                    TaskDataValue::Bool(row.get::<Option<i64>>(7)?.unwrap_or(0) != 0)
                }
                AttributeType::Date => TaskDataValue::Date(
                    row.get::<Option<i64>>(8)?
                        .ok_or_else(|| dangling("date value for attribute", &attribute.id))?,
                ),
                _ => TaskDataValue::Text(get_opt_string(&row, 6)?.unwrap_or_default()),
            };
            data.push(TaskData { attribute, value });
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use desk_core::entities::{Assignee, Attachment, Task, TaskData, TaskDataValue};
    use desk_core::enums::{AttributeType, StatusFunction, WorkType};
    use desk_core::ids::PREFIX_TASK;

    use crate::error::DatabaseError;
    use crate::service::DeskService;
    use crate::test_support::helpers::{seed_status, seed_user, test_service};

    async fn sample_task(svc: &DeskService) -> Task {
        let status = seed_status(svc, "New", StatusFunction::New).await;
        let requester = seed_user(svc, "requester").await;
        let id = svc.db().generate_id(PREFIX_TASK).await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Task {
            id,
            title: "Printer broken".into(),
            description: None,
            work_type: WorkType::ItService,
            important: false,
            work: None,
            work_time: None,
            started_at: None,
            deadline: None,
            closed_at: None,
            status_change: Some(now),
            status,
            project: None,
            company: None,
            requested_by: requester.clone(),
            created_by: requester,
            tags: Vec::new(),
            assignees: Vec::new(),
            attachments: Vec::new(),
            custom_data: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_get_roundtrips_aggregate() {
        let svc = test_service().await;
        let mut task = sample_task(&svc).await;

        let agent = seed_user(&svc, "agent").await;
        let tag = svc.insert_tag("printer", "#20b2aa", false, None).await.unwrap();
        svc.insert_file("jam-photo", "jam.jpg", "jam.jpg").await.unwrap();
        let asset = svc
            .insert_task_attribute("Asset", AttributeType::Input, true, true, &[])
            .await
            .unwrap();
        let due = svc
            .insert_task_attribute("Due", AttributeType::Date, false, true, &[])
            .await
            .unwrap();

        task.tags = vec![tag];
        task.assignees = vec![Assignee {
            user: agent,
            status: task.status.clone(),
            actual: true,
        }];
        task.attachments = vec![Attachment {
            slug: "jam-photo".into(),
            file_name: "jam.jpg".into(),
        }];
        task.custom_data = vec![
            TaskData {
                attribute: asset,
                value: TaskDataValue::Text("PRN-7".into()),
            },
            TaskData {
                attribute: due,
                value: TaskDataValue::Date(1_700_000_000),
            },
        ];

        svc.insert_task(&task).await.unwrap();
        let loaded = svc.get_task(&task.id).await.unwrap();
        assert_eq!(loaded, task);
    }

    #[tokio::test]
    async fn save_task_fields_persists_scalars() {
        let svc = test_service().await;
        let mut task = sample_task(&svc).await;
        svc.insert_task(&task).await.unwrap();

        let closed = seed_status(&svc, "Closed", StatusFunction::Closed).await;
        task.title = "Printer fixed".into();
        task.important = true;
        task.closed_at = Some(Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap());
        task.status = closed;
        svc.save_task_fields(&task).await.unwrap();

        let loaded = svc.get_task(&task.id).await.unwrap();
        assert_eq!(loaded.title, "Printer fixed");
        assert!(loaded.important);
        assert_eq!(loaded.closed_at, task.closed_at);
        assert_eq!(loaded.status.function, StatusFunction::Closed);
        assert!(loaded.updated_at > task.updated_at);
    }

    #[tokio::test]
    async fn replace_assignees_clears_previous_rows() {
        let svc = test_service().await;
        let task = sample_task(&svc).await;
        svc.insert_task(&task).await.unwrap();
        let a = seed_user(&svc, "a").await;
        let b = seed_user(&svc, "b").await;

        let assign = |user| Assignee {
            user,
            status: task.status.clone(),
            actual: true,
        };
        svc.replace_task_assignees(&task.id, &[assign(a)]).await.unwrap();
        svc.replace_task_assignees(&task.id, &[assign(b.clone())]).await.unwrap();

        let loaded = svc.get_task(&task.id).await.unwrap();
        assert_eq!(loaded.assignee_usernames(), vec![b.username]);
    }

    #[tokio::test]
    async fn unknown_assignee_user_fails() {
        let svc = test_service().await;
        let task = sample_task(&svc).await;
        svc.insert_task(&task).await.unwrap();

        let mut ghost = task.requested_by.clone();
        ghost.id = "usr-ghost".into();
        let result = svc
            .replace_task_assignees(
                &task.id,
                &[Assignee {
                    user: ghost,
                    status: task.status.clone(),
                    actual: true,
                }],
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_task_is_none_or_no_result() {
        let svc = test_service().await;
        assert!(svc.find_task("tsk-missing").await.unwrap().is_none());
        assert!(matches!(
            svc.get_task("tsk-missing").await,
            Err(DatabaseError::NoResult)
        ));
    }
}
