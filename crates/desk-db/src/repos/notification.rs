//! Notification repository.

use chrono::Utc;

use desk_core::entities::Notification;
use desk_core::enums::NotificationKind;
use desk_core::ids::PREFIX_NOTIFICATION;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, parse_datetime, parse_enum};
use crate::service::DeskService;

const SELECT_COLS: &str = "id, task_id, created_by, user_id, title, body, kind, checked, created_at";

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get(0)?,
        task_id: row.get(1)?,
        created_by: row.get(2)?,
        user_id: row.get(3)?,
        title: row.get(4)?,
        body: row.get(5)?,
        kind: parse_enum(&row.get::<String>(6)?)?,
        checked: get_bool(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl DeskService {
    /// Persist an unchecked task notification for `user_id`.
    pub async fn insert_notification(
        &self,
        task_id: &str,
        created_by: &str,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification, DatabaseError> {
        let id = self.db().generate_id(PREFIX_NOTIFICATION).await?;
        let now = Utc::now();
        let kind = NotificationKind::Task;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO notifications ({SELECT_COLS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    task_id,
                    created_by,
                    user_id,
                    title,
                    body,
                    kind.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        Ok(Notification {
            id,
            task_id: task_id.to_string(),
            created_by: created_by.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            kind,
            checked: false,
            created_at: now,
        })
    }

    /// Newest first.
    pub async fn list_notifications_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM notifications WHERE user_id = ?1 \
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2"
                ),
                libsql::params![user_id, i64::from(limit)],
            )
            .await?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await? {
            notifications.push(row_to_notification(&row)?);
        }
        Ok(notifications)
    }

    /// In insertion order.
    pub async fn list_notifications_for_task(
        &self,
        task_id: &str,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM notifications WHERE task_id = ?1 ORDER BY rowid"),
                [task_id],
            )
            .await?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await? {
            notifications.push(row_to_notification(&row)?);
        }
        Ok(notifications)
    }
}
