//! Project repository, including the "updatedAt" marker bumped by task moves.

use chrono::Utc;

use desk_core::entities::Project;
use desk_core::ids::PREFIX_PROJECT;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::DeskService;

pub(crate) fn row_to_project(row: &libsql::Row, offset: i32) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        updated_at: parse_datetime(&row.get::<String>(offset + 2)?)?,
    })
}

impl DeskService {
    pub async fn insert_project(&self, title: &str) -> Result<Project, DatabaseError> {
        let id = self.db().generate_id(PREFIX_PROJECT).await?;
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO projects (id, title, updated_at) VALUES (?1, ?2, ?3)",
                libsql::params![id.as_str(), title, now.to_rfc3339()],
            )
            .await?;
        Ok(Project {
            id,
            title: title.to_string(),
            updated_at: now,
        })
    }

    pub async fn find_project(&self, id: &str) -> Result<Option<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, title, updated_at FROM projects WHERE id = ?1",
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_project(&row, 0)?)),
            None => Ok(None),
        }
    }

    /// Bump a project's `updated_at` to now.
    pub async fn touch_project(&self, id: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
                libsql::params![Utc::now().to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }
}
