//! Status repository.

use desk_core::entities::Status;
use desk_core::enums::StatusFunction;
use desk_core::ids::PREFIX_STATUS;

use crate::error::DatabaseError;
use crate::helpers::parse_enum;
use crate::service::DeskService;

const SELECT_COLS: &str = "id, title, color, function";

pub(crate) fn row_to_status(row: &libsql::Row, offset: i32) -> Result<Status, DatabaseError> {
    Ok(Status {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        color: row.get(offset + 2)?,
        function: parse_enum(&row.get::<String>(offset + 3)?)?,
    })
}

impl DeskService {
    pub async fn insert_status(
        &self,
        title: &str,
        color: &str,
        function: StatusFunction,
    ) -> Result<Status, DatabaseError> {
        let id = self.db().generate_id(PREFIX_STATUS).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO statuses ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4)"),
                libsql::params![id.as_str(), title, color, function.as_str()],
            )
            .await?;
        Ok(Status {
            id,
            title: title.to_string(),
            color: color.to_string(),
            function,
        })
    }

    pub async fn find_status(&self, id: &str) -> Result<Option<Status>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM statuses WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_status(&row, 0)?)),
            None => Ok(None),
        }
    }

    pub async fn list_statuses(&self) -> Result<Vec<Status>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM statuses ORDER BY rowid"),
                (),
            )
            .await?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next().await? {
            statuses.push(row_to_status(&row, 0)?);
        }
        Ok(statuses)
    }
}
