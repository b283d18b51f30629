//! Task attribute (custom field definition) repository.

use desk_core::entities::TaskAttribute;
use desk_core::enums::AttributeType;
use desk_core::ids::PREFIX_ATTRIBUTE;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, parse_enum, parse_string_list};
use crate::service::DeskService;

const SELECT_COLS: &str = "id, title, attribute_type, required, active, options";

pub(crate) fn row_to_attribute(
    row: &libsql::Row,
    offset: i32,
) -> Result<TaskAttribute, DatabaseError> {
    Ok(TaskAttribute {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        attribute_type: parse_enum(&row.get::<String>(offset + 2)?)?,
        required: get_bool(row, offset + 3)?,
        active: get_bool(row, offset + 4)?,
        options: parse_string_list(&row.get::<String>(offset + 5)?)?,
    })
}

impl DeskService {
    pub async fn insert_task_attribute(
        &self,
        title: &str,
        attribute_type: AttributeType,
        required: bool,
        active: bool,
        options: &[String],
    ) -> Result<TaskAttribute, DatabaseError> {
        let id = self.db().generate_id(PREFIX_ATTRIBUTE).await?;
        let options_json = serde_json::to_string(options)?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO task_attributes ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    title,
                    attribute_type.as_str(),
                    i64::from(required),
                    i64::from(active),
                    options_json
                ],
            )
            .await?;
        Ok(TaskAttribute {
            id,
            title: title.to_string(),
            attribute_type,
            required,
            active,
            options: options.to_vec(),
        })
    }

    pub async fn find_task_attribute(
        &self,
        id: &str,
    ) -> Result<Option<TaskAttribute>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM task_attributes WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_attribute(&row, 0)?)),
            None => Ok(None),
        }
    }

    /// Attributes every task must carry a value for.
    pub async fn list_required_attributes(&self) -> Result<Vec<TaskAttribute>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM task_attributes \
                     WHERE required = 1 AND active = 1 ORDER BY rowid"
                ),
                (),
            )
            .await?;
        let mut attributes = Vec::new();
        while let Some(row) = rows.next().await? {
            attributes.push(row_to_attribute(&row, 0)?);
        }
        Ok(attributes)
    }
}
