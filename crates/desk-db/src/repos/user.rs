//! User repository.

use desk_core::entities::User;
use desk_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::service::DeskService;

const SELECT_COLS: &str = "id, username, email, name, surname, company_id";

pub(crate) fn row_to_user(row: &libsql::Row, offset: i32) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        email: row.get(offset + 2)?,
        name: get_opt_string(row, offset + 3)?,
        surname: get_opt_string(row, offset + 4)?,
        company_id: get_opt_string(row, offset + 5)?,
    })
}

impl DeskService {
    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        name: Option<&str>,
        surname: Option<&str>,
        company_id: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let id = self.db().generate_id(PREFIX_USER).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO users ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![id.as_str(), username, email, name, surname, company_id],
            )
            .await?;
        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            name: name.map(String::from),
            surname: surname.map(String::from),
            company_id: company_id.map(String::from),
        })
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row, 0)?)),
            None => Ok(None),
        }
    }
}
