//! Tag repository.

use desk_core::entities::Tag;
use desk_core::ids::PREFIX_TAG;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string};
use crate::service::DeskService;

const SELECT_COLS: &str = "id, title, color, public, created_by";

pub(crate) fn row_to_tag(row: &libsql::Row) -> Result<Tag, DatabaseError> {
    Ok(Tag {
        id: row.get(0)?,
        title: row.get(1)?,
        color: row.get(2)?,
        public: get_bool(row, 3)?,
        created_by: get_opt_string(row, 4)?,
    })
}

impl DeskService {
    pub async fn insert_tag(
        &self,
        title: &str,
        color: &str,
        public: bool,
        created_by: Option<&str>,
    ) -> Result<Tag, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TAG).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO tags ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), title, color, i64::from(public), created_by],
            )
            .await?;
        Ok(Tag {
            id,
            title: title.to_string(),
            color: color.to_string(),
            public,
            created_by: created_by.map(String::from),
        })
    }

    pub async fn find_tag_by_title(&self, title: &str) -> Result<Option<Tag>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM tags WHERE title = ?1"), [title])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_tag(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn find_tag_by_title_is_exact() {
        let svc = test_service().await;
        let tag = svc.insert_tag("printer", "#20b2aa", false, None).await.unwrap();

        assert_eq!(svc.find_tag_by_title("printer").await.unwrap(), Some(tag));
        assert!(svc.find_tag_by_title("Printers").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tag_titles_are_unique() {
        let svc = test_service().await;
        svc.insert_tag("vpn", "#1", true, None).await.unwrap();
        assert!(svc.insert_tag("vpn", "#2", true, None).await.is_err());
    }
}
