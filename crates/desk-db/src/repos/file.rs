//! Uploaded file metadata repository.

use desk_core::entities::FileMeta;
use desk_core::ids::PREFIX_FILE;

use crate::error::DatabaseError;
use crate::service::DeskService;

fn row_to_file(row: &libsql::Row) -> Result<FileMeta, DatabaseError> {
    Ok(FileMeta {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        path: row.get(3)?,
    })
}

impl DeskService {
    pub async fn insert_file(
        &self,
        slug: &str,
        name: &str,
        path: &str,
    ) -> Result<FileMeta, DatabaseError> {
        let id = self.db().generate_id(PREFIX_FILE).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO files (id, slug, name, path) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), slug, name, path],
            )
            .await?;
        Ok(FileMeta {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            path: path.to_string(),
        })
    }

    pub async fn find_file_by_slug(&self, slug: &str) -> Result<Option<FileMeta>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, slug, name, path FROM files WHERE slug = ?1",
                [slug],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_file(&row)?)),
            None => Ok(None),
        }
    }
}
