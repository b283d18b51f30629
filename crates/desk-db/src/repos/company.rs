//! Company repository.

use desk_core::entities::Company;
use desk_core::ids::PREFIX_COMPANY;

use crate::error::DatabaseError;
use crate::service::DeskService;

fn row_to_company(row: &libsql::Row) -> Result<Company, DatabaseError> {
    Ok(Company {
        id: row.get(0)?,
        title: row.get(1)?,
    })
}

impl DeskService {
    pub async fn insert_company(&self, title: &str) -> Result<Company, DatabaseError> {
        let id = self.db().generate_id(PREFIX_COMPANY).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO companies (id, title) VALUES (?1, ?2)",
                libsql::params![id.as_str(), title],
            )
            .await?;
        Ok(Company {
            id,
            title: title.to_string(),
        })
    }

    pub async fn find_company(&self, id: &str) -> Result<Option<Company>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, title FROM companies WHERE id = ?1", [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_company(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn insert_and_find_company() {
        let svc = test_service().await;
        let company = svc.insert_company("ACME").await.unwrap();
        assert!(company.id.starts_with("cmp-"));

        let found = svc.find_company(&company.id).await.unwrap().unwrap();
        assert_eq!(found, company);
        assert!(svc.find_company("cmp-missing").await.unwrap().is_none());
    }
}
