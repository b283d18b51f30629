//! Shared test utilities for desk-db tests.

#[cfg(test)]
pub(crate) mod helpers {
    use desk_core::entities::{Status, User};
    use desk_core::enums::StatusFunction;

    use crate::DeskDb;
    use crate::service::DeskService;

    /// Create an in-memory `DeskService`.
    pub async fn test_service() -> DeskService {
        let db = DeskDb::open_local(":memory:").await.unwrap();
        DeskService::from_db(db)
    }

    /// Insert a status with the given function.
    pub async fn seed_status(svc: &DeskService, title: &str, function: StatusFunction) -> Status {
        svc.insert_status(title, "#888888", function).await.unwrap()
    }

    /// Insert a user without company.
    pub async fn seed_user(svc: &DeskService, username: &str) -> User {
        svc.insert_user(username, &format!("{username}@example.com"), None, None, None)
            .await
            .unwrap()
    }
}
