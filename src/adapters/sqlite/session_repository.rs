//! SQLite implementation of the SessionRepository port.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::models::Session;
use crate::domain::ports::SessionRepository;

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: Session) -> anyhow::Result<()> {
        sqlx::query(
            r"INSERT INTO sessions (id, user_id, client_ip, created_at, expires_at, invalidated)
               VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(session.user_id.to_string())
        .bind(&session.client_ip)
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .bind(session.invalidated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose().map_err(Into::into)
    }

    async fn update(&self, session: Session) -> anyhow::Result<()> {
        sqlx::query(
            r"UPDATE sessions SET client_ip = ?, expires_at = ?, invalidated = ? WHERE id = ?",
        )
        .bind(&session.client_ip)
        .bind(session.expires_at.to_rfc3339())
        .bind(session.invalidated)
        .bind(&session.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn invalidate_all_for_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE sessions SET invalidated = 1 WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    client_ip: String,
    created_at: String,
    expires_at: String,
    invalidated: bool,
}

impl TryFrom<SessionRow> for Session {
    type Error = crate::domain::errors::OrchestratorError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            id: row.id,
            user_id: super::parse_uuid(&row.user_id)?,
            client_ip: row.client_ip,
            created_at: super::parse_datetime(&row.created_at)?,
            expires_at: super::parse_datetime(&row.expires_at)?,
            invalidated: row.invalidated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::Duration;

    async fn setup() -> SqliteSessionRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteSessionRepository::new(pool)
    }

    #[tokio::test]
    async fn create_and_get_round_trips() {
        let repo = setup().await;
        let session = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(1));
        repo.create(session.clone()).await.unwrap();

        let fetched = repo.get(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.client_ip, "127.0.0.1");
        assert!(!fetched.invalidated);
    }

    #[tokio::test]
    async fn update_persists_renewal_and_invalidation() {
        let repo = setup().await;
        let mut session = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(1));
        repo.create(session.clone()).await.unwrap();

        session.expires_at += Duration::hours(1);
        session.invalidated = true;
        repo.update(session.clone()).await.unwrap();

        let fetched = repo.get(&session.id).await.unwrap().unwrap();
        assert!(fetched.invalidated);
    }

    #[tokio::test]
    async fn invalidate_all_for_user_affects_only_that_user() {
        let repo = setup().await;
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let session_a = Session::new(user_a, "127.0.0.1", Duration::hours(1));
        let session_b = Session::new(user_b, "127.0.0.1", Duration::hours(1));
        repo.create(session_a.clone()).await.unwrap();
        repo.create(session_b.clone()).await.unwrap();

        repo.invalidate_all_for_user(user_a).await.unwrap();

        assert!(repo.get(&session_a.id).await.unwrap().unwrap().invalidated);
        assert!(!repo.get(&session_b.id).await.unwrap().unwrap().invalidated);
    }

    #[tokio::test]
    async fn delete_removes_the_session() {
        let repo = setup().await;
        let session = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(1));
        repo.create(session.clone()).await.unwrap();
        repo.delete(&session.id).await.unwrap();
        assert!(repo.get(&session.id).await.unwrap().is_none());
    }
}
