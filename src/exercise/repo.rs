use sqlx::types::Json;
use sqlx::PgPool;

use crate::exercise::repo_types::{LogEntry, User, UserSummary};

impl User {
    /// Find a user by exact username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, log
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, log
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with an empty log.
    pub async fn create(db: &PgPool, id: &str, username: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            RETURNING id, username, log
            "#,
        )
        .bind(id)
        .bind(username)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// All users, id and username only. No ORDER BY: callers must not rely on
    /// a particular order.
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username
            FROM users
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Append one entry to a user's log in a single atomic UPDATE, so two
    /// concurrent appends to the same user cannot lose each other. Returns
    /// `None` when the id does not resolve.
    pub async fn append_log(
        db: &PgPool,
        id: &str,
        entry: &LogEntry,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET log = log || $2
            WHERE id = $1
            RETURNING id, username, log
            "#,
        )
        .bind(id)
        .bind(Json(entry))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
