use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database. The exercise log is embedded in the row as a
/// JSONB array, so one row is the whole user document.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,               // short random token, assigned at creation
    pub username: String,         // unique across users
    pub log: Json<Vec<LogEntry>>, // append-only, insertion order
}

/// A single exercise record owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub description: String,
    pub duration: i64, // minutes
    #[serde(with = "time::serde::rfc3339")]
    pub exercise_date: OffsetDateTime,
}

/// id + username projection used by the users listing.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}
