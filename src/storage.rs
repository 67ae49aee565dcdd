use crate::errors::StoreError;
use crate::models::{AppendResponse, LogEntry, LogRequest};
use chrono::{SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{env, path::Path, str::FromStr};
use tokio::fs;

/// Upper bound on rows returned by [`Store::list_recent`].
pub const RECENT_LIMIT: i64 = 200;

pub fn resolve_database_url() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/activity.db".to_string())
}

/// Append-only activity log backed by a single SQLite table.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if needed) the database behind `url` and makes sure the
    /// `logs` table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if let Some(parent) = database_parent(url) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::Database(sqlx::Error::Io(err)))?;
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                team TEXT NOT NULL DEFAULT '',
                member TEXT NOT NULL,
                cwid TEXT NOT NULL DEFAULT '',
                activity TEXT NOT NULL,
                duration INTEGER NOT NULL DEFAULT 0
            )"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Validates and appends one entry, stamped with the current service time.
    pub async fn append(&self, request: LogRequest) -> Result<AppendResponse, StoreError> {
        let entry = request.into_new_entry().map_err(StoreError::Validation)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let result = sqlx::query(
            "INSERT INTO logs (created_at, team, member, cwid, activity, duration) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&created_at)
        .bind(&entry.team)
        .bind(&entry.member)
        .bind(&entry.cwid)
        .bind(&entry.activity)
        .bind(entry.duration)
        .execute(&self.pool)
        .await?;

        Ok(AppendResponse {
            id: result.last_insert_rowid(),
            created_at,
        })
    }

    /// Newest entries first, at most [`RECENT_LIMIT`].
    pub async fn list_recent(&self) -> Result<Vec<LogEntry>, StoreError> {
        let rows = sqlx::query_as::<_, LogEntry>(
            "SELECT id, created_at, team, member, cwid, activity, duration FROM logs ORDER BY id DESC LIMIT ?",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn database_parent(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("logs.db").display());
        let store = Store::connect(&url).await.expect("open store");
        (dir, store)
    }

    fn request(member: &str, activity: &str, duration: serde_json::Value) -> LogRequest {
        LogRequest {
            team: Some("T".into()),
            member: Some(member.into()),
            cwid: Some("123".into()),
            activity: Some(activity.into()),
            duration: Some(duration),
        }
    }

    #[tokio::test]
    async fn append_assigns_consecutive_ids() {
        let (_dir, store) = temp_store().await;
        let first = store.append(request("Alice", "Run", json!("30"))).await.unwrap();
        let second = store.append(request("Alice", "Run", json!("30"))).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, first.id + 1);
        assert!(first.created_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&first.created_at).is_ok());
    }

    #[tokio::test]
    async fn rejected_append_writes_nothing() {
        let (_dir, store) = temp_store().await;
        let err = store.append(request("", "Run", json!(10))).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store.append(request("Alice", "", json!(10))).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_durations_are_stored_as_zero() {
        let (_dir, store) = temp_store().await;
        store.append(request("Alice", "Run", json!("-5"))).await.unwrap();
        store.append(request("Bob", "Swim", json!("abc"))).await.unwrap();
        let rows = store.list_recent().await.unwrap();
        assert!(rows.iter().all(|row| row.duration == 0));
    }

    #[tokio::test]
    async fn list_recent_is_capped_and_newest_first() {
        let (_dir, store) = temp_store().await;
        for i in 0..(RECENT_LIMIT + 5) {
            store
                .append(request("Alice", "Run", json!(i)))
                .await
                .unwrap();
        }
        let rows = store.list_recent().await.unwrap();
        assert_eq!(rows.len() as i64, RECENT_LIMIT);
        assert_eq!(rows[0].id, RECENT_LIMIT + 5);
        assert!(rows.windows(2).all(|pair| pair[0].id > pair[1].id));
    }

    #[test]
    fn database_parent_skips_memory_and_bare_files() {
        assert_eq!(database_parent("sqlite::memory:"), None);
        assert_eq!(database_parent("sqlite://activity.db"), None);
        assert_eq!(
            database_parent("sqlite://data/activity.db?mode=rwc"),
            Some(Path::new("data"))
        );
    }
}
