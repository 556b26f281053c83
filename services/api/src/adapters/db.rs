//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use habit_tracker_core::domain::{AuthSession, Habit, HabitEntry, User, UserCredentials};
use habit_tracker_core::forms::parse_date;
use habit_tracker_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// A private, migrated in-memory database. Used by tests and local experiments.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // Every connection to `:memory:` is a separate database, so pin the pool to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let adapter = Self::new(pool);
        adapter
            .run_migrations()
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        Ok(adapter)
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    hash: String,
}
impl UserRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            username: self.username,
            hashed_password: self.hash,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    expires_at: i64,
}
impl AuthSessionRecord {
    fn to_domain(self) -> PortResult<AuthSession> {
        let expires_at = DateTime::<Utc>::from_timestamp(self.expires_at, 0).ok_or_else(|| {
            PortError::Unexpected(format!("Session {} has an invalid expiry", self.id))
        })?;
        Ok(AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at,
        })
    }
}

#[derive(FromRow)]
struct HabitRecord {
    user_id: Uuid,
    name: String,
}
impl HabitRecord {
    fn to_domain(self) -> Habit {
        Habit {
            user_id: self.user_id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct HabitEntryRecord {
    user_id: Uuid,
    habit_name: String,
    duration: f64,
    timestamp: String,
}
impl HabitEntryRecord {
    fn to_domain(self) -> PortResult<HabitEntry> {
        let date = parse_date(&self.timestamp).ok_or_else(|| {
            PortError::Unexpected(format!("Unreadable entry timestamp '{}'", self.timestamp))
        })?;
        Ok(HabitEntry {
            user_id: self.user_id,
            habit_name: self.habit_name,
            duration: self.duration,
            date,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User> {
        let user_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, username, hash) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(username)
            .bind(hashed_password)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict(format!("Username {} already exists", username))
                } else {
                    unexpected(e)
                }
            })?;
        Ok(User {
            user_id,
            username: username.to_string(),
        })
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", username)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at.timestamp())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, expires_at FROM auth_sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;

        let session = record.to_domain()?;
        if session.expires_at <= Utc::now() {
            warn!("Rejected expired auth session for user {}", session.user_id);
            self.delete_auth_session(&session.id).await?;
            return Err(PortError::Unauthorized);
        }
        Ok(session.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_expired_auth_sessions(&self, now: DateTime<Utc>) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn list_habits(&self, user_id: Uuid) -> PortResult<Vec<Habit>> {
        let records = sqlx::query_as::<_, HabitRecord>(
            "SELECT user_id, name FROM habit WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let habits = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(habits)
    }

    async fn add_habit(&self, user_id: Uuid, name: &str) -> PortResult<Habit> {
        sqlx::query("INSERT INTO habit (user_id, name) VALUES (?, ?)")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict(format!("Habit {} already exists", name))
                } else {
                    unexpected(e)
                }
            })?;
        Ok(Habit {
            user_id,
            name: name.to_string(),
        })
    }

    async fn remove_habit(&self, user_id: Uuid, name: &str) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // TODO: scope this delete by user_id as well once it is confirmed that
        // removing a habit should leave other users' same-named entries alone.
        sqlx::query("DELETE FROM habits WHERE habit_name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM habit WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn entry_exists_on(
        &self,
        user_id: Uuid,
        habit_name: &str,
        date: NaiveDate,
    ) -> PortResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM habits WHERE user_id = ? AND habit_name = ? AND DATE(timestamp) = ? LIMIT 1",
        )
        .bind(user_id)
        .bind(habit_name)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(found.is_some())
    }

    async fn add_entry(&self, entry: HabitEntry) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO habits (user_id, habit_name, duration, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(entry.user_id)
        .bind(&entry.habit_name)
        .bind(entry.duration)
        .bind(entry.date.format("%Y-%m-%d").to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!(
                    "Habit {} already has an entry on {}",
                    entry.habit_name, entry.date
                ))
            } else {
                unexpected(e)
            }
        })?;
        Ok(())
    }

    async fn get_entries(&self, user_id: Uuid, habit_name: &str) -> PortResult<Vec<HabitEntry>> {
        let records = sqlx::query_as::<_, HabitEntryRecord>(
            "SELECT user_id, habit_name, duration, timestamp FROM habits \
             WHERE user_id = ? AND habit_name = ? ORDER BY timestamp ASC, id ASC",
        )
        .bind(user_id)
        .bind(habit_name)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
