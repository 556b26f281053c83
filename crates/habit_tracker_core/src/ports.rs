//! crates/habit_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or renderers.

use crate::domain::{Habit, HabitEntry, SeriesPoint, User, UserCredentials};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, renderer).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Credential Store ---
    /// Inserts a new user. Fails with `Conflict` if the username is taken.
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session token to its user. Unknown or expired tokens yield `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    /// Removes every session that expired before `now`, returning how many were dropped.
    async fn delete_expired_auth_sessions(&self, now: DateTime<Utc>) -> PortResult<u64>;

    // --- Habit Registry ---
    /// Habit names owned by `user_id`, in insertion order.
    async fn list_habits(&self, user_id: Uuid) -> PortResult<Vec<Habit>>;

    /// Fails with `Conflict` if the user already has a habit with this name.
    async fn add_habit(&self, user_id: Uuid, name: &str) -> PortResult<Habit>;

    /// Deletes the habit and the entries logged under its name, atomically.
    async fn remove_habit(&self, user_id: Uuid, name: &str) -> PortResult<()>;

    // --- Habit Entry Log ---
    async fn entry_exists_on(
        &self,
        user_id: Uuid,
        habit_name: &str,
        date: NaiveDate,
    ) -> PortResult<bool>;

    /// Fails with `Conflict` if the user already logged this habit on that day.
    async fn add_entry(&self, entry: HabitEntry) -> PortResult<()>;

    /// All entries for the habit, ordered by date ascending.
    async fn get_entries(&self, user_id: Uuid, habit_name: &str) -> PortResult<Vec<HabitEntry>>;
}

/// A rendered chart ready to be embedded in a page.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    /// MIME type of `bytes`, e.g. `image/png`.
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders a time series into an image. Synchronous and free of I/O.
pub trait ChartRenderingService: Send + Sync {
    /// Renders `points` (already sorted by date) as a single line chart.
    /// Fails with `NotFound` when there is nothing to plot.
    fn render_series(&self, habit_name: &str, points: &[SeriesPoint]) -> PortResult<RenderedChart>;
}
