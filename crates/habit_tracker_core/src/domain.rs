//! crates/habit_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

// Represents a registered user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
}

// Only used internally for login/register - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub username: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A named habit owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    pub user_id: Uuid,
    pub name: String,
}

/// A single dated duration record for a habit.
///
/// Entries reference their habit by name, not by a durable identifier, so a
/// renamed habit no longer sees its history.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitEntry {
    pub user_id: Uuid,
    pub habit_name: String,
    /// Minutes spent, never negative.
    pub duration: f64,
    pub date: NaiveDate,
}

/// One point of a plotted series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub duration: f64,
}

impl From<&HabitEntry> for SeriesPoint {
    fn from(entry: &HabitEntry) -> Self {
        Self {
            date: entry.date,
            duration: entry.duration,
        }
    }
}
